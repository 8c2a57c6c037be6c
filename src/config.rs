//! System configuration parameters
//!
//! All tunable parameters for the appliance controller. Defaults carry the
//! factory calibration; a JSON file can override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Main system loop interval (milliseconds)
    pub main_loop_interval_ms: u64,
    /// Program control loop interval (milliseconds)
    pub program_interval_ms: u64,
    /// Magnetron on/off decision interval (milliseconds)
    pub magnetron_interval_ms: u64,
    /// Cooling fan slew interval (milliseconds)
    pub cooling_fan_interval_ms: u64,
    /// Light edge-detection interval (milliseconds)
    pub light_interval_ms: u64,

    // --- Magnetron safety ---
    /// Maximum share of "on" ticks over the rolling one-minute window
    pub magnetron_max_duty_share: f64,
    /// Maximum magnetron temperature (Celsius) before the modulator forces off
    pub magnetron_max_temp_c: f64,

    // --- Cooling fan ---
    /// Fan power share change per tick (0-1)
    pub cooling_fan_step: f64,
    /// Fan power share requested when a program starts (0-1)
    pub cooling_fan_start_share: f64,

    // --- Turntable ---
    /// Turntable speed limits (rotations per minute)
    pub turntable_min_rpm: f64,
    pub turntable_max_rpm: f64,
    /// Turntable speed change per tick (rotations per minute)
    pub turntable_step_rpm: f64,
    /// Weight of the empty turntable (grams)
    pub turntable_weight_g: f64,

    // --- Reflector ---
    /// Reflector angle limits (degrees)
    pub reflector_min_deg: f64,
    pub reflector_max_deg: f64,
    /// Reflector angle change per tick (degrees)
    pub reflector_step_deg: f64,

    // --- Environment ---
    /// Ambient temperature (Celsius)
    pub ambient_temp_c: f64,
    /// Ambient humidity (percent)
    pub ambient_humidity_pct: f64,

    // --- Programs ---
    /// Inner temperature (Celsius) that completes one defrost cycle
    pub defrost_target_temp_c: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            main_loop_interval_ms: 10,   // 100 Hz
            program_interval_ms: 10,     // 100 Hz
            magnetron_interval_ms: 100,  // 10 Hz
            cooling_fan_interval_ms: 100,
            light_interval_ms: 100,

            // Magnetron safety
            magnetron_max_duty_share: 0.8,
            magnetron_max_temp_c: 200.0,

            // Cooling fan
            cooling_fan_step: 0.1,
            cooling_fan_start_share: 0.2,

            // Turntable
            turntable_min_rpm: -5.0,
            turntable_max_rpm: 5.0,
            turntable_step_rpm: 0.1,
            turntable_weight_g: 420.0,

            // Reflector
            reflector_min_deg: -90.0,
            reflector_max_deg: 90.0,
            reflector_step_deg: 0.1,

            // Environment
            ambient_temp_c: 22.0,
            ambient_humidity_pct: 40.0,

            // Programs
            defrost_target_temp_c: 60.0,
        }
    }
}

impl SystemConfig {
    /// Number of magnetron ticks in one minute: the duty-cycle window size.
    pub fn magnetron_window_len(&self) -> usize {
        (60_000 / self.magnetron_interval_ms.max(1)) as usize
    }

    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound)?;
        Self::from_json_str(&text)
    }

    /// Reject values that would break a control loop or invert a range.
    /// Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            self.main_loop_interval_ms,
            self.program_interval_ms,
            self.magnetron_interval_ms,
            self.cooling_fan_interval_ms,
            self.light_interval_ms,
        ];
        if intervals.contains(&0) {
            return Err(ConfigError::ValidationFailed("loop intervals must be > 0"));
        }
        if self.magnetron_interval_ms > 60_000 {
            return Err(ConfigError::ValidationFailed(
                "magnetron interval must fit in the one-minute window",
            ));
        }
        if !(0.0..=1.0).contains(&self.magnetron_max_duty_share) {
            return Err(ConfigError::ValidationFailed(
                "magnetron_max_duty_share must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.cooling_fan_start_share) {
            return Err(ConfigError::ValidationFailed(
                "cooling_fan_start_share must be within [0, 1]",
            ));
        }
        let steps = [
            self.cooling_fan_step,
            self.turntable_step_rpm,
            self.reflector_step_deg,
        ];
        if steps.iter().any(|s| *s <= 0.0) {
            return Err(ConfigError::ValidationFailed("slew steps must be > 0"));
        }
        if self.turntable_min_rpm > 0.0 || self.turntable_max_rpm < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "turntable range must contain 0 rpm",
            ));
        }
        if self.reflector_min_deg > 0.0 || self.reflector_max_deg < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "reflector range must contain 0 degrees",
            ));
        }
        Ok(())
    }
}

/// Errors from loading or validating a [`SystemConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    NotFound,
    /// The document is not valid JSON for this schema.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
