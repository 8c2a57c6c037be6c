//! Magnetron safety supervisor.
//!
//! The supervisor runs **every magnetron tick before the on/off decision**.
//! Two conditions make emitting unsafe:
//!
//! 1. The rolling one-minute duty share exceeds the configured maximum.
//! 2. Either magnetron temperature probe exceeds the configured maximum.
//!
//! While a hazard is present the modulator forces the magnetron off and
//! records an "off" sample, which is what eventually brings the duty share
//! back under the limit.
//!
//! Hazards are latched only for logging: the supervisor reports a hazard
//! once when it appears and once when it clears, not on every tick.

use core::fmt;

use log::{info, warn};

use crate::config::SystemConfig;

/// Condition that forbids turning the magnetron on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hazard {
    /// Rolling duty share above the limit.
    DutyShareExceeded(f64),
    /// Hottest magnetron probe above the limit (°C).
    OverTemperature(f64),
}

impl Hazard {
    fn same_kind(&self, other: &Hazard) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DutyShareExceeded(share) => {
                write!(f, "duty share {:.2} exceeds limit", share)
            }
            Self::OverTemperature(temp) => {
                write!(f, "magnetron temperature {:.1}\u{00b0}C exceeds limit", temp)
            }
        }
    }
}

/// Safety supervisor for the magnetron modulator.
#[derive(Debug, Clone)]
pub struct MagnetronSafety {
    max_duty_share: f64,
    max_temp_c: f64,
    /// Last reported hazard (edge detection for logging).
    latched: Option<Hazard>,
}

impl MagnetronSafety {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            max_duty_share: config.magnetron_max_duty_share,
            max_temp_c: config.magnetron_max_temp_c,
            latched: None,
        }
    }

    /// Evaluate both conditions. Duty share is checked first.
    pub fn evaluate(&mut self, duty_share: f64, temp_1: f64, temp_2: f64) -> Option<Hazard> {
        let hottest = temp_1.max(temp_2);
        let hazard = if duty_share > self.max_duty_share {
            Some(Hazard::DutyShareExceeded(duty_share))
        } else if hottest > self.max_temp_c {
            Some(Hazard::OverTemperature(hottest))
        } else {
            None
        };

        match (&self.latched, &hazard) {
            (None, Some(h)) => warn!("MAGNETRON HAZARD SET: {h}"),
            (Some(old), Some(h)) if !old.same_kind(h) => warn!("MAGNETRON HAZARD SET: {h}"),
            (Some(old), None) => info!("MAGNETRON HAZARD CLEARED: {old}"),
            _ => {}
        }
        self.latched = hazard;
        hazard
    }

    /// True if the last evaluation found a hazard.
    pub fn has_hazard(&self) -> bool {
        self.latched.is_some()
    }

    /// Forget the latched hazard.
    pub fn clear(&mut self) {
        self.latched = None;
    }
}
