//! Defrosting program.
//!
//! The load is heated in cycles. Each cycle runs the magnetron until the
//! cavity passes the target temperature, then lets it cool back to near
//! ambient before the next one. Heavier loads get more cycles at a higher
//! power share.

use log::info;

use crate::config::SystemConfig;
use crate::error::Result;
use crate::program::{Components, Outcome, ProgramLogic};

/// Turntable speed while defrosting (rpm).
const TURNTABLE_RPM: f64 = 2.0;
/// Cavity must fall below ambient plus this margin before the next cycle (°C).
const REARM_MARGIN_C: f64 = 5.0;
/// Load per defrost cycle (g).
const GRAMS_PER_CYCLE: f64 = 100.0;
/// Power share cap.
const MAX_POWER_SHARE: f64 = 0.4;

pub struct DefrostingProgram {
    cycles: u32,
    /// A cycle just ended; waiting for the cavity to cool.
    cooling: bool,
    target_temp_c: f64,
    rearm_temp_c: f64,
    tare_g: f64,
}

impl DefrostingProgram {
    pub const NAME: &'static str = "Defrosting Program";

    pub fn new(config: &SystemConfig) -> Self {
        Self {
            cycles: 1,
            cooling: false,
            target_temp_c: config.defrost_target_temp_c,
            rearm_temp_c: config.ambient_temp_c + REARM_MARGIN_C,
            tare_g: config.turntable_weight_g,
        }
    }

    /// Number of cycles for a total turntable weight (g), never fewer than one.
    pub fn cycles_for_weight(weight_g: f64, tare_g: f64) -> u32 {
        let extra = ((weight_g - tare_g) / GRAMS_PER_CYCLE).floor();
        if extra >= 1.0 { extra as u32 } else { 1 }
    }

    fn power_share(&self) -> f64 {
        (0.1 + f64::from(self.cycles) * 0.1).min(MAX_POWER_SHARE)
    }
}

impl ProgramLogic for DefrostingProgram {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn prepare(&mut self, parts: &Components) -> Result<()> {
        self.cycles = Self::cycles_for_weight(parts.sensors.weight(), self.tare_g);
        self.cooling = false;
        info!("Defrosting will take {} cycles", self.cycles);
        parts.turntable.set_speed(TURNTABLE_RPM)?;
        Ok(())
    }

    fn step(&mut self, parts: &Components) -> Result<Outcome> {
        let inner = parts.sensors.inner_temp_avg();

        if inner > self.target_temp_c && !self.cooling {
            parts.magnetron.set_target_power(0.0)?;
            self.cycles = self.cycles.saturating_sub(1);
            self.cooling = true;
            info!("Defrosting cycle finished: {} left", self.cycles);
        } else if self.cooling {
            if inner < self.rearm_temp_c {
                self.cooling = false;
            }
        } else {
            parts.magnetron.set_target_power(self.power_share())?;
        }

        if self.cycles == 0 {
            return Ok(Outcome::Finished);
        }
        Ok(Outcome::Continue)
    }
}
