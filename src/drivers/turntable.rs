//! Turntable drive (rpm). Stops dead on emergency.

use std::ops::Deref;
use std::time::Duration;

use crate::config::SystemConfig;
use crate::drivers::ActuatorController;
use crate::drivers::slew_drive::{DriveSpec, EmergencyPolicy, SlewDrive};
use crate::error::ActuatorError;

pub struct TurntableController {
    drive: SlewDrive,
}

impl TurntableController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            drive: SlewDrive::new(DriveSpec {
                name: "turntable",
                unit: "rpm",
                initial: 0.0,
                step: config.turntable_step_rpm,
                min: config.turntable_min_rpm,
                max: config.turntable_max_rpm,
                period: Duration::from_millis(config.program_interval_ms),
                on_emergency: EmergencyPolicy::Zero,
            }),
        }
    }

    pub fn set_speed(&self, rpm: f64) -> Result<(), ActuatorError> {
        self.drive.set_target(rpm)
    }

    pub fn speed(&self) -> f64 {
        self.drive.current()
    }
}

impl Deref for TurntableController {
    type Target = SlewDrive;

    fn deref(&self) -> &SlewDrive {
        &self.drive
    }
}

impl ActuatorController for TurntableController {
    fn name(&self) -> &'static str {
        self.drive.name()
    }
    fn start(&self) -> bool {
        self.drive.start()
    }
    fn stop(&self) {
        self.drive.stop()
    }
    fn emergency_stop(&self) {
        self.drive.emergency_stop()
    }
    fn is_running(&self) -> bool {
        self.drive.is_running()
    }
    fn reset(&self) {
        self.drive.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_limits_follow_config() {
        let t = TurntableController::new(&SystemConfig::default());
        assert!(t.set_speed(5.0).is_ok());
        assert!(t.set_speed(-5.0).is_ok());
        assert!(t.set_speed(5.1).is_err());
    }

    #[test]
    fn emergency_stop_zeroes_speed() {
        let t = TurntableController::new(&SystemConfig::default());
        t.set_speed(2.0).unwrap();
        for _ in 0..10 {
            t.tick();
        }
        assert!(t.speed() > 0.5);
        t.emergency_stop();
        assert_eq!(t.speed(), 0.0);
    }
}
