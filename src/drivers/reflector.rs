//! Reflector (mode stirrer) angle drive (degrees). Holds its angle on
//! emergency.

use std::ops::Deref;
use std::time::Duration;

use crate::config::SystemConfig;
use crate::drivers::ActuatorController;
use crate::drivers::slew_drive::{DriveSpec, EmergencyPolicy, SlewDrive};
use crate::error::ActuatorError;

pub struct ReflectorController {
    drive: SlewDrive,
}

impl ReflectorController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            drive: SlewDrive::new(DriveSpec {
                name: "reflector",
                unit: "deg",
                initial: 0.0,
                step: config.reflector_step_deg,
                min: config.reflector_min_deg,
                max: config.reflector_max_deg,
                period: Duration::from_millis(config.program_interval_ms),
                on_emergency: EmergencyPolicy::Hold,
            }),
        }
    }

    pub fn set_angle(&self, deg: f64) -> Result<(), ActuatorError> {
        self.drive.set_target(deg)
    }

    pub fn angle(&self) -> f64 {
        self.drive.current()
    }
}

impl Deref for ReflectorController {
    type Target = SlewDrive;

    fn deref(&self) -> &SlewDrive {
        &self.drive
    }
}

impl ActuatorController for ReflectorController {
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
