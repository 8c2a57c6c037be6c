//! Wiring of every subsystem into one shareable bundle.
//!
//! Leaf devices are built first because both the controllers and the
//! sensor simulation hold them. Everything is shared as `Arc` handles;
//! each resource guards its own state.

use std::sync::Arc;

use log::info;

use crate::app::ports::SensorReadings;
use crate::config::SystemConfig;
use crate::drivers::ActuatorController;
use crate::drivers::alarm::AlarmController;
use crate::drivers::cooling_fan::{CoolingFan, CoolingFanController};
use crate::drivers::door::DoorController;
use crate::drivers::light::{Light, LightController};
use crate::drivers::magnetron::{Magnetron, MagnetronModulator};
use crate::drivers::reflector::ReflectorController;
use crate::drivers::turntable::TurntableController;
use crate::program::Components;
use crate::program::controller::ProgramController;
use crate::sensors::SimulatedSensors;

/// Physical devices shared between controllers and sensors.
#[derive(Clone, Default)]
pub struct Hardware {
    pub magnetron: Arc<Magnetron>,
    pub fan: Arc<CoolingFan>,
    pub light: Arc<Light>,
    pub door: Arc<DoorController>,
}

impl Hardware {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Every controller of the appliance.
#[derive(Clone)]
pub struct Appliance {
    pub config: SystemConfig,
    pub hardware: Hardware,
    pub sensors: Arc<dyn SensorReadings>,
    pub alarm: Arc<AlarmController>,
    pub magnetron: Arc<MagnetronModulator>,
    pub cooling_fan: Arc<CoolingFanController>,
    pub turntable: Arc<TurntableController>,
    pub reflector: Arc<ReflectorController>,
    pub light: Arc<LightController>,
    pub programs: Arc<ProgramController>,
}

impl Appliance {
    pub fn new(config: SystemConfig, hardware: Hardware, sensors: Arc<dyn SensorReadings>) -> Self {
        let programs = Arc::new(ProgramController::new());
        Self {
            alarm: Arc::new(AlarmController::new()),
            magnetron: Arc::new(MagnetronModulator::new(
                &config,
                Arc::clone(&hardware.magnetron),
                Arc::clone(&sensors),
            )),
            cooling_fan: Arc::new(CoolingFanController::new(
                &config,
                Arc::clone(&hardware.fan),
                Arc::clone(&sensors),
            )),
            turntable: Arc::new(TurntableController::new(&config)),
            reflector: Arc::new(ReflectorController::new(&config)),
            light: Arc::new(LightController::new(
                &config,
                Arc::clone(&hardware.light),
                Arc::clone(&hardware.door),
                programs.clone(),
            )),
            programs,
            sensors,
            hardware,
            config,
        }
    }

    /// Appliance backed by the simulated sensor models.
    pub fn simulated(config: SystemConfig) -> Self {
        let hardware = Hardware::new();
        let sensors = Arc::new(SimulatedSensors::new(
            &config,
            Arc::clone(&hardware.magnetron),
            Arc::clone(&hardware.fan),
            Arc::clone(&hardware.door),
        ));
        Self::new(config, hardware, sensors)
    }

    pub fn door(&self) -> &DoorController {
        &self.hardware.door
    }

    /// The parts a program drives.
    pub fn components(&self) -> Components {
        Components {
            sensors: Arc::clone(&self.sensors),
            door: Arc::clone(&self.hardware.door),
            magnetron: Arc::clone(&self.magnetron),
            cooling_fan: Arc::clone(&self.cooling_fan),
            turntable: Arc::clone(&self.turntable),
            reflector: Arc::clone(&self.reflector),
        }
    }

    pub fn actuators(&self) -> [&dyn ActuatorController; 5] {
        [
            self.magnetron.as_ref(),
            self.cooling_fan.as_ref(),
            self.turntable.as_ref(),
            self.reflector.as_ref(),
            self.light.as_ref(),
        ]
    }

    /// Return every subsystem to its factory state.
    pub fn reset(&self) {
        info!("Resetting all subsystems");
        self.programs.reset();
        for actuator in self.actuators() {
            actuator.reset();
        }
        self.hardware.door.reset();
        self.alarm.reset();
        self.sensors.reset();
    }
}
