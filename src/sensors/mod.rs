//! Sensor subsystem: simulated probes and the aggregating [`SimulatedSensors`].
//!
//! The simulation reads the shared leaf devices (magnetron, cooling fan,
//! door) once per [`update`](SensorReadings::update) and advances every
//! probe model from that single sample, so all probes see a consistent
//! actuator state within a tick.

pub mod heat;
pub mod weight;

use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::SensorReadings;
use crate::config::SystemConfig;
use crate::drivers::cooling_fan::CoolingFan;
use crate::drivers::door::DoorController;
use crate::drivers::magnetron::Magnetron;
use heat::{HeatInputs, HeatModel, HeatRates};
use weight::WeightModel;

/// Amplitude of the uniform noise on temperature and humidity probes.
const PROBE_NOISE: f64 = 0.01;
/// Amplitude of the uniform noise on the load cell (g).
const WEIGHT_NOISE: f64 = 0.1;

struct ProbeBank {
    inner_1: HeatModel,
    inner_2: HeatModel,
    humidity: HeatModel,
    magnetron_1: HeatModel,
    magnetron_2: HeatModel,
    weight: WeightModel,
    rng: StdRng,
}

impl ProbeBank {
    fn noise(&mut self, amplitude: f64) -> f64 {
        self.rng.gen_range(-amplitude..=amplitude)
    }
}

/// Every sensor of the appliance, simulated from the actuator states.
pub struct SimulatedSensors {
    magnetron: Arc<Magnetron>,
    fan: Arc<CoolingFan>,
    door: Arc<DoorController>,
    bank: Mutex<ProbeBank>,
}

impl SimulatedSensors {
    pub fn new(
        config: &SystemConfig,
        magnetron: Arc<Magnetron>,
        fan: Arc<CoolingFan>,
        door: Arc<DoorController>,
    ) -> Self {
        Self::with_rng(config, magnetron, fan, door, StdRng::from_entropy())
    }

    /// Deterministic noise for tests.
    pub fn with_seed(
        config: &SystemConfig,
        magnetron: Arc<Magnetron>,
        fan: Arc<CoolingFan>,
        door: Arc<DoorController>,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, magnetron, fan, door, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: &SystemConfig,
        magnetron: Arc<Magnetron>,
        fan: Arc<CoolingFan>,
        door: Arc<DoorController>,
        rng: StdRng,
    ) -> Self {
        let ambient = config.ambient_temp_c;
        let bank = ProbeBank {
            inner_1: HeatModel::new(ambient, HeatRates::CAVITY),
            inner_2: HeatModel::new(ambient, HeatRates::CAVITY),
            humidity: HeatModel::new(config.ambient_humidity_pct, HeatRates::CAVITY),
            magnetron_1: HeatModel::new(ambient, HeatRates::MAGNETRON),
            magnetron_2: HeatModel::new(ambient, HeatRates::MAGNETRON),
            weight: WeightModel::new(config.turntable_weight_g),
            rng,
        };
        Self {
            magnetron,
            fan,
            door,
            bank: Mutex::new(bank),
        }
    }
}

impl SensorReadings for SimulatedSensors {
    fn magnetron_temp_1(&self) -> f64 {
        self.bank.lock().magnetron_1.value()
    }

    fn magnetron_temp_2(&self) -> f64 {
        self.bank.lock().magnetron_2.value()
    }

    fn inner_temp_1(&self) -> f64 {
        self.bank.lock().inner_1.value()
    }

    fn inner_temp_2(&self) -> f64 {
        self.bank.lock().inner_2.value()
    }

    fn humidity(&self) -> f64 {
        self.bank.lock().humidity.value()
    }

    fn weight(&self) -> f64 {
        self.bank.lock().weight.value()
    }

    fn update(&self) {
        let inputs = HeatInputs {
            magnetron_on: self.magnetron.is_active(),
            door_open: self.door.is_open(),
            fan_share: self.fan.power_share(),
        };

        let mut b = self.bank.lock();
        let n = b.noise(PROBE_NOISE);
        b.inner_1.step(inputs, n);
        let n = b.noise(PROBE_NOISE);
        b.inner_2.step(inputs, n);
        let n = b.noise(PROBE_NOISE);
        b.humidity.step(inputs, n);
        let n = b.noise(PROBE_NOISE);
        b.magnetron_1.step(inputs, n);
        let n = b.noise(PROBE_NOISE);
        b.magnetron_2.step(inputs, n);
        let n = b.noise(WEIGHT_NOISE);
        b.weight.step(inputs.door_open, n);

        debug!(
            "Sensors: magnetron {:.2}/{:.2} inner {:.2}/{:.2} humidity {:.2} weight {:.1}",
            b.magnetron_1.value(),
            b.magnetron_2.value(),
            b.inner_1.value(),
            b.inner_2.value(),
            b.humidity.value(),
            b.weight.value(),
        );
    }

    fn reset(&self) {
        info!("Sensors: reset");
        let mut b = self.bank.lock();
        b.inner_1.reset();
        b.inner_2.reset();
        b.humidity.reset();
        b.magnetron_1.reset();
        b.magnetron_2.reset();
        b.weight.reset();
    }
}
