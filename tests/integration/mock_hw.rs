//! Mock adapters for integration tests.
//!
//! [`MockSensors`] returns whatever the test sets and counts updates.
//! [`RecordingDisplay`] keeps every state pushed to it. Both hand out
//! shared handles so the test can inspect them while the system threads
//! own the adapter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use microwave::app::appliance::{Appliance, Hardware};
use microwave::app::events::DisplayState;
use microwave::app::ports::{DisplaySink, FaultSink, SensorReadings};
use microwave::config::SystemConfig;
use microwave::error::Fault;

// ── Sensors ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Readings {
    pub magnetron_temp: f64,
    pub inner_temp: f64,
    pub humidity: f64,
    pub weight: f64,
}

impl Default for Readings {
    fn default() -> Self {
        Self {
            magnetron_temp: 22.0,
            inner_temp: 22.0,
            humidity: 40.0,
            weight: 420.0,
        }
    }
}

#[derive(Default)]
pub struct MockSensors {
    pub readings: Mutex<Readings>,
    pub updates: Mutex<usize>,
    pub resets: Mutex<usize>,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn set_inner_temp(&self, celsius: f64) {
        self.readings.lock().inner_temp = celsius;
    }

    pub fn set_weight(&self, grams: f64) {
        self.readings.lock().weight = grams;
    }

    pub fn update_count(&self) -> usize {
        *self.updates.lock()
    }

    pub fn reset_count(&self) -> usize {
        *self.resets.lock()
    }
}

impl SensorReadings for MockSensors {
    fn magnetron_temp_1(&self) -> f64 {
        self.readings.lock().magnetron_temp
    }
    fn magnetron_temp_2(&self) -> f64 {
        self.readings.lock().magnetron_temp
    }
    fn inner_temp_1(&self) -> f64 {
        self.readings.lock().inner_temp
    }
    fn inner_temp_2(&self) -> f64 {
        self.readings.lock().inner_temp
    }
    fn humidity(&self) -> f64 {
        self.readings.lock().humidity
    }
    fn weight(&self) -> f64 {
        self.readings.lock().weight
    }
    fn update(&self) {
        *self.updates.lock() += 1;
    }
    fn reset(&self) {
        *self.resets.lock() += 1;
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub shown: Arc<Mutex<Vec<DisplayState>>>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn last(&self) -> Option<DisplayState> {
        self.shown.lock().last().cloned()
    }

    pub fn any(&self, pred: impl Fn(&DisplayState) -> bool) -> bool {
        self.shown.lock().iter().any(pred)
    }
}

impl DisplaySink for RecordingDisplay {
    fn show(&mut self, state: &DisplayState) {
        self.shown.lock().push(state.clone());
    }
}

// ── Fault sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingFaults {
    pub reported: Mutex<Vec<Fault>>,
}

impl FaultSink for RecordingFaults {
    fn report(&self, fault: Fault) {
        self.reported.lock().push(fault);
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Short intervals so the loops turn over quickly in tests.
pub fn fast_config() -> SystemConfig {
    SystemConfig {
        main_loop_interval_ms: 2,
        program_interval_ms: 2,
        magnetron_interval_ms: 5,
        cooling_fan_interval_ms: 5,
        light_interval_ms: 5,
        ..SystemConfig::default()
    }
}

pub fn mock_appliance() -> (Appliance, Arc<MockSensors>) {
    mock_appliance_with(fast_config())
}

pub fn mock_appliance_with(config: SystemConfig) -> (Appliance, Arc<MockSensors>) {
    let sensors = Arc::new(MockSensors::default());
    let appliance = Appliance::new(config, Hardware::new(), sensors.clone());
    (appliance, sensors)
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn eventually(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

pub const WAIT: Duration = Duration::from_secs(3);
