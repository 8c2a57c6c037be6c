//! Slew-limited positional drive shared by the turntable and the reflector.
//!
//! A drive can be advanced two ways: by its own [`TickLoop`] after
//! `start()`, or inline by whoever owns it calling [`SlewDrive::tick`]
//! (programs do this so the drive moves in lockstep with the program).
//! After an emergency stop inline ticks are ignored until the drive is
//! engaged again.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};
use parking_lot::Mutex;

use crate::control::slew::SlewLimitedActuator;
use crate::control::ticker::TickLoop;
use crate::drivers::ActuatorController;
use crate::error::ActuatorError;

/// What an emergency stop does to the drive's motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyPolicy {
    /// Current and target both jump to zero.
    Zero,
    /// Freeze at the current value.
    Hold,
}

/// Construction parameters for a [`SlewDrive`].
#[derive(Debug, Clone, Copy)]
pub struct DriveSpec {
    pub name: &'static str,
    pub unit: &'static str,
    pub initial: f64,
    pub step: f64,
    pub min: f64,
    pub max: f64,
    pub period: Duration,
    pub on_emergency: EmergencyPolicy,
}

pub struct SlewDrive {
    spec: DriveSpec,
    actuator: Arc<Mutex<SlewLimitedActuator>>,
    halted: AtomicBool,
    ticker: TickLoop,
}

impl SlewDrive {
    pub fn new(spec: DriveSpec) -> Self {
        Self {
            actuator: Arc::new(Mutex::new(SlewLimitedActuator::new(
                spec.initial,
                spec.step,
                spec.min,
                spec.max,
            ))),
            halted: AtomicBool::new(false),
            ticker: TickLoop::new(spec.name, spec.period),
            spec,
        }
    }

    pub fn set_target(&self, value: f64) -> Result<(), ActuatorError> {
        if self.actuator.lock().set_target(value)? {
            info!("{}: target {:.1} {}", self.spec.name, value, self.spec.unit);
        }
        Ok(())
    }

    /// Advance one step toward the target. Ignored while halted.
    pub fn tick(&self) {
        if self.halted.load(Ordering::SeqCst) {
            return;
        }
        self.actuator.lock().tick();
    }

    /// Accept inline ticks again after an emergency stop.
    pub fn engage(&self) {
        self.halted.store(false, Ordering::SeqCst);
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> f64 {
        self.actuator.lock().current()
    }

    pub fn target(&self) -> f64 {
        self.actuator.lock().target()
    }

    pub fn settled(&self) -> bool {
        self.actuator.lock().settled()
    }

    fn rest_target(&self) {
        let rest = 0.0f64.clamp(self.spec.min, self.spec.max);
        if let Err(e) = self.set_target(rest) {
            warn!("{}: cannot return to rest: {}", self.spec.name, e);
        }
    }
}

impl ActuatorController for SlewDrive {
    fn name(&self) -> &'static str {
        self.spec.name
    }

    fn start(&self) -> bool {
        self.engage();
        let actuator = Arc::clone(&self.actuator);
        let started = self.ticker.start(move || {
            actuator.lock().tick();
            ControlFlow::Continue(())
        });
        if !started {
            warn!("{}: already running", self.spec.name);
        }
        started
    }

    /// Slew back toward rest and stop the loop.
    fn stop(&self) {
        self.rest_target();
        self.ticker.stop();
    }

    fn emergency_stop(&self) {
        self.halted.store(true, Ordering::SeqCst);
        self.ticker.emergency_stop();
        let mut a = self.actuator.lock();
        match self.spec.on_emergency {
            EmergencyPolicy::Zero => a.zero(),
            EmergencyPolicy::Hold => a.hold(),
        }
        warn!(
            "{}: emergency stop at {:.1} {}",
            self.spec.name,
            a.current(),
            self.spec.unit
        );
    }

    fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    fn reset(&self) {
        self.emergency_stop();
        *self.actuator.lock() = SlewLimitedActuator::new(
            self.spec.initial,
            self.spec.step,
            self.spec.min,
            self.spec.max,
        );
        self.engage();
    }
}
