//! Magnetron and its stochastic power modulator.
//!
//! The magnetron itself is a plain on/off switch. Average power comes
//! from the modulator: every tick it draws a uniform random number and
//! switches the magnetron on iff the draw falls below the target power
//! share. Over many ticks the on-share converges to the target.
//!
//! Before each draw the [`MagnetronSafety`] supervisor checks the rolling
//! one-minute duty share and both magnetron temperatures. A hazard forces
//! the magnetron off for that tick.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::SensorReadings;
use crate::config::SystemConfig;
use crate::control::duty::DutyCycleGovernor;
use crate::control::ticker::TickLoop;
use crate::drivers::ActuatorController;
use crate::error::ActuatorError;
use crate::safety::MagnetronSafety;

// ── Leaf device ───────────────────────────────────────────────

/// The physical magnetron switch.
#[derive(Debug, Default)]
pub struct Magnetron {
    active: AtomicBool,
}

impl Magnetron {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn_on(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn turn_off(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

// ── Modulator ─────────────────────────────────────────────────

struct ModulatorState {
    /// Cleared by `stop()`; the next tick switches off and ends the loop.
    enabled: bool,
    target_power_share: f64,
    history: DutyCycleGovernor,
    safety: MagnetronSafety,
    rng: StdRng,
}

struct ModulatorCore {
    magnetron: Arc<Magnetron>,
    sensors: Arc<dyn SensorReadings>,
    state: Mutex<ModulatorState>,
}

impl ModulatorCore {
    fn cycle(&self) -> ControlFlow<()> {
        let mut s = self.state.lock();
        if !s.enabled {
            self.magnetron.turn_off();
            return ControlFlow::Break(());
        }

        let duty = s.history.duty_share();
        let hazard = s.safety.evaluate(
            duty,
            self.sensors.magnetron_temp_1(),
            self.sensors.magnetron_temp_2(),
        );
        let on = hazard.is_none() && {
            let target = s.target_power_share;
            s.rng.gen_range(0.0..1.0) < target
        };

        if on {
            self.magnetron.turn_on();
        } else {
            self.magnetron.turn_off();
        }
        s.history.record(on);
        ControlFlow::Continue(())
    }
}

/// Periodic controller that modulates the magnetron to a target power share.
pub struct MagnetronModulator {
    core: Arc<ModulatorCore>,
    ticker: TickLoop,
}

impl MagnetronModulator {
    pub fn new(
        config: &SystemConfig,
        magnetron: Arc<Magnetron>,
        sensors: Arc<dyn SensorReadings>,
    ) -> Self {
        Self::with_rng(config, magnetron, sensors, StdRng::from_entropy())
    }

    /// Deterministic modulator for tests.
    pub fn with_seed(
        config: &SystemConfig,
        magnetron: Arc<Magnetron>,
        sensors: Arc<dyn SensorReadings>,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, magnetron, sensors, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: &SystemConfig,
        magnetron: Arc<Magnetron>,
        sensors: Arc<dyn SensorReadings>,
        rng: StdRng,
    ) -> Self {
        let state = ModulatorState {
            enabled: false,
            target_power_share: 0.0,
            history: DutyCycleGovernor::new(config.magnetron_window_len()),
            safety: MagnetronSafety::new(config),
            rng,
        };
        Self {
            core: Arc::new(ModulatorCore {
                magnetron,
                sensors,
                state: Mutex::new(state),
            }),
            ticker: TickLoop::new(
                "magnetron",
                Duration::from_millis(config.magnetron_interval_ms),
            ),
        }
    }

    /// Set the requested average power share in `[0, 1]`.
    pub fn set_target_power(&self, share: f64) -> Result<(), ActuatorError> {
        if !(0.0..=1.0).contains(&share) {
            return Err(ActuatorError::OutOfRange {
                value: share,
                min: 0.0,
                max: 1.0,
            });
        }
        let mut s = self.core.state.lock();
        if s.target_power_share != share {
            s.target_power_share = share;
            info!("Magnetron: target power share {:.2}", share);
        }
        Ok(())
    }

    pub fn target_power(&self) -> f64 {
        self.core.state.lock().target_power_share
    }

    /// On-share over the rolling one-minute window.
    pub fn duty_share(&self) -> f64 {
        self.core.state.lock().history.duty_share()
    }

    /// Run one modulation tick on the calling thread.
    pub fn cycle(&self) {
        let _ = self.core.cycle();
    }

    /// Arm the modulator without spawning its loop, for driving
    /// [`cycle`](Self::cycle) by hand.
    pub fn arm(&self) {
        self.core.state.lock().enabled = true;
    }
}

impl ActuatorController for MagnetronModulator {
    fn name(&self) -> &'static str {
        self.ticker.name()
    }

    fn start(&self) -> bool {
        if self.ticker.is_running() {
            warn!("Magnetron: already running");
            return false;
        }
        self.arm();
        let core = Arc::clone(&self.core);
        self.ticker.start(move || core.cycle())
    }

    fn stop(&self) {
        {
            let mut s = self.core.state.lock();
            s.enabled = false;
            s.target_power_share = 0.0;
        }
        self.core.magnetron.turn_off();
        self.ticker.stop();
    }

    fn emergency_stop(&self) {
        self.ticker.emergency_stop();
        {
            let mut s = self.core.state.lock();
            s.enabled = false;
            s.target_power_share = 0.0;
        }
        self.core.magnetron.turn_off();
        warn!("Magnetron: emergency stop");
    }

    fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    fn reset(&self) {
        self.emergency_stop();
        let mut s = self.core.state.lock();
        s.history.clear();
        s.safety.clear();
    }
}
