//! Cooling fan and its thermal controller.
//!
//! The fan's power share follows the hotter of two demands: whatever the
//! program requested, and what the magnetron's average temperature calls
//! for (see [`temp_to_power_share`]). Changes are slew-limited so the fan
//! spins up and down gradually.
//!
//! `stop()` does not cut the fan. It drops the request to zero and lets the
//! loop run until the power share has fallen to one step above zero, so a
//! hot magnetron keeps being cooled after the program ends.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::app::ports::SensorReadings;
use crate::config::SystemConfig;
use crate::control::slew::SlewLimitedActuator;
use crate::control::ticker::TickLoop;
use crate::drivers::ActuatorController;
use crate::error::ActuatorError;

/// Fan power share demanded by a magnetron temperature (°C).
///
/// | Temperature     | Share                          |
/// |-----------------|--------------------------------|
/// | ≤ 50            | 0                              |
/// | (50, 100]       | (t − 50) / 200, up to 0.25     |
/// | (100, 150)      | 0.25 + (t − 100) · 0.015       |
/// | ≥ 150           | 1                              |
pub fn temp_to_power_share(temp: f64) -> f64 {
    if temp <= 50.0 {
        0.0
    } else if temp <= 100.0 {
        (temp - 50.0) / 200.0
    } else if temp < 150.0 {
        0.25 + (temp - 100.0) * 0.015
    } else {
        1.0
    }
}

// ── Leaf device ───────────────────────────────────────────────

/// The physical fan. Stores its power share as `f64` bits so sensor
/// models can read it without locking.
#[derive(Debug, Default)]
pub struct CoolingFan {
    power_share: AtomicU64,
}

impl CoolingFan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power_share(&self) -> f64 {
        f64::from_bits(self.power_share.load(Ordering::SeqCst))
    }

    fn set_power_share(&self, share: f64) {
        self.power_share.store(share.to_bits(), Ordering::SeqCst);
    }
}

// ── Controller ────────────────────────────────────────────────

struct FanState {
    actuator: SlewLimitedActuator,
    /// Externally requested share; heat demand may raise the effective target.
    requested: f64,
    /// Set by `stop()`: wind down once heat demand is gone, then end the loop.
    cooldown: bool,
    /// Loop spawned and not yet ended by its own cooldown.
    looping: bool,
}

struct FanCore {
    fan: Arc<CoolingFan>,
    sensors: Arc<dyn SensorReadings>,
    state: Mutex<FanState>,
}

impl FanCore {
    fn cycle(&self) -> ControlFlow<()> {
        let demand = temp_to_power_share(self.sensors.magnetron_temp_avg());
        let mut s = self.state.lock();

        let target = s.requested.max(demand);
        if let Ok(true) = s.actuator.set_target(target) {
            debug!("Cooling fan: target {:.2}", target);
        }
        s.actuator.tick();
        self.fan.set_power_share(s.actuator.current());

        let idle = s.actuator.step();
        if s.cooldown && target <= idle && s.actuator.current() <= idle {
            s.actuator.zero();
            self.fan.set_power_share(0.0);
            s.cooldown = false;
            s.looping = false;
            info!("Cooling fan: spun down");
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

/// Periodic controller for the cooling fan.
pub struct CoolingFanController {
    core: Arc<FanCore>,
    ticker: TickLoop,
    start_share: f64,
}

impl CoolingFanController {
    pub fn new(
        config: &SystemConfig,
        fan: Arc<CoolingFan>,
        sensors: Arc<dyn SensorReadings>,
    ) -> Self {
        let state = FanState {
            actuator: SlewLimitedActuator::new(0.0, config.cooling_fan_step, 0.0, 1.0),
            requested: 0.0,
            cooldown: false,
            looping: false,
        };
        Self {
            core: Arc::new(FanCore {
                fan,
                sensors,
                state: Mutex::new(state),
            }),
            ticker: TickLoop::new(
                "cooling-fan",
                Duration::from_millis(config.cooling_fan_interval_ms),
            ),
            start_share: config.cooling_fan_start_share,
        }
    }

    /// Request a power share in `[0, 1]`.
    pub fn set_target(&self, share: f64) -> Result<(), ActuatorError> {
        if !(0.0..=1.0).contains(&share) {
            return Err(ActuatorError::OutOfRange {
                value: share,
                min: 0.0,
                max: 1.0,
            });
        }
        let mut s = self.core.state.lock();
        if s.requested != share {
            s.requested = share;
            info!("Cooling fan: requested {:.2}", share);
        }
        Ok(())
    }

    pub fn power_share(&self) -> f64 {
        self.core.fan.power_share()
    }

    /// Current slew target (request and heat demand combined).
    pub fn target(&self) -> f64 {
        self.core.state.lock().actuator.target()
    }

    /// Run one control tick on the calling thread.
    pub fn cycle(&self) {
        let _ = self.core.cycle();
    }

    fn halt(&self) {
        let mut s = self.core.state.lock();
        s.actuator.zero();
        s.requested = 0.0;
        s.cooldown = false;
        s.looping = false;
        self.core.fan.set_power_share(0.0);
    }
}

impl ActuatorController for CoolingFanController {
    fn name(&self) -> &'static str {
        self.ticker.name()
    }

    fn start(&self) -> bool {
        let mut s = self.core.state.lock();
        if s.looping && !s.cooldown {
            warn!("Cooling fan: already running");
            return false;
        }
        s.requested = self.start_share;
        if s.looping {
            // Loop still spinning down from the last stop: keep it.
            s.cooldown = false;
            info!("Cooling fan: cooldown cancelled");
            return true;
        }
        s.looping = true;
        drop(s);

        let core = Arc::clone(&self.core);
        if self.ticker.start({
            let core = Arc::clone(&core);
            move || core.cycle()
        }) {
            return true;
        }
        // Previous loop is still unwinding from its own spin-down.
        self.ticker.join();
        self.ticker.start(move || core.cycle())
    }

    fn stop(&self) {
        let mut s = self.core.state.lock();
        s.requested = 0.0;
        if s.looping {
            s.cooldown = true;
            info!("Cooling fan: cooling down");
        }
    }

    fn emergency_stop(&self) {
        self.ticker.emergency_stop();
        self.halt();
        warn!("Cooling fan: emergency stop");
    }

    fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    fn reset(&self) {
        self.emergency_stop();
    }
}
