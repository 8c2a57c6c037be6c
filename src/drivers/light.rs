//! Cavity light.
//!
//! Lit while the door is open or while a program is actively running
//! (not paused, not finished). The controller only switches the lamp on
//! edges, so the log shows each change once.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::ticker::TickLoop;
use crate::drivers::ActuatorController;
use crate::drivers::door::DoorController;
use crate::program::ProgramStatus;

#[derive(Debug, Default)]
pub struct Light {
    on: AtomicBool,
}

impl Light {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the lamp. Returns `true` if the state changed.
    pub fn switch(&self, on: bool) -> bool {
        self.on.swap(on, Ordering::SeqCst) != on
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }
}

struct LightCore {
    light: Arc<Light>,
    door: Arc<DoorController>,
    program: Arc<dyn ProgramStatus>,
}

impl LightCore {
    fn cycle(&self) {
        let wanted = self.door.is_open()
            || (self.program.is_running()
                && !self.program.is_paused()
                && !self.program.is_finished());
        if self.light.switch(wanted) {
            info!("Light: {}", if wanted { "on" } else { "off" });
        }
    }
}

pub struct LightController {
    core: Arc<LightCore>,
    ticker: TickLoop,
}

impl LightController {
    pub fn new(
        config: &SystemConfig,
        light: Arc<Light>,
        door: Arc<DoorController>,
        program: Arc<dyn ProgramStatus>,
    ) -> Self {
        Self {
            core: Arc::new(LightCore {
                light,
                door,
                program,
            }),
            ticker: TickLoop::new("light", Duration::from_millis(config.light_interval_ms)),
        }
    }

    /// Evaluate the light once on the calling thread.
    pub fn cycle(&self) {
        self.core.cycle();
    }

    pub fn is_on(&self) -> bool {
        self.core.light.is_on()
    }
}

impl ActuatorController for LightController {
    fn name(&self) -> &'static str {
        self.ticker.name()
    }

    fn start(&self) -> bool {
        let core = Arc::clone(&self.core);
        let started = self.ticker.start(move || {
            core.cycle();
            ControlFlow::Continue(())
        });
        if !started {
            warn!("Light: already running");
        }
        started
    }

    fn stop(&self) {
        self.ticker.stop();
    }

    fn emergency_stop(&self) {
        self.ticker.emergency_stop();
    }

    fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    fn reset(&self) {
        self.emergency_stop();
        self.core.light.switch(false);
    }
}
