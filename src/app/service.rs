//! System controller: the top-level state machine.
//!
//! [`SystemController`] owns the main loop and the IDLE / RUNNING /
//! EMERGENCY state. Each RUNNING tick polls one user action, dispatches
//! it, pushes the program state to the display, and advances the sensors,
//! all inside the fault guard.
//!
//! ```text
//!            start()             classified fault
//!   IDLE ──────────────▶ RUNNING ─────────────────▶ EMERGENCY
//!    ▲                    │   ▲                        │
//!    └──── stop() / Off ──┘   └── nothing pending ─────┘
//! ```

use core::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, info, warn};
use parking_lot::Mutex;

use crate::control::ticker::{join_worker, spawn_named};
use crate::drivers::ActuatorController;
use crate::error::{Fault, Result};
use crate::program::{Program, ProgramStatus, catalog};

use super::appliance::Appliance;
use super::commands::Action;
use super::fault::{FaultHandler, FaultTarget};
use super::ports::{ActionSource, DisplaySink, FaultSink};

// ───────────────────────────────────────────────────────────────
// System state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    Idle,
    Running,
    Emergency,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

struct Io {
    actions: Box<dyn ActionSource>,
    display: Box<dyn DisplaySink>,
}

// ───────────────────────────────────────────────────────────────
// SystemController
// ───────────────────────────────────────────────────────────────

pub struct SystemController {
    appliance: Appliance,
    faults: Arc<FaultHandler>,
    state: Mutex<SystemState>,
    io: Mutex<Io>,
    main_loop: Mutex<Option<JoinHandle<()>>>,
    interval: Duration,
}

impl SystemController {
    pub fn new(
        appliance: Appliance,
        actions: Box<dyn ActionSource>,
        display: Box<dyn DisplaySink>,
    ) -> Arc<Self> {
        let interval = Duration::from_millis(appliance.config.main_loop_interval_ms);
        Arc::new(Self {
            appliance,
            faults: Arc::new(FaultHandler::new()),
            state: Mutex::new(SystemState::Idle),
            io: Mutex::new(Io { actions, display }),
            main_loop: Mutex::new(None),
            interval,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Leave IDLE and spawn the main loop. Returns `false` unless IDLE.
    pub fn start(self: &Arc<Self>) -> bool {
        if self.state() != SystemState::Idle {
            warn!("System is already running or in emergency state");
            return false;
        }
        // A previous loop exits on its next tick while the state is IDLE.
        let previous = self.main_loop.lock().take();
        if let Some(previous) = previous {
            join_worker("main-loop", previous);
        }
        {
            let mut state = self.state.lock();
            if *state != SystemState::Idle {
                warn!("System is already running or in emergency state");
                return false;
            }
            *state = SystemState::Running;
        }

        self.appliance.light.start();
        let this = Arc::clone(self);
        *self.main_loop.lock() = Some(spawn_named("main-loop", move || this.run_loop()));
        info!("System started");
        true
    }

    fn run_loop(&self) {
        loop {
            std::thread::sleep(self.interval);
            match self.tick() {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(fault) => {
                    error!("Major fault ({}), shutting down", fault);
                    self.shutdown();
                    break;
                }
            }
        }
    }

    /// Block until the main loop has exited.
    pub fn wait(&self) {
        let handle = self.main_loop.lock().take();
        if let Some(handle) = handle {
            join_worker("main-loop", handle);
        }
    }

    /// Run one main-loop iteration on the calling thread.
    ///
    /// Returns `Break` once the system is IDLE and `Err` for a fatal fault.
    pub fn tick(&self) -> Result<ControlFlow<()>> {
        match self.state() {
            SystemState::Idle => {
                info!("System is idle");
                Ok(ControlFlow::Break(()))
            }
            SystemState::Running => {
                debug!("System is running");
                self.faults.guard(self, || self.running_tick())?;
                Ok(ControlFlow::Continue(()))
            }
            SystemState::Emergency => {
                warn!("Emergency state!");
                if self.faults.is_busy() {
                    self.faults.handle_emergency(self);
                } else {
                    info!("No fault to handle, leaving emergency state");
                    self.transition(SystemState::Emergency, SystemState::Running);
                }
                Ok(ControlFlow::Continue(()))
            }
        }
    }

    fn running_tick(&self) -> Result<()> {
        // Faults reported by worker threads since the last tick.
        if self.faults.is_busy() {
            self.declare_emergency();
            return Ok(());
        }
        if self.appliance.programs.is_running() {
            self.appliance.door().check()?;
        }

        let action = self.io.lock().actions.poll();
        if let Some(action) = action {
            info!("Action: {}", action);
            self.dispatch(action)?;
        }

        let display = self.appliance.programs.display_state();
        self.io.lock().display.show(&display);
        self.appliance.sensors.update();
        Ok(())
    }

    fn dispatch(&self, action: Action) -> Result<()> {
        let programs = &self.appliance.programs;
        match action {
            Action::Start(name) => {
                if programs.is_running() {
                    return Err(Fault::AlreadyActive);
                }
                if self.appliance.door().is_open() {
                    warn!("Close the door before starting a program");
                    return Ok(());
                }
                let Some(logic) = catalog::lookup(&name, &self.appliance.config) else {
                    warn!("Unknown program '{}'", name);
                    return Ok(());
                };
                let faults: Arc<dyn FaultSink> = self.faults.clone();
                let program = Program::new(
                    logic,
                    self.appliance.components(),
                    Duration::from_millis(self.appliance.config.program_interval_ms),
                    faults,
                );
                programs.start(Arc::new(program));
            }
            Action::Stop => {
                if programs.is_running() {
                    programs.stop();
                } else {
                    info!("No program running, nothing to stop");
                }
            }
            Action::Pause => {
                if programs.is_running() && !programs.is_paused() {
                    programs.pause();
                } else {
                    info!("No program running, nothing to pause");
                }
            }
            Action::Resume => {
                if programs.is_running() && programs.is_paused() {
                    programs.resume();
                } else {
                    info!("No running program paused, nothing to resume");
                }
            }
            Action::Off => {
                self.shutdown();
                if self.appliance.alarm.is_alarming() {
                    self.appliance.alarm.deactivate();
                }
            }
            Action::OpenDoor => self.appliance.door().open(),
            Action::CloseDoor => self.appliance.door().close(),
        }
        Ok(())
    }

    /// Stop the program, reset the sensors, and return to IDLE.
    pub fn stop(&self) {
        if self.state() == SystemState::Idle {
            warn!("System is already idle, nothing to shut down");
            return;
        }
        info!("Shutting down system");
        if self.appliance.programs.is_running() {
            self.appliance.programs.stop();
        }
        self.appliance.light.stop();
        self.appliance.sensors.reset();
        *self.state.lock() = SystemState::Idle;
    }

    /// Alias of [`stop`](Self::stop), used on fatal faults.
    pub fn shutdown(&self) {
        self.stop();
    }

    fn transition(&self, from: SystemState, to: SystemState) {
        let mut state = self.state.lock();
        if *state == from {
            *state = to;
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> SystemState {
        *self.state.lock()
    }

    pub fn appliance(&self) -> &Appliance {
        &self.appliance
    }

    pub fn faults(&self) -> &FaultHandler {
        &self.faults
    }
}

impl FaultTarget for SystemController {
    fn declare_emergency(&self) {
        let mut state = self.state.lock();
        if *state == SystemState::Emergency {
            warn!("System is already in emergency state");
            return;
        }
        info!("Declaring emergency state");
        self.appliance.alarm.activate();
        *state = SystemState::Emergency;
    }

    fn emergency_stop_program(&self) {
        info!("Emergency stopping the program");
        self.appliance.programs.emergency_stop();
    }

    fn factory_reset(&self) {
        info!("Performing factory reset");
        if self.appliance.alarm.is_alarming() {
            self.appliance.alarm.deactivate();
        }
        self.shutdown();
        self.appliance.reset();
        self.faults.clear();
        *self.state.lock() = SystemState::Idle;
    }
}
