//! Cooking programs and their execution.
//!
//! A [`Program`] is the runnable shell around a [`ProgramLogic`]: it owns
//! the running / paused / finished flags, the pause condition variable,
//! and the actuator sequencing common to every program (lock the door,
//! start magnetron and fan, tick the drives, wind everything down).
//! The logic only decides what the actuators should do each step.
//!
//! ```text
//!   run() ─▶ lock door ─▶ prepare ─▶ ┌─ step + tick drives ─┐ ─▶ stop parts
//!                                    │        │ paused      │     unlock door
//!                                    └── wait on condvar ◀──┘
//! ```

pub mod catalog;
pub mod controller;
pub mod defrost;

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use parking_lot::{Condvar, Mutex};

use crate::app::commands::{ProgramName, program_name};
use crate::app::ports::{FaultSink, SensorReadings};
use crate::drivers::ActuatorController;
use crate::drivers::cooling_fan::CoolingFanController;
use crate::drivers::door::DoorController;
use crate::drivers::magnetron::MagnetronModulator;
use crate::drivers::reflector::ReflectorController;
use crate::drivers::turntable::TurntableController;
use crate::error::{Fault, Result};

/// Read-only view of program progress, consumed by the light and display.
pub trait ProgramStatus: Send + Sync {
    fn is_running(&self) -> bool;
    fn is_paused(&self) -> bool;
    fn is_finished(&self) -> bool;
}

/// Result of one program step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Finished,
}

/// The sensors and actuators a program drives.
#[derive(Clone)]
pub struct Components {
    pub sensors: Arc<dyn SensorReadings>,
    pub door: Arc<DoorController>,
    pub magnetron: Arc<MagnetronModulator>,
    pub cooling_fan: Arc<CoolingFanController>,
    pub turntable: Arc<TurntableController>,
    pub reflector: Arc<ReflectorController>,
}

impl Components {
    fn threaded(&self) -> [&dyn ActuatorController; 4] {
        [
            self.magnetron.as_ref(),
            self.cooling_fan.as_ref(),
            self.turntable.as_ref(),
            self.reflector.as_ref(),
        ]
    }
}

/// What makes one program differ from another.
pub trait ProgramLogic: Send {
    fn name(&self) -> &str;

    /// Called once on the worker thread before the first step.
    fn prepare(&mut self, parts: &Components) -> Result<()>;

    /// One control step, called every program interval while not paused.
    fn step(&mut self, parts: &Components) -> Result<Outcome>;
}

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    running: bool,
    paused: bool,
    finished: bool,
    /// `begin()` has run once; a stopped program is not revived.
    started: bool,
    /// Set by `emergency_stop()`; the worker then skips the graceful wind-down.
    aborted: bool,
}

/// A runnable program instance. Runs once; build a new one to run again.
pub struct Program {
    name: ProgramName,
    flags: Mutex<Flags>,
    resume: Condvar,
    logic: Mutex<Box<dyn ProgramLogic>>,
    parts: Components,
    interval: Duration,
    faults: Arc<dyn FaultSink>,
}

impl Program {
    pub fn new(
        logic: Box<dyn ProgramLogic>,
        parts: Components,
        interval: Duration,
        faults: Arc<dyn FaultSink>,
    ) -> Self {
        Self {
            name: program_name(logic.name()),
            flags: Mutex::new(Flags::default()),
            resume: Condvar::new(),
            logic: Mutex::new(logic),
            parts,
            interval,
            faults,
        }
    }

    pub fn name(&self) -> &ProgramName {
        &self.name
    }

    /// Execute the program to completion on the calling thread.
    ///
    /// Faults raised here have no caller to return to, so they are handed
    /// to the fault sink.
    pub fn run(&self) {
        if !self.begin() {
            warn!("{} was already terminated", self.name);
            return;
        }
        info!("{} is starting", self.name);

        if let Err(fault) = self.execute() {
            error!("{} failed: {}", self.name, fault);
            self.faults.report(fault);
        }

        let aborted = {
            let mut f = self.flags.lock();
            f.running = false;
            f.paused = false;
            f.aborted
        };
        if !aborted {
            self.stop_components();
        }
        info!("{} ended", self.name);
    }

    /// Mark the program running. Called before the worker is spawned so
    /// the status is right from the first main-loop tick. Returns `false`
    /// once the program has been stopped, finished, or aborted.
    pub fn begin(&self) -> bool {
        let mut f = self.flags.lock();
        if f.aborted || f.finished || (f.started && !f.running) {
            return false;
        }
        f.started = true;
        f.running = true;
        f.paused = false;
        true
    }

    fn execute(&self) -> Result<()> {
        {
            let mut logic = self.logic.lock();
            if self.flags.lock().aborted {
                return Ok(());
            }
            if !self.parts.door.lock() {
                return Err(Fault::Transient("door open at program start"));
            }
            self.parts.turntable.engage();
            self.parts.reflector.engage();
            logic.prepare(&self.parts)?;
            self.parts.magnetron.start();
            self.parts.cooling_fan.start();
        }

        loop {
            {
                let mut f = self.flags.lock();
                if f.running && f.paused {
                    info!("Paused {}", self.name);
                    self.parts.magnetron.set_target_power(0.0)?;
                    while f.running && f.paused {
                        self.resume.wait(&mut f);
                    }
                    if f.running {
                        info!("Resumed {}", self.name);
                    }
                }
                if !f.running || f.finished {
                    return Ok(());
                }
            }

            let outcome = {
                let mut logic = self.logic.lock();
                if self.flags.lock().aborted {
                    return Ok(());
                }
                logic.step(&self.parts)?
            };
            self.parts.turntable.tick();
            self.parts.reflector.tick();

            if outcome == Outcome::Finished {
                info!("Finished {}", self.name);
                self.flags.lock().finished = true;
                return Ok(());
            }
            std::thread::sleep(self.interval);
        }
    }

    /// Request a pause; the worker parks before its next step.
    pub fn pause(&self) {
        let mut f = self.flags.lock();
        if !f.running {
            warn!("{} is not running, nothing to pause", self.name);
            return;
        }
        info!("Pausing {}", self.name);
        f.paused = true;
    }

    pub fn resume(&self) {
        {
            let mut f = self.flags.lock();
            info!("Resuming {}", self.name);
            f.paused = false;
        }
        self.resume.notify_all();
    }

    /// Cooperative stop; the worker winds the actuators down and exits.
    /// A finished program keeps its flags.
    pub fn stop(&self) {
        {
            let mut f = self.flags.lock();
            if f.finished {
                return;
            }
            info!("Stopping {}", self.name);
            f.paused = true;
            f.running = false;
        }
        self.resume.notify_all();
    }

    /// Stop, emergency-stop every owned actuator, and force the door open.
    pub fn emergency_stop(&self) {
        warn!("Emergency stopping {}", self.name);
        {
            let mut f = self.flags.lock();
            f.paused = true;
            f.running = false;
            f.aborted = true;
        }
        self.resume.notify_all();
        // Wait out a step in flight; later steps see `aborted`.
        drop(self.logic.lock());

        for part in self.parts.threaded() {
            part.emergency_stop();
        }
        self.parts.door.force_unlock();
    }

    fn stop_components(&self) {
        info!("Stopping all components from {}", self.name);
        for part in self.parts.threaded() {
            part.stop();
        }
        self.parts.door.unlock();
    }
}

impl ProgramStatus for Program {
    fn is_running(&self) -> bool {
        self.flags.lock().running
    }

    fn is_paused(&self) -> bool {
        self.flags.lock().paused
    }

    fn is_finished(&self) -> bool {
        self.flags.lock().finished
    }
}
