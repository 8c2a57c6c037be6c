//! Lifecycle of the active program and its worker thread.

use std::sync::Arc;
use std::thread::JoinHandle;

use log::{info, warn};
use parking_lot::Mutex;

use crate::app::commands::{ProgramName, program_name};
use crate::app::events::DisplayState;
use crate::control::ticker::{join_worker, spawn_named};
use crate::program::{Program, ProgramStatus};

/// Name shown when no program has been started yet.
pub const NO_PROGRAM: &str = "No program running";

#[derive(Default)]
struct Active {
    program: Option<Arc<Program>>,
    worker: Option<JoinHandle<()>>,
}

/// Owns at most one program and the thread running it.
#[derive(Default)]
pub struct ProgramController {
    active: Mutex<Active>,
}

impl ProgramController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current program with `program` and run it on a worker.
    ///
    /// A previous program that is still running is stopped and joined first.
    pub fn start(&self, program: Arc<Program>) {
        self.stop_previous();

        info!("Starting program: {}", program.name());
        program.begin();
        let runner = Arc::clone(&program);
        let worker = spawn_named("program", move || runner.run());

        let mut a = self.active.lock();
        a.program = Some(program);
        a.worker = Some(worker);
    }

    fn stop_previous(&self) {
        let previous = {
            let mut a = self.active.lock();
            let running = a.program.clone().filter(|p| p.is_running());
            match running {
                Some(p) => {
                    warn!("Replacing running program {}", p.name());
                    p.stop();
                    a.worker.take()
                }
                None => None,
            }
        };
        if let Some(worker) = previous {
            join_worker("program", worker);
        }
    }

    /// A program has been started and not reset since.
    pub fn has_program(&self) -> bool {
        self.active.lock().program.is_some()
    }

    fn current(&self) -> Option<Arc<Program>> {
        self.active.lock().program.clone()
    }

    fn take_worker(&self) -> Option<JoinHandle<()>> {
        self.active.lock().worker.take()
    }

    pub fn pause(&self) {
        match self.current() {
            Some(p) => p.pause(),
            None => warn!("No program to pause"),
        }
    }

    pub fn resume(&self) {
        match self.current() {
            Some(p) => p.resume(),
            None => warn!("No program to resume"),
        }
    }

    /// Stop the program and wait for its worker to wind down.
    pub fn stop(&self) {
        let Some(program) = self.current() else {
            warn!("No program to stop");
            return;
        };
        info!("Stopping program: {}", program.name());
        program.stop();
        if let Some(worker) = self.take_worker() {
            join_worker("program", worker);
        }
    }

    /// Emergency-stop the program and its actuators, then join the worker.
    pub fn emergency_stop(&self) {
        let Some(program) = self.current() else {
            warn!("No program to emergency stop");
            return;
        };
        program.emergency_stop();
        if let Some(worker) = self.take_worker() {
            join_worker("program", worker);
        }
    }

    /// Name of the current program, or [`NO_PROGRAM`].
    pub fn running_program(&self) -> ProgramName {
        match self.current() {
            Some(p) => p.name().clone(),
            None => program_name(NO_PROGRAM),
        }
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            program_name: self.running_program(),
            running: self.is_running(),
            finished: self.is_finished(),
            paused: self.is_paused(),
        }
    }

    /// Emergency-stop whatever runs and forget it.
    pub fn reset(&self) {
        if self.current().is_some() {
            self.emergency_stop();
        }
        *self.active.lock() = Active::default();
    }
}

impl ProgramStatus for ProgramController {
    fn is_running(&self) -> bool {
        self.current().is_some_and(|p| p.is_running())
    }

    fn is_paused(&self) -> bool {
        self.current().is_some_and(|p| p.is_paused())
    }

    /// `true` with no program: nothing is left to do.
    fn is_finished(&self) -> bool {
        self.current().is_none_or(|p| p.is_finished())
    }
}
