//! Program runner and program controller, driven directly.
//!
//! A scripted [`ProgramLogic`] counts its steps so the tests can observe
//! when the worker runs, parks, and exits without depending on any real
//! program's thermal behaviour.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use microwave::Fault;
use microwave::app::appliance::Appliance;
use microwave::error::Result;
use microwave::program::controller::ProgramController;
use microwave::program::{Components, Outcome, Program, ProgramLogic, ProgramStatus};

use crate::mock_hw::{RecordingFaults, WAIT, eventually, mock_appliance};

/// Steps until `finish_after` (if any), optionally failing on the first step.
struct Counting {
    steps: Arc<AtomicUsize>,
    finish_after: Option<usize>,
    fail_with: Option<Fault>,
}

impl Counting {
    fn endless(steps: &Arc<AtomicUsize>) -> Box<Self> {
        Box::new(Self {
            steps: Arc::clone(steps),
            finish_after: None,
            fail_with: None,
        })
    }
}

impl ProgramLogic for Counting {
    fn name(&self) -> &str {
        "Counting Program"
    }

    fn prepare(&mut self, parts: &Components) -> Result<()> {
        parts.turntable.set_speed(1.0)?;
        Ok(())
    }

    fn step(&mut self, parts: &Components) -> Result<Outcome> {
        if let Some(fault) = self.fail_with.take() {
            return Err(fault);
        }
        parts.magnetron.set_target_power(0.5)?;
        let n = self.steps.fetch_add(1, Ordering::SeqCst) + 1;
        match self.finish_after {
            Some(limit) if n >= limit => Ok(Outcome::Finished),
            _ => Ok(Outcome::Continue),
        }
    }
}

struct Bench {
    appliance: Appliance,
    faults: Arc<RecordingFaults>,
    controller: ProgramController,
}

impl Bench {
    fn new() -> Self {
        let (appliance, _) = mock_appliance();
        Self {
            appliance,
            faults: Arc::new(RecordingFaults::default()),
            controller: ProgramController::new(),
        }
    }

    fn program(&self, logic: Box<dyn ProgramLogic>) -> Arc<Program> {
        Arc::new(Program::new(
            logic,
            self.appliance.components(),
            Duration::from_millis(1),
            self.faults.clone(),
        ))
    }

    fn reported(&self) -> Vec<Fault> {
        self.faults.reported.lock().clone()
    }
}

// ── PRG-1: normal run ────────────────────────────────────────

#[test]
fn program_runs_to_completion_and_releases_door() {
    let bench = Bench::new();
    let steps = Arc::new(AtomicUsize::new(0));
    let program = bench.program(Box::new(Counting {
        steps: Arc::clone(&steps),
        finish_after: Some(5),
        fail_with: None,
    }));

    bench.controller.start(program);
    assert!(
        eventually(WAIT, || bench.controller.is_finished()),
        "program should finish after five steps"
    );
    assert!(eventually(WAIT, || !bench.controller.is_running()));
    assert_eq!(steps.load(Ordering::SeqCst), 5);
    assert!(
        eventually(WAIT, || !bench.appliance.door().is_locked()),
        "door is unlocked once the program winds down"
    );
    assert_eq!(bench.controller.running_program().as_str(), "Counting Program");
    assert!(bench.reported().is_empty());

    // Stopping a finished program leaves its status untouched.
    bench.controller.stop();
    assert!(bench.controller.is_finished());
    assert!(!bench.controller.is_paused());
}

#[test]
fn running_program_holds_the_door_locked() {
    let bench = Bench::new();
    let steps = Arc::new(AtomicUsize::new(0));
    bench.controller.start(bench.program(Counting::endless(&steps)));

    assert!(eventually(WAIT, || steps.load(Ordering::SeqCst) > 0));
    let door = bench.appliance.door();
    assert!(door.is_locked());
    assert!(door.check().is_ok());

    door.open();
    assert!(door.is_locked(), "forcing the door keeps the latch state");
    assert!(matches!(door.check(), Err(Fault::SafetyViolation(_))));

    bench.controller.emergency_stop();
    assert!(!door.is_locked());
    assert!(door.check().is_ok());
}

// ── PRG-2: pause / resume / stop ─────────────────────────────

#[test]
fn pause_parks_the_worker_until_resume() {
    let bench = Bench::new();
    let steps = Arc::new(AtomicUsize::new(0));
    bench.controller.start(bench.program(Counting::endless(&steps)));
    assert!(eventually(WAIT, || steps.load(Ordering::SeqCst) >= 3));

    bench.controller.pause();
    assert!(bench.controller.is_paused());
    assert!(
        eventually(WAIT, || bench.appliance.magnetron.target_power() == 0.0),
        "paused program drops magnetron power"
    );
    let parked = steps.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(steps.load(Ordering::SeqCst), parked, "no steps while paused");
    assert!(bench.controller.is_running(), "paused is still running");

    bench.controller.resume();
    assert!(
        eventually(WAIT, || steps.load(Ordering::SeqCst) > parked),
        "resume wakes the worker"
    );

    bench.controller.stop();
    assert!(!bench.controller.is_running());
    assert!(!bench.appliance.door().is_locked());
    assert_eq!(bench.appliance.magnetron.target_power(), 0.0);
}

#[test]
fn stop_while_paused_ends_the_program() {
    let bench = Bench::new();
    let steps = Arc::new(AtomicUsize::new(0));
    bench.controller.start(bench.program(Counting::endless(&steps)));
    assert!(eventually(WAIT, || steps.load(Ordering::SeqCst) > 0));

    bench.controller.pause();
    bench.controller.stop();
    assert!(!bench.controller.is_running());
    assert!(!bench.controller.is_finished(), "stopped is not finished");
    assert!(!bench.appliance.door().is_locked());
}

#[test]
fn stopped_program_is_not_revived() {
    let bench = Bench::new();
    let steps = Arc::new(AtomicUsize::new(0));
    let program = bench.program(Counting::endless(&steps));

    assert!(program.begin());
    program.stop();
    assert!(!program.begin(), "a stopped program cannot begin again");
    program.run();
    assert_eq!(steps.load(Ordering::SeqCst), 0);
}

#[test]
fn starting_again_replaces_the_running_program() {
    let bench = Bench::new();
    let first_steps = Arc::new(AtomicUsize::new(0));
    let second_steps = Arc::new(AtomicUsize::new(0));

    bench.controller.start(bench.program(Counting::endless(&first_steps)));
    assert!(eventually(WAIT, || first_steps.load(Ordering::SeqCst) > 0));

    bench.controller.start(bench.program(Counting::endless(&second_steps)));
    let frozen = first_steps.load(Ordering::SeqCst);
    assert!(eventually(WAIT, || second_steps.load(Ordering::SeqCst) > 0));
    assert_eq!(first_steps.load(Ordering::SeqCst), frozen, "first program is stopped");
    bench.controller.stop();
}

// ── PRG-3: emergency and faults ──────────────────────────────

#[test]
fn emergency_stop_halts_parts_and_force_unlocks() {
    let bench = Bench::new();
    let steps = Arc::new(AtomicUsize::new(0));
    bench.controller.start(bench.program(Counting::endless(&steps)));
    assert!(eventually(WAIT, || bench.appliance.door().is_locked()));

    bench.controller.emergency_stop();
    assert!(!bench.controller.is_running());
    assert!(!bench.appliance.door().is_locked());
    assert!(bench.appliance.turntable.is_halted());
    assert_eq!(bench.appliance.turntable.speed(), 0.0, "turntable stops dead");
    assert_eq!(bench.appliance.magnetron.target_power(), 0.0);
    assert!(!bench.appliance.hardware.magnetron.is_active());
}

#[test]
fn open_door_at_start_reports_transient() {
    let bench = Bench::new();
    bench.appliance.door().open();
    let steps = Arc::new(AtomicUsize::new(0));
    bench.controller.start(bench.program(Counting::endless(&steps)));

    assert!(
        eventually(WAIT, || !bench.reported().is_empty()),
        "failed door lock must be reported"
    );
    assert!(matches!(bench.reported()[0], Fault::Transient(_)));
    assert!(eventually(WAIT, || !bench.controller.is_running()));
    assert_eq!(steps.load(Ordering::SeqCst), 0);
}

#[test]
fn step_fault_is_reported_and_winds_down() {
    let bench = Bench::new();
    let steps = Arc::new(AtomicUsize::new(0));
    let program = bench.program(Box::new(Counting {
        steps: Arc::clone(&steps),
        finish_after: None,
        fail_with: Some(Fault::Fatal("sensor lost".into())),
    }));
    bench.controller.start(program);

    assert!(eventually(WAIT, || !bench.reported().is_empty()));
    assert_eq!(bench.reported()[0], Fault::Fatal("sensor lost".into()));
    assert!(eventually(WAIT, || !bench.appliance.door().is_locked()));
    assert!(!bench.controller.is_finished());
}

#[test]
fn controller_without_program_reports_idle_status() {
    let controller = ProgramController::new();
    assert!(!controller.has_program());
    assert!(!controller.is_running());
    assert!(controller.is_finished());
    assert_eq!(controller.running_program().as_str(), "No program running");

    // All of these only warn.
    controller.pause();
    controller.resume();
    controller.stop();
    controller.emergency_stop();
    controller.reset();
}
