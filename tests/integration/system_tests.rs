//! System controller behaviour through the public API.
//!
//! Every test drives a real main loop over mock sensors. User actions go
//! through a [`ChannelActions`] sender the way the key reader feeds them in
//! the binary.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use microwave::adapters::actions::{ChannelActions, ScriptedActions};
use microwave::app::fault::FaultTarget;
use microwave::app::ports::FaultSink;
use microwave::drivers::ActuatorController;
use microwave::program::ProgramStatus;
use microwave::{Action, Fault, SystemController, SystemState};

use crate::mock_hw::{
    MockSensors, RecordingDisplay, WAIT, eventually, fast_config, mock_appliance,
    mock_appliance_with,
};

struct Rig {
    system: Arc<SystemController>,
    sensors: Arc<MockSensors>,
    display: RecordingDisplay,
    tx: Sender<Action>,
}

impl Rig {
    fn new() -> Self {
        let (appliance, sensors) = mock_appliance();
        let (tx, actions) = ChannelActions::channel();
        let display = RecordingDisplay::default();
        let system = SystemController::new(appliance, Box::new(actions), Box::new(display.clone()));
        Self {
            system,
            sensors,
            display,
            tx,
        }
    }

    fn started() -> Self {
        let rig = Self::new();
        assert!(rig.system.start());
        rig
    }

    fn send(&self, action: Action) {
        self.tx.send(action).expect("main loop dropped the action channel");
    }

    fn program_running(&self) -> bool {
        self.system.appliance().programs.is_running()
    }

    /// Start the defrost program and wait until its worker has locked the door.
    fn run_defrost(&self) {
        self.send(Action::start("defrost"));
        assert!(
            eventually(WAIT, || self.program_running() && self.system.appliance().door().is_locked()),
            "defrost should be running with the door locked"
        );
    }

    fn shutdown(self) {
        if self.system.state() != SystemState::Idle {
            self.system.stop();
        }
        self.system.wait();
    }
}

// ── SYS-1: lifecycle ─────────────────────────────────────────

#[test]
fn start_and_stop_cycle_through_idle() {
    let rig = Rig::new();
    assert_eq!(rig.system.state(), SystemState::Idle);

    assert!(rig.system.start());
    assert_eq!(rig.system.state(), SystemState::Running);
    assert!(!rig.system.start(), "second start must be refused");
    assert!(
        rig.system.appliance().light.is_running(),
        "start runs the light loop"
    );

    assert!(
        eventually(WAIT, || rig.sensors.update_count() > 0),
        "running ticks should advance the sensors"
    );

    rig.system.stop();
    assert_eq!(rig.system.state(), SystemState::Idle);
    assert!(
        !rig.system.appliance().light.is_running(),
        "stop ends the light loop"
    );
    rig.system.wait();
    assert!(rig.sensors.reset_count() >= 1, "stop resets the sensors");

    // Stopping an idle system is a no-op.
    rig.system.stop();
    assert_eq!(rig.system.state(), SystemState::Idle);

    // And it can be started again.
    assert!(rig.system.start());
    rig.shutdown();
}

#[test]
fn running_ticks_push_display_state() {
    let rig = Rig::started();
    assert!(
        eventually(WAIT, || rig.display.last().is_some()),
        "display should be refreshed every tick"
    );
    let shown = rig.display.last().expect("display state");
    assert_eq!(shown.program_name.as_str(), "No program running");
    assert!(!shown.running);
    assert!(shown.finished);
    rig.shutdown();
}

// ── SYS-2: programs ──────────────────────────────────────────

#[test]
fn start_action_runs_program_and_locks_door() {
    let rig = Rig::started();
    rig.run_defrost();

    let appliance = rig.system.appliance();
    assert!(
        eventually(WAIT, || rig.display.any(|d| d.running
            && d.program_name.as_str() == "Defrosting Program")),
        "display should show the running program"
    );
    assert!(
        eventually(WAIT, || appliance.light.is_on()),
        "cavity light is on while cooking"
    );
    assert!(
        eventually(WAIT, || appliance.magnetron.target_power() > 0.0),
        "defrost should request magnetron power"
    );

    rig.send(Action::Stop);
    assert!(eventually(WAIT, || !rig.program_running()));
    assert!(
        eventually(WAIT, || !appliance.door().is_locked()),
        "door unlocks once the program stops"
    );
    assert_eq!(rig.system.state(), SystemState::Running);
    rig.shutdown();
}

#[test]
fn start_with_open_door_is_ignored() {
    let rig = Rig::started();
    rig.send(Action::OpenDoor);
    assert!(eventually(WAIT, || rig.system.appliance().door().is_open()));

    rig.send(Action::start("defrost"));
    std::thread::sleep(Duration::from_millis(50));
    assert!(!rig.system.appliance().programs.has_program());
    assert!(!rig.system.faults().is_busy());
    rig.shutdown();
}

#[test]
fn unknown_program_is_ignored() {
    let rig = Rig::started();
    rig.send(Action::start("popcorn"));
    std::thread::sleep(Duration::from_millis(50));

    assert!(!rig.system.appliance().programs.has_program());
    assert!(!rig.system.appliance().alarm.is_alarming());
    assert_eq!(rig.system.state(), SystemState::Running);
    rig.shutdown();
}

#[test]
fn defrost_finishes_when_cavity_is_hot() {
    let rig = Rig::started();
    rig.sensors.set_weight(420.0); // empty turntable: one cycle
    rig.run_defrost();

    rig.sensors.set_inner_temp(70.0);
    let programs = &rig.system.appliance().programs;
    assert!(
        eventually(WAIT, || programs.is_finished() && !programs.is_running()),
        "one hot cycle completes the program"
    );
    assert!(
        eventually(WAIT, || rig.display.any(|d| d.finished && !d.running
            && d.program_name.as_str() == "Defrosting Program")),
        "display should report the finished program"
    );
    assert!(eventually(WAIT, || !rig.system.appliance().door().is_locked()));

    rig.system.stop();
    assert!(programs.is_finished());
    assert!(!programs.is_paused(), "a finished program is never reported paused");
    rig.system.wait();
}

#[test]
fn pause_cuts_power_and_resume_restores_it() {
    let rig = Rig::started();
    rig.run_defrost();
    let appliance = rig.system.appliance();
    assert!(eventually(WAIT, || appliance.magnetron.target_power() > 0.0));

    rig.send(Action::Pause);
    assert!(eventually(WAIT, || appliance.programs.is_paused()));
    assert!(
        eventually(WAIT, || appliance.magnetron.target_power() == 0.0),
        "magnetron power drops while paused"
    );
    assert!(
        eventually(WAIT, || !appliance.light.is_on()),
        "light goes off while paused with the door closed"
    );
    assert!(appliance.door().is_locked(), "door stays locked while paused");

    rig.send(Action::Resume);
    assert!(eventually(WAIT, || !appliance.programs.is_paused()));
    assert!(eventually(WAIT, || appliance.magnetron.target_power() > 0.0));
    rig.shutdown();
}

#[test]
fn scripted_session_runs_one_action_per_tick() {
    let (appliance, _sensors) = mock_appliance();
    let mut script = ScriptedActions::new([
        Action::OpenDoor,
        Action::CloseDoor,
        Action::start("defrost"),
    ]);
    script.push(Action::Pause);
    let system = SystemController::new(
        appliance,
        Box::new(script),
        Box::new(RecordingDisplay::default()),
    );
    assert!(system.start());

    let programs = &system.appliance().programs;
    assert!(
        eventually(WAIT, || programs.is_running() && programs.is_paused()),
        "script should leave the program paused"
    );
    assert!(!system.appliance().door().is_open());
    assert!(eventually(WAIT, || system.appliance().door().is_locked()));

    system.stop();
    system.wait();
    assert!(!programs.is_running());
}

// ── SYS-3: fault recovery ────────────────────────────────────

#[test]
fn second_start_is_already_active_and_recovers() {
    let rig = Rig::started();
    rig.run_defrost();

    rig.send(Action::start("defrost"));
    let appliance = rig.system.appliance();
    assert!(
        eventually(WAIT, || appliance.alarm.is_alarming()),
        "duplicate start raises the alarm"
    );
    assert!(
        eventually(WAIT, || rig.system.state() == SystemState::Running
            && !rig.system.faults().is_busy()),
        "already-active is discarded and the system resumes"
    );
    assert!(rig.program_running(), "the first program keeps running");
    assert!(appliance.alarm.is_alarming(), "alarm stays on until Off");
    rig.shutdown();
}

#[test]
fn forcing_the_door_stops_only_the_program() {
    let rig = Rig::started();
    rig.run_defrost();
    let appliance = rig.system.appliance();

    rig.send(Action::OpenDoor);
    assert!(
        eventually(WAIT, || !rig.program_running()),
        "safety violation stops the program"
    );
    assert!(eventually(WAIT, || !appliance.door().is_locked()));
    assert!(appliance.alarm.is_alarming());
    assert!(
        eventually(WAIT, || rig.system.state() == SystemState::Running),
        "system stays up after a safety stop"
    );
    assert!(appliance.turntable.is_halted(), "turntable is halted on emergency");
    rig.shutdown();
}

#[test]
fn transient_fault_is_discarded() {
    let rig = Rig::started();
    rig.system.faults().report(Fault::Transient("mock"));

    assert!(eventually(WAIT, || rig.system.appliance().alarm.is_alarming()));
    assert!(
        eventually(WAIT, || rig.system.state() == SystemState::Running
            && !rig.system.faults().is_busy()),
        "transient fault is cleared in one recovery step"
    );
    rig.shutdown();
}

#[test]
fn fatal_fault_resets_to_idle() {
    let rig = Rig::started();
    rig.run_defrost();
    rig.system.faults().report(Fault::Fatal("mock".into()));

    assert!(
        eventually(WAIT, || rig.system.state() == SystemState::Idle),
        "factory reset ends in IDLE"
    );
    rig.system.wait();

    let appliance = rig.system.appliance();
    assert!(!appliance.alarm.is_alarming(), "factory reset silences the alarm");
    assert!(!rig.system.faults().is_busy());
    assert!(!appliance.programs.has_program());
    assert!(!appliance.door().is_locked());
    assert_eq!(appliance.magnetron.target_power(), 0.0);
}

#[test]
fn off_shuts_down_and_silences_alarm() {
    let rig = Rig::started();
    rig.system.faults().report(Fault::Transient("mock"));
    assert!(eventually(WAIT, || rig.system.appliance().alarm.is_alarming()));
    assert!(eventually(WAIT, || rig.system.state() == SystemState::Running));

    rig.send(Action::Off);
    assert!(eventually(WAIT, || rig.system.state() == SystemState::Idle));
    rig.system.wait();
    assert!(!rig.system.appliance().alarm.is_alarming());
}

#[test]
fn declare_emergency_raises_alarm_and_holds_state() {
    // Slow main loop: the first tick comes long after the assertions.
    let config = microwave::SystemConfig {
        main_loop_interval_ms: 400,
        ..fast_config()
    };
    let (appliance, _sensors) = mock_appliance_with(config);
    let (_tx, actions) = ChannelActions::channel();
    let system = SystemController::new(
        appliance,
        Box::new(actions),
        Box::new(RecordingDisplay::default()),
    );
    assert!(system.start());
    assert_eq!(system.state(), SystemState::Running);

    system.declare_emergency();
    assert_eq!(system.state(), SystemState::Emergency);
    assert!(system.appliance().alarm.is_alarming());

    // Re-entry only warns.
    system.declare_emergency();
    assert_eq!(system.state(), SystemState::Emergency);
    assert!(system.appliance().alarm.is_alarming());

    // Nothing pending: the next tick returns to RUNNING.
    assert!(eventually(WAIT, || system.state() == SystemState::Running));
    assert!(system.appliance().alarm.is_alarming(), "alarm stays on until Off");

    system.stop();
    system.wait();
}
