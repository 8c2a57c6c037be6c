//! Actuator drivers and their controllers.
//!
//! Leaf devices (`Magnetron`, `CoolingFan`, `Light`, `Alarm`) only hold
//! the physical state. Controllers wrap a leaf, decide what it should do,
//! and run their decision loop on a [`TickLoop`](crate::control::ticker::TickLoop).
//!
//! All controllers share one lifecycle contract, captured by
//! [`ActuatorController`]:
//!
//! | Call               | Blocks | Effect                                        |
//! |--------------------|--------|-----------------------------------------------|
//! | `start()`          | no     | spawn the loop; `false` if already running    |
//! | `stop()`           | no     | graceful wind-down, loop exits on its own     |
//! | `emergency_stop()` | yes    | loop exits on its next check, thread joined   |
//! | `reset()`          | yes    | emergency stop, then factory state            |

pub mod alarm;
pub mod cooling_fan;
pub mod door;
pub mod light;
pub mod magnetron;
pub mod reflector;
pub mod slew_drive;
pub mod turntable;

/// Common lifecycle of every periodic actuator controller.
pub trait ActuatorController: Send + Sync {
    /// Name used in log lines and thread names.
    fn name(&self) -> &'static str;

    /// Start the control loop. Returns `false` if it was already running.
    fn start(&self) -> bool;

    /// Graceful stop. Returns without waiting for the loop to exit.
    fn stop(&self);

    /// Immediate stop. On return the loop thread has exited and no further
    /// tick of this controller can execute until the next `start()`.
    fn emergency_stop(&self);

    /// Whether the control loop is currently running.
    fn is_running(&self) -> bool;

    /// Emergency stop and restore the factory state.
    fn reset(&self);
}
