//! Unified error and fault types for the appliance controller.
//!
//! Two families live here:
//!
//! * [`Fault`]: the closed taxonomy of recoverable failures handed to the
//!   [`FaultHandler`](crate::app::fault::FaultHandler), plus `Fatal` for
//!   everything the controller cannot recover from in place.
//! * [`ActuatorError`]: rejected actuator commands (out-of-range targets).
//!
//! Both are plain data and `Clone` so they can be parked in the shared
//! pending-fault slot and moved across thread boundaries.

use core::fmt;

// ---------------------------------------------------------------------------
// Fault taxonomy
// ---------------------------------------------------------------------------

/// Every failure that can surface from a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// A short-lived fault with no side effect to undo (also used to
    /// exercise the fault pipeline itself).
    Transient(&'static str),
    /// A safety interlock was violated, e.g. the door was forced open
    /// while locked.
    SafetyViolation(String),
    /// A program start was requested while one is already running.
    AlreadyActive,
    /// Anything outside the recoverable taxonomy.
    Fatal(String),
}

impl Fault {
    /// `true` for the members of the taxonomy that can be handled in place.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal(_))
    }

    /// Rank of the recovery this fault needs; higher is heavier.
    pub fn severity(&self) -> u8 {
        match self {
            Self::AlreadyActive => 0,
            Self::Transient(_) => 1,
            Self::SafetyViolation(_) => 2,
            Self::Fatal(_) => 3,
        }
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transient(_) => "transient",
            Self::SafetyViolation(_) => "safety",
            Self::AlreadyActive => "already-active",
            Self::Fatal(_) => "fatal",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient(tag) => write!(f, "transient fault: {tag}"),
            Self::SafetyViolation(msg) => write!(f, "safety violation: {msg}"),
            Self::AlreadyActive => write!(f, "a program is already running"),
            Self::Fatal(msg) => write!(f, "fatal: {msg}"),
        }
    }
}

impl std::error::Error for Fault {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

/// A command an actuator controller refused to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorError {
    /// Requested target lies outside the actuator's `[min, max]` range.
    OutOfRange { value: f64, min: f64, max: f64 },
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { value, min, max } => {
                write!(f, "value {value} outside [{min}, {max}]")
            }
        }
    }
}

impl std::error::Error for ActuatorError {}

/// A rejected actuator command inside a running program is a logic error
/// in the program, not something the system can recover from in place.
impl From<ActuatorError> for Fault {
    fn from(e: ActuatorError) -> Self {
        Self::Fatal(format!("actuator: {e}"))
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias for fault-raising operations.
pub type Result<T> = core::result::Result<T, Fault>;
