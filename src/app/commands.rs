//! Inbound user actions.
//!
//! These represent requests from the control panel that the
//! [`SystemController`](super::service::SystemController) interprets and
//! dispatches to the program and door controllers.

use core::fmt;

/// Maximum stored length of a program name.
pub const PROGRAM_NAME_LEN: usize = 32;

/// Fixed-capacity program name.
pub type ProgramName = heapless::String<PROGRAM_NAME_LEN>;

/// Program started by the panel's start key.
pub const DEFAULT_PROGRAM: &str = "defrost";

/// Build a [`ProgramName`], truncating at [`PROGRAM_NAME_LEN`] bytes on a
/// character boundary.
pub fn program_name(name: &str) -> ProgramName {
    let mut out = ProgramName::new();
    for ch in name.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Actions the user can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start the named program.
    Start(ProgramName),
    /// Stop the running program.
    Stop,
    /// Pause the running program.
    Pause,
    /// Resume a paused program.
    Resume,
    /// Switch the appliance off.
    Off,
    /// The door was opened.
    OpenDoor,
    /// The door was closed.
    CloseDoor,
}

impl Action {
    /// Start the given program by name.
    pub fn start(name: &str) -> Self {
        Self::Start(program_name(name))
    }

    /// Decode a panel key into an action.
    ///
    /// | Key               | Action                    |
    /// |-------------------|---------------------------|
    /// | `esc`, `off`      | `Off`                     |
    /// | `enter`, `start`  | `Start(DEFAULT_PROGRAM)`  |
    /// | `start <name>`    | `Start(name)`             |
    /// | `o`               | `OpenDoor`                |
    /// | `c`               | `CloseDoor`               |
    /// | `s`               | `Stop`                    |
    /// | `p`               | `Pause`                   |
    /// | `r`               | `Resume`                  |
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        if let Some(name) = key.strip_prefix("start ") {
            let name = name.trim();
            if !name.is_empty() {
                return Some(Self::start(name));
            }
        }
        match key {
            "esc" | "off" => Some(Self::Off),
            "enter" | "start" => Some(Self::start(DEFAULT_PROGRAM)),
            "o" => Some(Self::OpenDoor),
            "c" => Some(Self::CloseDoor),
            "s" => Some(Self::Stop),
            "p" => Some(Self::Pause),
            "r" => Some(Self::Resume),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(name) => write!(f, "START({name})"),
            Self::Stop => write!(f, "STOP"),
            Self::Pause => write!(f, "PAUSE"),
            Self::Resume => write!(f, "RESUME"),
            Self::Off => write!(f, "OFF"),
            Self::OpenDoor => write!(f, "OPEN_DOOR"),
            Self::CloseDoor => write!(f, "CLOSE_DOOR"),
        }
    }
}
