//! Door latch and its interlock.
//!
//! The door is locked while a program runs. A door that is both open and
//! locked means the latch was forced, which is a safety violation.

use log::{info, warn};
use parking_lot::Mutex;

use crate::error::{Fault, Result};

#[derive(Debug, Default, Clone, Copy)]
struct DoorState {
    opened: bool,
    locked: bool,
}

/// Door position and lock state.
#[derive(Debug, Default)]
pub struct DoorController {
    state: Mutex<DoorState>,
}

impl DoorController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the door. Opening a locked door forces the latch: the lock
    /// state is kept and the next [`check`](Self::check) reports it.
    pub fn open(&self) {
        let mut s = self.state.lock();
        if s.opened {
            warn!("Door: already open");
            return;
        }
        if s.locked {
            warn!("Door: forced open while locked");
        } else {
            info!("Door: opened");
        }
        s.opened = true;
    }

    pub fn close(&self) {
        let mut s = self.state.lock();
        if !s.opened {
            warn!("Door: already closed");
            return;
        }
        s.opened = false;
        info!("Door: closed");
    }

    /// Lock the door. Refused while the door is open.
    pub fn lock(&self) -> bool {
        let mut s = self.state.lock();
        if s.opened {
            warn!("Door: cannot lock while open");
            return false;
        }
        if !s.locked {
            s.locked = true;
            info!("Door: locked");
        }
        true
    }

    /// Unlock the door. Refused while the door is open.
    pub fn unlock(&self) -> bool {
        let mut s = self.state.lock();
        if s.opened {
            warn!("Door: cannot unlock while open");
            return false;
        }
        if s.locked {
            s.locked = false;
            info!("Door: unlocked");
        }
        true
    }

    /// Release the lock regardless of the door position.
    pub fn force_unlock(&self) {
        let mut s = self.state.lock();
        if s.locked {
            s.locked = false;
            warn!("Door: force unlocked");
        }
    }

    /// Interlock check: fails iff the door is open while locked.
    pub fn check(&self) -> Result<()> {
        let s = *self.state.lock();
        if s.opened && s.locked {
            return Err(Fault::SafetyViolation(
                "door opened while locked".into(),
            ));
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().opened
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock().locked
    }

    /// Closed and unlocked.
    pub fn reset(&self) {
        *self.state.lock() = DoorState::default();
    }
}
