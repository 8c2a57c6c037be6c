//! Fault classification and recovery.
//!
//! Operations on the main loop run inside [`FaultHandler::guard`]. A fault
//! from the recoverable taxonomy is parked in the pending slot and the
//! system is put into EMERGENCY; anything else is handed back to the caller.
//! Worker threads report into the same slot through [`FaultSink`].
//!
//! While in EMERGENCY the main loop calls [`FaultHandler::handle_emergency`]
//! once per tick until the slot is empty:
//!
//! | Pending fault     | Recovery                                        |
//! |-------------------|-------------------------------------------------|
//! | `AlreadyActive`   | discard                                         |
//! | `SafetyViolation` | emergency-stop the program only                 |
//! | `Transient`       | discard                                         |
//! | anything else     | factory reset of every subsystem                |

use log::{error, info, warn};
use parking_lot::Mutex;

use crate::app::ports::FaultSink;
use crate::error::{Fault, Result};

/// The side of the system the fault handler acts on.
pub trait FaultTarget {
    fn declare_emergency(&self);
    /// Stop the active program immediately, leaving the rest running.
    fn emergency_stop_program(&self);
    /// Silence the alarm, stop everything, and restore factory state.
    fn factory_reset(&self);
}

#[derive(Debug, Default)]
pub struct FaultHandler {
    pending: Mutex<Option<Fault>>,
}

impl FaultHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op`, classifying any fault it returns.
    ///
    /// * `Ok(Some(v))`: the operation succeeded.
    /// * `Ok(None)`: a recoverable fault was parked and `target` put into
    ///   EMERGENCY.
    /// * `Err(fault)`: fatal, propagated unchanged.
    pub fn guard<T>(
        &self,
        target: &dyn FaultTarget,
        op: impl FnOnce() -> Result<T>,
    ) -> Result<Option<T>> {
        match op() {
            Ok(value) => Ok(Some(value)),
            Err(fault) if fault.is_recoverable() => {
                error!("Internal {} fault ({}), entering emergency state", fault.kind(), fault);
                self.park(fault);
                target.declare_emergency();
                Ok(None)
            }
            Err(fault) => Err(fault),
        }
    }

    fn park(&self, fault: Fault) {
        let mut slot = self.pending.lock();
        match slot.as_ref() {
            // Keep the fault that needs the heavier recovery.
            Some(existing) if existing.severity() >= fault.severity() => {
                warn!(
                    "{} fault '{}' dropped, {} fault '{}' still pending",
                    fault.kind(),
                    fault,
                    existing.kind(),
                    existing
                );
            }
            _ => *slot = Some(fault),
        }
    }

    /// `true` while a fault awaits recovery.
    pub fn is_busy(&self) -> bool {
        self.pending.lock().is_some()
    }

    pub fn pending(&self) -> Option<Fault> {
        self.pending.lock().clone()
    }

    /// Run one recovery step for the pending fault, if any.
    pub fn handle_emergency(&self, target: &dyn FaultTarget) {
        let Some(fault) = self.pending.lock().take() else {
            return;
        };
        info!("Recovering from {} fault", fault.kind());
        match fault {
            Fault::AlreadyActive => {
                info!("Start ignored: a program is already running");
            }
            Fault::SafetyViolation(reason) => {
                error!("Safety violation ({}), stopping program", reason);
                target.emergency_stop_program();
            }
            Fault::Transient(tag) => {
                info!("Transient fault '{}' cleared", tag);
            }
            other => {
                error!("Unrecoverable fault ({}), resetting system", other);
                target.factory_reset();
            }
        }
    }

    pub fn clear(&self) {
        *self.pending.lock() = None;
    }
}

impl FaultSink for FaultHandler {
    fn report(&self, fault: Fault) {
        self.park(fault);
    }
}
