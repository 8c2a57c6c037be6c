//! Audible alarm, raised while the system is in EMERGENCY.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

#[derive(Debug, Default)]
pub struct AlarmController {
    alarming: AtomicBool,
}

impl AlarmController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&self) {
        if self.alarming.swap(true, Ordering::SeqCst) {
            warn!("Alarm: already active");
        } else {
            warn!("Alarm: ACTIVE");
        }
    }

    pub fn deactivate(&self) {
        if self.alarming.swap(false, Ordering::SeqCst) {
            info!("Alarm: cleared");
        } else {
            warn!("Alarm: not active");
        }
    }

    pub fn is_alarming(&self) -> bool {
        self.alarming.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.alarming.store(false, Ordering::SeqCst);
    }
}
