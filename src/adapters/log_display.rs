//! Log-based display adapter.
//!
//! Implements [`DisplaySink`] by logging the program state whenever it
//! changes. Repeated identical states are dropped, so the log carries one
//! line per transition rather than one per main-loop tick.

use log::info;

use crate::app::events::DisplayState;
use crate::app::ports::DisplaySink;

#[derive(Debug, Default)]
pub struct LogDisplay {
    last: Option<DisplayState>,
    shown: usize,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of state changes logged so far.
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl DisplaySink for LogDisplay {
    fn show(&mut self, state: &DisplayState) {
        if self.last.as_ref() == Some(state) {
            return;
        }
        info!(
            "DISPLAY | program={} | running={} finished={} paused={}",
            state.program_name, state.running, state.finished, state.paused,
        );
        self.last = Some(state.clone());
        self.shown += 1;
    }
}
