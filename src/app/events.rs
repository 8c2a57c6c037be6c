//! Outbound display state.
//!
//! The [`SystemController`](super::service::SystemController) pushes one
//! of these through the [`DisplaySink`](super::ports::DisplaySink) port
//! every running tick.

use super::commands::ProgramName;

/// Program status as shown on the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub program_name: ProgramName,
    pub running: bool,
    pub finished: bool,
    pub paused: bool,
}
