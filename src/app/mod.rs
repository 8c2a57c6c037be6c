//! Application core: the system state machine and its collaborators.
//!
//! The controller decides; it never talks to the outside world directly.
//! User input, the display, and the sensors are reached through the
//! **port traits** in [`ports`], so the whole core runs against mocks in
//! tests.

pub mod appliance;
pub mod commands;
pub mod events;
pub mod fault;
pub mod ports;
pub mod service;
