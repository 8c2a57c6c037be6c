//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements     | Connects to                     |
//! |----------------|----------------|---------------------------------|
//! | `actions`      | ActionSource   | scripted queue / mpsc channel   |
//! | `log_display`  | DisplaySink    | log output                      |
//!
//! The sensor port is implemented by [`crate::sensors::SimulatedSensors`].

pub mod actions;
pub mod log_display;
