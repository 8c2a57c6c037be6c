//! Control primitives shared by every actuator controller.
//!
//! * [`slew`]: slew-rate limited value tracking
//! * [`duty`]: rolling on/off duty-cycle window
//! * [`ticker`]: fixed-interval loop threads with a uniform stop protocol

pub mod duty;
pub mod slew;
pub mod ticker;
