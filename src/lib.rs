//! Microwave appliance controller library.
//!
//! Exposes the controller core, the actuator controllers, and the simulated
//! sensors for the binary and for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod program;
pub mod safety;
pub mod sensors;

pub use app::appliance::Appliance;
pub use app::commands::Action;
pub use app::service::{SystemController, SystemState};
pub use config::SystemConfig;
pub use error::{Fault, Result};
