//! Port traits: the boundary between the controller core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SystemController (domain)
//! ```
//!
//! Sensor models, user input, and the display implement these traits.
//! The core only ever sees the traits, so every collaborator can be
//! replaced by a mock in tests.
//!
//! Sensor readings are consumed from several threads at once (the main
//! loop, the program worker, the magnetron and fan loops), so
//! [`SensorReadings`] takes `&self` and implementations synchronise
//! internally.

use super::commands::Action;
use super::events::DisplayState;
use crate::error::Fault;

// ───────────────────────────────────────────────────────────────
// Sensor port
// ───────────────────────────────────────────────────────────────

/// Read-side port for every sensor the controller consults.
pub trait SensorReadings: Send + Sync {
    /// First magnetron temperature probe (°C).
    fn magnetron_temp_1(&self) -> f64;
    /// Second magnetron temperature probe (°C).
    fn magnetron_temp_2(&self) -> f64;
    /// First cavity temperature probe (°C).
    fn inner_temp_1(&self) -> f64;
    /// Second cavity temperature probe (°C).
    fn inner_temp_2(&self) -> f64;
    /// Cavity humidity (%).
    fn humidity(&self) -> f64;
    /// Weight on the turntable, turntable included (g).
    fn weight(&self) -> f64;

    /// Advance the sensor models by one main-loop tick.
    fn update(&self);

    /// Return every sensor to its initial state.
    fn reset(&self);

    /// Mean of both magnetron probes.
    fn magnetron_temp_avg(&self) -> f64 {
        (self.magnetron_temp_1() + self.magnetron_temp_2()) / 2.0
    }

    /// Hotter of both magnetron probes.
    fn magnetron_temp_max(&self) -> f64 {
        self.magnetron_temp_1().max(self.magnetron_temp_2())
    }

    /// Mean of both cavity probes.
    fn inner_temp_avg(&self) -> f64 {
        (self.inner_temp_1() + self.inner_temp_2()) / 2.0
    }
}

// ───────────────────────────────────────────────────────────────
// Action source port
// ───────────────────────────────────────────────────────────────

/// Source of user actions, polled once per main-loop tick.
pub trait ActionSource: Send {
    /// The next pending action, if any. At most one per poll.
    fn poll(&mut self) -> Option<Action>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget program status output.
pub trait DisplaySink: Send {
    fn show(&mut self, state: &DisplayState);
}

// ───────────────────────────────────────────────────────────────
// Fault reporting port
// ───────────────────────────────────────────────────────────────

/// Where worker threads hand faults they cannot return to a caller.
pub trait FaultSink: Send + Sync {
    fn report(&self, fault: Fault);
}
