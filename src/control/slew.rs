//! Slew-rate limited actuator value
//!
//! Tracks a target under a per-tick step limit so that speeds and angles
//! change gradually, the way the physical parts do.

use crate::error::ActuatorError;

/// A value that approaches its target by at most `step` per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SlewLimitedActuator {
    current: f64,
    target: f64,
    step: f64,
    min: f64,
    max: f64,
}

impl SlewLimitedActuator {
    /// New actuator at rest at `initial`, which must lie in `[min, max]`.
    pub fn new(initial: f64, step: f64, min: f64, max: f64) -> Self {
        debug_assert!(min <= max, "inverted actuator range");
        debug_assert!(step > 0.0, "slew step must be positive");
        Self {
            current: initial,
            target: initial.clamp(min, max),
            step,
            min,
            max,
        }
    }

    /// Set a new target.
    ///
    /// Returns `Ok(true)` when the target changed and `Ok(false)` when it
    /// already had this value.
    pub fn set_target(&mut self, value: f64) -> Result<bool, ActuatorError> {
        if !(self.min..=self.max).contains(&value) {
            return Err(ActuatorError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        if value == self.target {
            return Ok(false);
        }
        self.target = value;
        Ok(true)
    }

    /// Advance one tick: move toward the target, snap when within one
    /// step, then clamp to bounds. Clamping last lets a value seeded out
    /// of range be pulled back in on the first tick.
    pub fn tick(&mut self) {
        let distance = self.target - self.current;
        if distance.abs() <= self.step {
            self.current = self.target;
        } else {
            self.current += self.step.copysign(distance);
        }
        self.current = self.current.clamp(self.min, self.max);
    }

    /// Overwrite the current value without slewing (e.g. driven externally).
    /// Not clamped; the next [`tick`](Self::tick) brings it back in range.
    pub fn force_current(&mut self, value: f64) {
        self.current = value;
    }

    /// Halt in place: the target becomes the current value.
    pub fn hold(&mut self) {
        self.target = self.current.clamp(self.min, self.max);
    }

    /// Zero both current and target (instant stop).
    pub fn zero(&mut self) {
        let rest = 0.0f64.clamp(self.min, self.max);
        self.current = rest;
        self.target = rest;
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// `true` once the current value has reached the target.
    pub fn settled(&self) -> bool {
        self.current == self.target
    }
}
