//! Rolling duty-cycle window for the magnetron.
//!
//! A fixed-capacity ring of on/off samples. The share of "on" samples is
//! computed against the number of slots ever written, so during warm-up
//! (fewer samples than capacity) the denominator is the sample count, and
//! once the ring has wrapped it is the full capacity.

/// Fixed-capacity ring of boolean samples.
#[derive(Debug, Clone)]
pub struct DutyCycleGovernor {
    window: Box<[bool]>,
    /// Next slot to overwrite.
    head: usize,
    /// Slots written at least once; saturates at capacity.
    filled: usize,
}

impl DutyCycleGovernor {
    /// Create an empty window. `capacity` is clamped to at least one slot.
    pub fn new(capacity: usize) -> Self {
        Self {
            window: vec![false; capacity.max(1)].into_boxed_slice(),
            head: 0,
            filled: 0,
        }
    }

    /// Overwrite the oldest slot with `sample`.
    pub fn record(&mut self, sample: bool) {
        self.window[self.head] = sample;
        self.head = (self.head + 1) % self.window.len();
        if self.filled < self.window.len() {
            self.filled += 1;
        }
    }

    /// Fraction of "on" samples among the slots written so far.
    pub fn duty_share(&self) -> f64 {
        if self.filled == 0 {
            return 0.0;
        }
        // Unwritten slots are still `false`, so counting the whole ring
        // only ever counts written "on" samples.
        let on = self.window.iter().filter(|s| **s).count();
        on as f64 / self.filled as f64
    }

    pub fn capacity(&self) -> usize {
        self.window.len()
    }

    pub fn filled_count(&self) -> usize {
        self.filled
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.window.fill(false);
        self.head = 0;
        self.filled = 0;
    }
}
