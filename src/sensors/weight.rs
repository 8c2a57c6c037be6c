//! Turntable load cell model.

/// Load added each time the door is opened (g).
pub const LOAD_ON_OPEN_G: f64 = 530.0;

#[derive(Debug, Clone)]
pub struct WeightModel {
    value: f64,
    tare: f64,
    door_was_open: bool,
}

impl WeightModel {
    /// `tare` is the empty turntable's weight.
    pub fn new(tare: f64) -> Self {
        Self {
            value: tare,
            tare,
            door_was_open: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance one tick. Food is "placed" on the rising edge of the door.
    pub fn step(&mut self, door_open: bool, noise: f64) {
        if door_open && !self.door_was_open {
            self.value += LOAD_ON_OPEN_G;
        }
        self.door_was_open = door_open;
        self.value += noise;
    }

    pub fn reset(&mut self) {
        self.value = self.tare;
        self.door_was_open = false;
    }
}
