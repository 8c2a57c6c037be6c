//! First-order heat model shared by the temperature and humidity probes.
//!
//! Each tick the value rises while the magnetron emits and relaxes
//! otherwise; an open door and the cooling fan pull it down further. The
//! value never drops below its ambient floor before noise is added.

/// Per-tick rates of a probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatRates {
    /// Gain while the magnetron is on.
    pub heating: f64,
    /// Loss while the magnetron is off.
    pub cooling: f64,
    /// Extra loss while the door is open.
    pub door_loss: f64,
    /// Extra loss at full fan power, scaled by the fan's power share.
    pub fan_loss: f64,
}

impl HeatRates {
    /// Cavity temperature and humidity.
    pub const CAVITY: Self = Self {
        heating: 0.1,
        cooling: 0.02,
        door_loss: 0.1,
        fan_loss: 0.0,
    };

    /// Magnetron body temperature.
    pub const MAGNETRON: Self = Self {
        heating: 0.3,
        cooling: 0.05,
        door_loss: 0.0,
        fan_loss: 0.4,
    };
}

/// State of the actuators that drive the heat models, sampled once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatInputs {
    pub magnetron_on: bool,
    pub door_open: bool,
    pub fan_share: f64,
}

#[derive(Debug, Clone)]
pub struct HeatModel {
    value: f64,
    floor: f64,
    rates: HeatRates,
}

impl HeatModel {
    pub fn new(floor: f64, rates: HeatRates) -> Self {
        Self {
            value: floor,
            floor,
            rates,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance one tick. `noise` is added after the floor clamp.
    pub fn step(&mut self, inputs: HeatInputs, noise: f64) {
        let r = self.rates;
        if inputs.magnetron_on {
            self.value += r.heating;
        } else {
            self.value -= r.cooling;
        }
        if inputs.door_open {
            self.value -= r.door_loss;
        }
        self.value -= r.fan_loss * inputs.fan_share;

        self.value = self.value.max(self.floor) + noise;
    }

    pub fn reset(&mut self) {
        self.value = self.floor;
    }
}
