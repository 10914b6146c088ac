//! Sensor and actuator converter blocks
//!
//! Quantization rounds to the nearest level with ties going to the even
//! level, so a value already on a level maps to itself.

use std::f64::consts::PI;

use crate::block::Block;
use crate::blocks::UniformNoise;
use crate::utils::clip;
use crate::utils::constants::POSITION_COUNTS_PER_METER;

/// Nearest multiple of `step`
#[inline]
pub fn quantize_step(value: f64, step: f64) -> f64 {
    (value / step).round_ties_even() * step
}

/// Nearest `1 / counts_per_unit` level
#[inline]
pub fn quantize_counts(value: f64, counts_per_unit: f64) -> f64 {
    (value * counts_per_unit).round_ties_even() / counts_per_unit
}

/// Linear position sensor with additive uniform noise and 1 mm resolution
#[derive(Debug, Clone)]
pub struct PositionSensor {
    noise: UniformNoise,
    counts_per_meter: f64,
}

impl PositionSensor {
    pub fn new(noise_half_width: f64, seed: Option<u64>) -> Self {
        Self {
            noise: UniformNoise::new(noise_half_width, seed),
            counts_per_meter: POSITION_COUNTS_PER_METER,
        }
    }

    /// Noisy, quantized reading of the true position
    pub fn read(&mut self, true_x: f64) -> f64 {
        let raw_x = true_x + self.noise.sample();
        quantize_counts(raw_x, self.counts_per_meter)
    }

    pub fn noise_half_width(&self) -> f64 {
        self.noise.half_width()
    }

    pub fn set_noise_half_width(&mut self, half_width: f64) {
        self.noise.set_half_width(half_width);
    }

    pub fn reseed(&mut self, seed: u64) {
        self.noise.reseed(seed);
    }
}

/// Incremental rotary encoder
///
/// Reports the angle quantized to `2π / ppr` with no noise.
///
/// # Example
///
/// ```
/// use beamsim::Encoder;
///
/// let encoder = Encoder::new(4.0);
/// assert_eq!(encoder.read(1.0), std::f64::consts::FRAC_PI_2);
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    input: f64,
    output: f64,
    ppr: f64,
}

impl Encoder {
    /// Create an encoder; PPR below one is raised to one
    pub fn new(ppr: f64) -> Self {
        Self {
            input: 0.0,
            output: 0.0,
            ppr: clamp_levels(ppr),
        }
    }

    pub fn ppr(&self) -> f64 {
        self.ppr
    }

    pub fn set_ppr(&mut self, ppr: f64) {
        self.ppr = clamp_levels(ppr);
    }

    /// Angular step between two pulses (rad)
    pub fn resolution(&self) -> f64 {
        (2.0 * PI) / self.ppr
    }

    /// Quantized angle reading
    pub fn read(&self, angle: f64) -> f64 {
        if self.ppr.is_infinite() {
            return angle;
        }
        quantize_step(angle, self.resolution())
    }
}

impl Block for Encoder {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 1;
    const IS_DYNAMIC: bool = false;

    fn inputs(&self) -> &[f64] {
        std::slice::from_ref(&self.input)
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        std::slice::from_mut(&mut self.input)
    }

    fn outputs(&self) -> &[f64] {
        std::slice::from_ref(&self.output)
    }

    fn outputs_mut(&mut self) -> &mut [f64] {
        std::slice::from_mut(&mut self.output)
    }

    fn update(&mut self, _t: f64) {
        self.output = self.read(self.input);
    }

    fn reset(&mut self) {
        self.input = 0.0;
        self.output = 0.0;
    }
}

/// PWM motor driver with finite duty-cycle resolution
///
/// A torque command is mapped to an integer duty in
/// [-resolution, resolution] and back to the torque actually applied.
#[derive(Debug, Clone)]
pub struct PwmDriver {
    input: f64,
    output: f64,
    resolution: f64,
    max_torque: f64,
}

impl PwmDriver {
    /// Create a driver; resolution below one is raised to one
    pub fn new(resolution: f64, max_torque: f64) -> Self {
        Self {
            input: 0.0,
            output: 0.0,
            resolution: clamp_levels(resolution),
            max_torque,
        }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: f64) {
        self.resolution = clamp_levels(resolution);
    }

    pub fn max_torque(&self) -> f64 {
        self.max_torque
    }

    /// Signed duty count for a torque command
    pub fn duty(&self, motor_cmd: f64) -> f64 {
        let duty = ((motor_cmd / self.max_torque) * self.resolution).round_ties_even();
        clip(duty, -self.resolution, self.resolution)
    }

    /// Torque delivered for a torque command
    pub fn apply(&self, motor_cmd: f64) -> f64 {
        if self.resolution.is_infinite() {
            return clip(motor_cmd, -self.max_torque, self.max_torque);
        }
        (self.duty(motor_cmd) / self.resolution) * self.max_torque
    }
}

impl Block for PwmDriver {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 1;
    const IS_DYNAMIC: bool = false;

    fn inputs(&self) -> &[f64] {
        std::slice::from_ref(&self.input)
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        std::slice::from_mut(&mut self.input)
    }

    fn outputs(&self) -> &[f64] {
        std::slice::from_ref(&self.output)
    }

    fn outputs_mut(&mut self) -> &mut [f64] {
        std::slice::from_mut(&mut self.output)
    }

    fn update(&mut self, _t: f64) {
        self.output = self.apply(self.input);
    }

    fn reset(&mut self) {
        self.input = 0.0;
        self.output = 0.0;
    }
}

/// Level counts are at least one; NaN counts as one
fn clamp_levels(levels: f64) -> f64 {
    if levels >= 1.0 {
        levels
    } else {
        tracing::warn!(levels, "level count below 1, clamping");
        1.0
    }
}
