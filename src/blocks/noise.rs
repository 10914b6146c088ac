//! Noise source blocks for stochastic sensor models

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::block::Block;

/// Additive sensor noise, uniform on [-half_width, half_width]
///
/// A seed makes runs repeatable; without one the generator is seeded from
/// the OS.
///
/// # Example
///
/// ```
/// use beamsim::UniformNoise;
///
/// let mut noise = UniformNoise::new(0.003, Some(42));
/// let sample = noise.sample();
/// assert!(sample.abs() <= 0.003);
/// ```
#[derive(Debug, Clone)]
pub struct UniformNoise {
    output: f64,
    half_width: f64,
    rng: StdRng,
    distribution: Uniform<f64>,
}

impl UniformNoise {
    /// Negative or non-finite half-widths are replaced by zero, oversized
    /// ones by [`MAX_NOISE_HALF_WIDTH`].
    pub fn new(half_width: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let half_width = sanitize(half_width);

        Self {
            output: 0.0,
            half_width,
            rng,
            distribution: Uniform::new_inclusive(-half_width, half_width),
        }
    }

    /// Draw the next sample
    pub fn sample(&mut self) -> f64 {
        self.output = self.distribution.sample(&mut self.rng);
        self.output
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Set new half-width, sanitized as in [`UniformNoise::new`]
    pub fn set_half_width(&mut self, half_width: f64) {
        self.half_width = sanitize(half_width);
        self.distribution = Uniform::new_inclusive(-self.half_width, self.half_width);
    }

    /// Restart the sequence from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Largest half-width whose sampling range still fits in an `f64`
pub const MAX_NOISE_HALF_WIDTH: f64 = f64::MAX / 4.0;

fn sanitize(half_width: f64) -> f64 {
    if !(half_width.is_finite() && half_width >= 0.0) {
        tracing::warn!(half_width, "invalid noise half-width, using 0");
        0.0
    } else if half_width > MAX_NOISE_HALF_WIDTH {
        tracing::warn!(half_width, "noise half-width too large, clamping");
        MAX_NOISE_HALF_WIDTH
    } else {
        half_width
    }
}

impl Block for UniformNoise {
    const NUM_INPUTS: usize = 0;
    const NUM_OUTPUTS: usize = 1;
    const IS_DYNAMIC: bool = false;

    fn inputs(&self) -> &[f64] {
        &[]
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        &mut []
    }

    fn outputs(&self) -> &[f64] {
        std::slice::from_ref(&self.output)
    }

    fn outputs_mut(&mut self) -> &mut [f64] {
        std::slice::from_mut(&mut self.output)
    }

    fn update(&mut self, _t: f64) {
        self.sample();
    }

    fn reset(&mut self) {
        // RNG keeps its position in the sequence
        self.output = 0.0;
    }
}
