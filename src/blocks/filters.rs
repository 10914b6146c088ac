//! Sensor smoothing filters

use crate::block::Block;

/// Exponential moving average (single-pole lowpass)
///
/// y[n] = (1 - alpha) * y[n-1] + alpha * x[n]
///
/// The first sample after construction or [`EmaFilter::reinitialize`] is
/// passed through unchanged, so the output never ramps up from zero.
///
/// # Example
///
/// ```
/// use beamsim::EmaFilter;
///
/// let mut ema = EmaFilter::new(0.5);
/// assert_eq!(ema.update(4.0), 4.0); // bootstrap
/// assert_eq!(ema.update(0.0), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct EmaFilter {
    input: f64,
    output: f64,
    /// Weight of the newest sample, in (0, 1]
    alpha: f64,
    initialized: bool,
}

impl EmaFilter {
    /// Create filter with smoothing constant alpha
    pub fn new(alpha: f64) -> Self {
        Self {
            input: 0.0,
            output: 0.0,
            alpha,
            initialized: false,
        }
    }

    /// Feed one measurement and return the filtered value
    pub fn update(&mut self, measurement: f64) -> f64 {
        self.input = measurement;
        self.filter()
    }

    fn filter(&mut self) -> f64 {
        if self.initialized {
            self.output = (1.0 - self.alpha) * self.output + self.alpha * self.input;
        } else {
            self.output = self.input;
            self.initialized = true;
        }
        self.output
    }

    /// Current filtered value
    pub fn value(&self) -> f64 {
        self.output
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Takes effect on the next sample
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Make the next sample bootstrap the filter again
    pub fn reinitialize(&mut self) {
        self.initialized = false;
    }
}

impl Block for EmaFilter {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 1;
    const IS_DYNAMIC: bool = false;

    #[inline]
    fn inputs(&self) -> &[f64] {
        std::slice::from_ref(&self.input)
    }

    #[inline]
    fn inputs_mut(&mut self) -> &mut [f64] {
        std::slice::from_mut(&mut self.input)
    }

    #[inline]
    fn outputs(&self) -> &[f64] {
        std::slice::from_ref(&self.output)
    }

    #[inline]
    fn outputs_mut(&mut self) -> &mut [f64] {
        std::slice::from_mut(&mut self.output)
    }

    fn update(&mut self, _t: f64) {
        self.filter();
    }

    fn reset(&mut self) {
        self.input = 0.0;
        self.output = 0.0;
        self.initialized = false;
    }
}
