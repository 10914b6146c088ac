//! Block trait shared by the filter, controller and plant
//!
//! Port counts are associated constants, so every component exposes a fixed
//! set of scalar signals without allocating.

/// Outcome of advancing a block's internal state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepResult {
    /// The block entered a sticky terminal state (the ball left the beam)
    /// and stays frozen until reset
    pub terminal: bool,
}

/// Signal-flow view of a simulation component
///
/// Components also offer plain methods (`EmaFilter::update`, `Pid::compute`,
/// `BallBeamPlant::step`); driving them through ports yields the same numbers.
///
/// # Example
///
/// ```
/// use beamsim::{Block, Pid};
///
/// // P-only controller: output = 2 * (setpoint - measurement)
/// let mut pid = Pid::new(2.0, 0.0, 0.0, -10.0, 10.0, 0.001);
/// pid.set_input(0, 1.0); // setpoint
/// pid.set_input(1, 0.25); // process variable
/// pid.set_input(2, 0.0); // rate of the process variable
/// pid.update(0.0);
/// assert_eq!(pid.get_output(0), 1.5);
/// ```
pub trait Block {
    const NUM_INPUTS: usize;
    const NUM_OUTPUTS: usize;

    /// Whether `step` advances state over time
    const IS_DYNAMIC: bool = false;

    fn inputs(&self) -> &[f64];

    fn inputs_mut(&mut self) -> &mut [f64];

    fn outputs(&self) -> &[f64];

    fn outputs_mut(&mut self) -> &mut [f64];

    /// Recompute outputs from the current inputs
    fn update(&mut self, t: f64);

    /// Integrate internal state over `dt`; stateless blocks keep the default
    fn step(&mut self, _t: f64, _dt: f64) -> StepResult {
        StepResult::default()
    }

    /// Back to the state the block was created in
    fn reset(&mut self);

    #[inline]
    fn get_input(&self, port: usize) -> f64 {
        self.inputs()[port]
    }

    #[inline]
    fn set_input(&mut self, port: usize, value: f64) {
        self.inputs_mut()[port] = value;
    }

    #[inline]
    fn get_output(&self, port: usize) -> f64 {
        self.outputs()[port]
    }
}
