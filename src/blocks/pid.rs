//! PID controller blocks

use crate::block::Block;
use crate::utils::clip;
use crate::utils::constants::{
    INNER_MAX_INTEGRAL, MAX_COMMANDED_ANGLE, MAX_MOTOR_TORQUE, OUTER_MAX_INTEGRAL,
};

/// PID controller with integral clamping and derivative-on-measurement
///
/// # Control Law
///
/// ```text
/// e  = setpoint - pv
/// I  = clip(I + e * dt, -max_i, max_i)
/// u  = clip(kp * e + ki * I - kd * dpv, out_min, out_max)
/// ```
///
/// The derivative term uses the rate of the process variable supplied by the
/// caller, so setpoint steps produce no derivative kick. The integral is
/// clamped after accumulating. Non-finite inputs are not rejected and
/// propagate to the output.
///
/// Inputs: 0 = setpoint, 1 = process variable, 2 = derivative of the process
/// variable. Output: 0 = control signal.
///
/// # Example
///
/// ```
/// use beamsim::Pid;
///
/// let mut pid = Pid::new(1.0, 0.0, 0.5, -1.0, 1.0, 0.001);
/// let u = pid.compute(0.5, 0.0, 0.2); // 1.0 * 0.5 - 0.5 * 0.2
/// assert!((u - 0.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Pid {
    // I/O
    inputs: [f64; 3],
    output: f64,

    // Parameters
    kp: f64,
    ki: f64,
    kd: f64,
    out_min: f64,
    out_max: f64,
    max_integral: f64,
    dt: f64,

    // State
    integral: f64,
}

impl Pid {
    /// Create PID controller with gains, output bounds and a fixed timestep
    ///
    /// The integral is unbounded until [`Pid::with_max_integral`] or
    /// [`Pid::set_max_integral`] is used.
    pub fn new(kp: f64, ki: f64, kd: f64, out_min: f64, out_max: f64, dt: f64) -> Self {
        Self {
            inputs: [0.0; 3],
            output: 0.0,
            kp,
            ki,
            kd,
            out_min,
            out_max,
            max_integral: f64::INFINITY,
            dt,
            integral: 0.0,
        }
    }

    /// Builder-style integral clamp
    pub fn with_max_integral(mut self, max_integral: f64) -> Self {
        self.max_integral = max_integral;
        self
    }

    /// Run one control cycle
    pub fn compute(&mut self, setpoint: f64, process_variable: f64, derivative_of_pv: f64) -> f64 {
        self.inputs = [setpoint, process_variable, derivative_of_pv];
        self.evaluate()
    }

    fn evaluate(&mut self) -> f64 {
        let [setpoint, process_variable, derivative_of_pv] = self.inputs;

        let error = setpoint - process_variable;

        self.integral += error * self.dt;
        self.integral = clip(self.integral, -self.max_integral, self.max_integral);
        let i_term = self.ki * self.integral;

        let d_term = -self.kd * derivative_of_pv;

        let unclipped = (self.kp * error) + i_term + d_term;
        self.output = clip(unclipped, self.out_min, self.out_max);
        self.output
    }

    /// Zero the integral; gains and bounds are kept
    pub fn reset(&mut self) {
        self.integral = 0.0;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// (kp, ki, kd)
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    /// Set PID gains without touching the integral
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    pub fn set_kp(&mut self, kp: f64) {
        self.kp = kp;
    }

    pub fn set_ki(&mut self, ki: f64) {
        self.ki = ki;
    }

    pub fn set_kd(&mut self, kd: f64) {
        self.kd = kd;
    }

    /// (out_min, out_max)
    pub fn limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }

    pub fn set_limits(&mut self, out_min: f64, out_max: f64) {
        self.out_min = out_min;
        self.out_max = out_max;
    }

    pub fn max_integral(&self) -> f64 {
        self.max_integral
    }

    pub fn set_max_integral(&mut self, max_integral: f64) {
        self.max_integral = max_integral;
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl Block for Pid {
    const NUM_INPUTS: usize = 3;
    const NUM_OUTPUTS: usize = 1;
    const IS_DYNAMIC: bool = false;

    #[inline]
    fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    #[inline]
    fn inputs_mut(&mut self) -> &mut [f64] {
        &mut self.inputs
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
        self.evaluate();
    }

    fn reset(&mut self) {
        self.inputs = [0.0; 3];
        self.output = 0.0;
        self.integral = 0.0;
    }
}

/// Sign applied to the outer loop output.
///
/// With this plant's geometry a positive beam angle rolls the ball toward -x,
/// so moving the ball toward +x needs a negative tilt.
pub const OUTER_LOOP_SIGN: f64 = -1.0;

/// Result of one cascaded control cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlOutput {
    /// Torque command for the beam motor
    pub motor_cmd: f64,
    /// Beam angle requested by the position loop (rad)
    pub target_alpha: f64,
}

/// Position loop feeding an angle loop
///
/// The outer PID turns position error into a beam angle command (its output
/// bounds are the commanded-angle envelope). The inner PID turns angle error
/// into a torque command (its output bounds are the torque envelope).
#[derive(Debug, Clone)]
pub struct CascadedPid {
    outer: Pid,
    inner: Pid,
}

impl CascadedPid {
    /// Reference tuning for the ball-and-beam plant
    pub fn new(dt: f64) -> Self {
        let outer = Pid::new(0.8, 0.02, 0.6, -MAX_COMMANDED_ANGLE, MAX_COMMANDED_ANGLE, dt)
            .with_max_integral(OUTER_MAX_INTEGRAL);
        let inner = Pid::new(20.0, 0.5, 8.0, -MAX_MOTOR_TORQUE, MAX_MOTOR_TORQUE, dt)
            .with_max_integral(INNER_MAX_INTEGRAL);
        Self::from_loops(outer, inner)
    }

    pub fn from_loops(outer: Pid, inner: Pid) -> Self {
        Self { outer, inner }
    }

    /// Run both loops for one tick
    ///
    /// `current_v` is the outer loop's derivative input, `current_omega` the
    /// inner loop's.
    pub fn compute(
        &mut self,
        target_x: f64,
        current_x: f64,
        current_v: f64,
        current_alpha: f64,
        current_omega: f64,
    ) -> ControlOutput {
        let target_alpha = OUTER_LOOP_SIGN * self.outer.compute(target_x, current_x, current_v);
        let motor_cmd = self.inner.compute(target_alpha, current_alpha, current_omega);
        ControlOutput {
            motor_cmd,
            target_alpha,
        }
    }

    /// Zero both integrators
    pub fn reset(&mut self) {
        self.outer.reset();
        self.inner.reset();
    }

    pub fn outer(&self) -> &Pid {
        &self.outer
    }

    pub fn outer_mut(&mut self) -> &mut Pid {
        &mut self.outer
    }

    pub fn inner(&self) -> &Pid {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut Pid {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 0.001;

    #[test]
    fn test_pid_proportional_only() {
        let mut pid = Pid::new(3.0, 0.0, 0.0, -1.0, 1.0, DT);

        assert_eq!(pid.compute(0.1, 0.0, 5.0), 3.0 * 0.1);
        assert_eq!(pid.compute(1.0, 0.0, 0.0), 1.0);
        assert_eq!(pid.compute(-1.0, 0.0, 0.0), -1.0);
    }

    #[test]
    fn test_pid_integral_accumulates_error_times_dt() {
        let mut pid = Pid::new(0.0, 1.0, 0.0, -10.0, 10.0, 0.1);

        pid.compute(2.0, 0.0, 0.0);
        pid.compute(2.0, 0.0, 0.0);

        assert_relative_eq!(pid.integral(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_pid_integral_clamped_after_accumulation() {
        let mut pid = Pid::new(0.0, 1.0, 0.0, -100.0, 100.0, 1.0).with_max_integral(0.5);

        // One large step lands exactly on the clamp
        assert_eq!(pid.compute(10.0, 0.0, 0.0), 0.5);
        assert_eq!(pid.integral(), 0.5);

        // Unwinding starts from the clamp, not from the raw accumulated value
        pid.compute(-0.25, 0.0, 0.0);
        assert_eq!(pid.integral(), 0.25);
    }

    #[test]
    fn test_pid_integral_never_exceeds_bound() {
        let mut pid = Pid::new(1.0, 5.0, 0.0, -1.0, 1.0, DT).with_max_integral(0.3);

        for i in 0..20_000 {
            let setpoint = if i < 10_000 { 50.0 } else { -50.0 };
            pid.compute(setpoint, 0.0, 0.0);
            assert!(pid.integral().abs() <= 0.3);
        }
        assert_eq!(pid.integral(), -0.3);
    }

    #[test]
    fn test_pid_derivative_on_measurement() {
        let mut pid = Pid::new(0.0, 0.0, 2.0, -10.0, 10.0, DT);

        // Setpoint jump with a still process variable: no derivative kick
        assert_eq!(pid.compute(0.0, 0.0, 0.0), 0.0);
        assert_eq!(pid.compute(5.0, 0.0, 0.0), 0.0);

        // Rising process variable opposes the motion
        assert_eq!(pid.compute(5.0, 0.0, 1.5), -3.0);
    }

    #[test]
    fn test_pid_reset_reproduces_fresh_instance() {
        let inputs = [(1.0, 0.2, 0.1), (1.0, 0.5, -0.3), (-0.5, 0.0, 0.0), (0.3, 0.3, 2.0)];

        let mut used = Pid::new(1.2, 3.4, 0.5, -2.0, 2.0, DT).with_max_integral(1.0);
        for &(sp, pv, d) in &inputs {
            used.compute(sp, pv, d);
        }
        used.reset();
        assert_eq!(used.integral(), 0.0);

        let mut fresh = Pid::new(1.2, 3.4, 0.5, -2.0, 2.0, DT).with_max_integral(1.0);
        for &(sp, pv, d) in &inputs {
            assert_eq!(used.compute(sp, pv, d), fresh.compute(sp, pv, d));
        }
    }

    #[test]
    fn test_pid_gain_change_keeps_integral() {
        let mut pid = Pid::new(1.0, 1.0, 0.0, -10.0, 10.0, 0.5);
        pid.compute(1.0, 0.0, 0.0);
        pid.set_gains(2.0, 3.0, 4.0);

        assert_eq!(pid.integral(), 0.5);
        assert_eq!(pid.gains(), (2.0, 3.0, 4.0));
    }

    #[test]
    fn test_pid_nan_propagates() {
        let mut pid = Pid::new(1.0, 1.0, 1.0, -1.0, 1.0, DT);
        assert!(pid.compute(f64::NAN, 0.0, 0.0).is_nan());
        assert!(pid.integral().is_nan());
    }

    #[test]
    fn test_pid_block_interface_matches_compute() {
        let mut direct = Pid::new(2.0, 1.0, 0.5, -5.0, 5.0, DT);
        let mut block = Pid::new(2.0, 1.0, 0.5, -5.0, 5.0, DT);

        let expected = direct.compute(1.0, 0.4, 0.2);
        block.inputs_mut().copy_from_slice(&[1.0, 0.4, 0.2]);
        block.update(0.0);

        assert_eq!(block.get_output(0), expected);
        assert_eq!(block.integral(), direct.integral());
    }

    #[test]
    fn test_cascade_sign_convention() {
        let mut cascade = CascadedPid::new(DT);

        // Ball left of target: beam tilts negative, motor drives negative
        let out = cascade.compute(0.2, 0.0, 0.0, 0.0, 0.0);
        assert!(out.target_alpha < 0.0);
        assert!(out.motor_cmd < 0.0);

        let mut outer = cascade.outer().clone();
        outer.reset();
        assert_eq!(out.target_alpha, OUTER_LOOP_SIGN * outer.compute(0.2, 0.0, 0.0));
    }

    #[test]
    fn test_cascade_respects_envelopes() {
        let mut cascade = CascadedPid::new(DT);

        let out = cascade.compute(100.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(out.target_alpha, -MAX_COMMANDED_ANGLE);

        let out = cascade.compute(0.0, 0.0, 0.0, 10.0, 0.0);
        assert_eq!(out.motor_cmd, -MAX_MOTOR_TORQUE);
    }

    #[test]
    fn test_cascade_inner_tracks_outer_command() {
        let mut cascade = CascadedPid::new(DT);
        let out = cascade.compute(0.1, 0.0, 0.0, 0.0, 0.0);

        // Inner error is target_alpha - 0
        let mut inner = Pid::new(20.0, 0.5, 8.0, -50.0, 50.0, DT).with_max_integral(20.0);
        assert_eq!(out.motor_cmd, inner.compute(out.target_alpha, 0.0, 0.0));
    }

    #[test]
    fn test_cascade_reset_clears_both_integrators() {
        let mut cascade = CascadedPid::new(DT);
        for _ in 0..100 {
            cascade.compute(0.3, 0.0, 0.0, 0.1, 0.0);
        }
        assert!(cascade.outer().integral() != 0.0);
        assert!(cascade.inner().integral() != 0.0);

        cascade.reset();
        assert_eq!(cascade.outer().integral(), 0.0);
        assert_eq!(cascade.inner().integral(), 0.0);
        assert_eq!(cascade.outer().limits(), (-0.4, 0.4));
    }
}
