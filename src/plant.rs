//! Ball-and-beam plant
//!
//! A solid sphere rolls along a beam whose angle is driven directly by motor
//! torque. The motor torque acts as an angular acceleration; no beam inertia
//! is modeled.
//!
//! ```text
//! alpha'' = torque - c_w * omega
//! x''     = -(5/7) * g * sin(alpha) - c_v * v
//! ```
//!
//! The beam has a hard stop at ±45°; hitting it zeroes the angular velocity.
//! Once the ball leaves the beam (|x| > L/2) the plant is dropped and stays
//! frozen until reset.

use nalgebra::Vector2;

use crate::block::{Block, StepResult};
use crate::solvers::{SecondOrderSolver, SemiImplicitEuler, Solver};
use crate::utils::clip;
use crate::utils::constants::{
    rad_per_sec_to_rpm, rpm_to_rad_per_sec, BALL_LINEAR_DAMPING, BEAM_ANGULAR_DAMPING,
    DEFAULT_BEAM_LENGTH, GRAVITY, MAX_BEAM_ANGLE, MIN_BEAM_LENGTH, ROLLING_SPHERE_FACTOR,
};

/// Plant state (x, v, alpha, omega)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlantState {
    /// Ball position along the beam (m)
    pub x: f64,
    /// Ball velocity (m/s)
    pub v: f64,
    /// Beam angle (rad)
    pub alpha: f64,
    /// Beam angular velocity (rad/s)
    pub omega: f64,
}

impl PlantState {
    /// State from position, velocity, beam angle and beam rate
    pub fn new(x: f64, v: f64, alpha: f64, omega: f64) -> Self {
        Self { x, v, alpha, omega }
    }

    /// `[x, v, alpha, omega]`, the plant's output port order
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.v, self.alpha, self.omega]
    }
}

/// Ball-and-beam dynamics integrated with semi-implicit Euler
///
/// Input: 0 = motor torque. Outputs: 0 = x, 1 = v, 2 = alpha, 3 = omega.
///
/// # Example
///
/// ```
/// use beamsim::BallBeamPlant;
///
/// let mut plant = BallBeamPlant::new(1.0, 0.001);
/// let state = plant.step(1.0);
/// assert!(state.omega > 0.0);
/// assert!(!plant.is_dropped());
/// ```
#[derive(Debug, Clone)]
pub struct BallBeamPlant {
    input: f64,
    outputs: [f64; 4],

    /// positions (x, alpha), velocities (v, omega)
    solver: SemiImplicitEuler<2>,

    beam_length: f64,
    max_omega: f64,
    dt: f64,
    dropped: bool,
}

impl BallBeamPlant {
    /// Create a plant at rest with the given beam length and timestep
    ///
    /// The beam length is raised to the 0.2 m minimum if needed. The motor
    /// speed is unbounded.
    pub fn new(beam_length: f64, dt: f64) -> Self {
        Self {
            input: 0.0,
            outputs: [0.0; 4],
            solver: SemiImplicitEuler::at_rest(),
            beam_length: clamp_beam_length(beam_length),
            max_omega: f64::INFINITY,
            dt,
            dropped: false,
        }
    }

    /// Advance one timestep under `motor_torque`
    ///
    /// Returns the frozen state without integrating once dropped.
    pub fn step(&mut self, motor_torque: f64) -> PlantState {
        self.input = motor_torque;
        if !self.dropped {
            self.integrate(self.dt);
        }
        self.state()
    }

    fn integrate(&mut self, dt: f64) {
        let torque = self.input;
        let max_omega = self.max_omega;

        self.solver.step(
            |q, p| {
                let (alpha, v, omega) = (q[1], p[0], p[1]);
                Vector2::new(
                    -ROLLING_SPHERE_FACTOR * GRAVITY * alpha.sin() - BALL_LINEAR_DAMPING * v,
                    torque - BEAM_ANGULAR_DAMPING * omega,
                )
            },
            |p| p[1] = clip(p[1], -max_omega, max_omega),
            dt,
        );

        // Mechanical hard stop: inelastic, the beam stops dead
        let (mut q, mut p) = (*self.solver.positions(), *self.solver.velocities());
        if q[1].abs() > MAX_BEAM_ANGLE {
            q[1] = MAX_BEAM_ANGLE.copysign(q[1]);
            p[1] = 0.0;
            self.solver.set_state(q, p);
        }

        if q[0].abs() > self.beam_length / 2.0 {
            self.dropped = true;
            tracing::warn!(x = q[0], beam_length = self.beam_length, "ball dropped off the beam");
        }

        self.outputs = [q[0], p[0], q[1], p[1]];
    }

    pub fn state(&self) -> PlantState {
        let [x, v, alpha, omega] = self.outputs;
        PlantState::new(x, v, alpha, omega)
    }

    /// Overwrite the state (use with caution); the dropped flag is unchanged
    pub fn set_state(&mut self, state: PlantState) {
        self.solver
            .set_state(Vector2::new(state.x, state.alpha), Vector2::new(state.v, state.omega));
        self.outputs = state.to_array();
    }

    /// Zero state and clear the dropped flag
    pub fn reset(&mut self) {
        self.solver.reset();
        self.input = 0.0;
        self.outputs = [0.0; 4];
        self.dropped = false;
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Beam length (m)
    pub fn beam_length(&self) -> f64 {
        self.beam_length
    }

    /// Lengths below 0.2 m (and NaN) are clamped to 0.2 m
    pub fn set_beam_length(&mut self, beam_length: f64) {
        self.beam_length = clamp_beam_length(beam_length);
    }

    /// Angular velocity limit of the beam motor (rad/s)
    pub fn max_omega(&self) -> f64 {
        self.max_omega
    }

    /// Negative values (and NaN) are clamped to zero
    pub fn set_max_omega(&mut self, max_omega: f64) {
        self.max_omega = if max_omega >= 0.0 {
            max_omega
        } else {
            tracing::warn!(max_omega, "negative motor speed limit, clamping to 0");
            0.0
        };
    }

    /// Motor speed limit in RPM, derived from [`BallBeamPlant::max_omega`]
    pub fn motor_max_rpm(&self) -> f64 {
        rad_per_sec_to_rpm(self.max_omega)
    }

    pub fn set_motor_max_rpm(&mut self, rpm: f64) {
        self.set_max_omega(rpm_to_rad_per_sec(rpm));
    }
}

impl Default for BallBeamPlant {
    fn default() -> Self {
        Self::new(DEFAULT_BEAM_LENGTH, crate::utils::constants::PHYSICS_DT)
    }
}

fn clamp_beam_length(beam_length: f64) -> f64 {
    if beam_length >= MIN_BEAM_LENGTH {
        beam_length
    } else {
        tracing::warn!(beam_length, "beam length below minimum, clamping");
        MIN_BEAM_LENGTH
    }
}

impl Block for BallBeamPlant {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 4;
    const IS_DYNAMIC: bool = true;

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
        &self.outputs
    }

    #[inline]
    fn outputs_mut(&mut self) -> &mut [f64] {
        &mut self.outputs
    }

    fn update(&mut self, _t: f64) {
        // Outputs already hold the latest committed state
    }

    fn step(&mut self, _t: f64, dt: f64) -> StepResult {
        if !self.dropped {
            self.integrate(dt);
        }
        StepResult {
            terminal: self.dropped,
        }
    }

    fn reset(&mut self) {
        BallBeamPlant::reset(self);
    }
}
