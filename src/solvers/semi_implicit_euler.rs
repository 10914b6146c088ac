//! Semi-implicit (symplectic) Euler method

use nalgebra::SVector;

use super::{SecondOrderSolver, Solver};

/// Semi-implicit Euler method
///
/// First-order, single-stage integrator that updates the velocity before the
/// position within the same step.
///
/// # Mathematical Form
/// ```text
/// v_{n+1} = v_n + h * a(x_n, v_n)
/// x_{n+1} = x_n + h * v_{n+1}
/// ```
///
/// # Characteristics
/// - Order: 1
/// - Stages: 1
/// - Explicit, fixed timestep
/// - Symplectic: oscillators keep a bounded energy error instead of the
///   steady energy gain of forward Euler
///
/// # References
/// - Hairer, E., Lubich, C., & Wanner, G. (2006). "Geometric Numerical
///   Integration". Springer Series in Computational Mathematics, Vol. 31.
#[derive(Debug, Clone)]
pub struct SemiImplicitEuler<const N: usize> {
    positions: SVector<f64, N>,
    velocities: SVector<f64, N>,
    initial: (SVector<f64, N>, SVector<f64, N>),
}

impl<const N: usize> SemiImplicitEuler<N> {
    /// Create a new solver with the given initial state
    pub fn new(positions: SVector<f64, N>, velocities: SVector<f64, N>) -> Self {
        Self {
            positions,
            velocities,
            initial: (positions, velocities),
        }
    }

    /// Solver starting at rest at the origin
    pub fn at_rest() -> Self {
        Self::new(SVector::zeros(), SVector::zeros())
    }
}

impl<const N: usize> Solver<N> for SemiImplicitEuler<N> {
    fn positions(&self) -> &SVector<f64, N> {
        &self.positions
    }

    fn velocities(&self) -> &SVector<f64, N> {
        &self.velocities
    }

    fn set_state(&mut self, positions: SVector<f64, N>, velocities: SVector<f64, N>) {
        self.positions = positions;
        self.velocities = velocities;
    }

    fn reset(&mut self) {
        (self.positions, self.velocities) = self.initial;
    }

    fn order(&self) -> usize {
        1
    }

    fn is_explicit(&self) -> bool {
        true
    }
}

impl<const N: usize> SecondOrderSolver<N> for SemiImplicitEuler<N> {
    fn step<A, C>(&mut self, mut accel: A, mut constrain: C, dt: f64)
    where
        A: FnMut(&SVector<f64, N>, &SVector<f64, N>) -> SVector<f64, N>,
        C: FnMut(&mut SVector<f64, N>),
    {
        let a = accel(&self.positions, &self.velocities);

        let mut velocities = self.velocities + a * dt;
        constrain(&mut velocities);

        self.positions += velocities * dt;
        self.velocities = velocities;
    }
}
