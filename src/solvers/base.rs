//! Base solver traits

use nalgebra::SVector;

/// Core solver trait for second-order (position/velocity) systems
pub trait Solver<const N: usize> {
    /// Generalized positions
    fn positions(&self) -> &SVector<f64, N>;

    /// Generalized velocities
    fn velocities(&self) -> &SVector<f64, N>;

    /// Replace the whole state
    fn set_state(&mut self, positions: SVector<f64, N>, velocities: SVector<f64, N>);

    /// Reset solver to initial state
    fn reset(&mut self);

    /// Order of the method
    fn order(&self) -> usize;

    /// Is this an explicit solver?
    fn is_explicit(&self) -> bool;
}

/// Solver advancing `q'' = a(q, q')` one fixed step at a time
pub trait SecondOrderSolver<const N: usize>: Solver<N> {
    /// Perform one step
    ///
    /// - `accel` evaluates accelerations from `(positions, velocities)`
    /// - `constrain` may limit the freshly updated velocities before they
    ///   are used to advance the positions
    fn step<A, C>(&mut self, accel: A, constrain: C, dt: f64)
    where
        A: FnMut(&SVector<f64, N>, &SVector<f64, N>) -> SVector<f64, N>,
        C: FnMut(&mut SVector<f64, N>);
}
