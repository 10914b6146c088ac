//! Numerical integration solvers
//!
//! Fixed-step integrators for mechanical systems written as
//! position/velocity pairs.

mod base;
mod semi_implicit_euler;

pub use base::*;
pub use semi_implicit_euler::SemiImplicitEuler;
