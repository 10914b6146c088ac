//! Shared types for the beamsim ball-and-beam digital twin.
//!
//! This crate defines the data exchanged between the numerical core and a
//! front end (renderer, parameter panel, session storage):
//! - Simulation settings and the reset policy
//! - The typed parameter set and its display labels
//! - Parameter updates and their parse errors

mod params;
mod settings;

pub use params::*;
pub use settings::*;
