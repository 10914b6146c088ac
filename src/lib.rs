//! beamsim - Ball-and-beam digital twin
//!
//! Closed-loop simulation of a ball rolling on a motor-tilted beam, with a
//! cascaded PID controller acting on realistic sensor and actuator models.
//!
//! # Architecture
//!
//! Every physics sub-step runs one fixed pipeline:
//! - [`Hal::sense`]: noisy, quantized and filtered readings of the plant
//! - [`CascadedPid::compute`]: position loop feeding an angle loop
//! - [`Hal::actuate`]: PWM quantization of the torque command
//! - [`BallBeamPlant::step`]: semi-implicit Euler integration
//!
//! [`Simulation`] owns the pipeline and runs it in fixed batches per frame.
//!
//! # Example
//!
//! ```rust
//! use beamsim::{FrameCommand, Simulation, SimulationSettings};
//!
//! let mut sim = Simulation::new(SimulationSettings::default());
//! let view = sim.frame(FrameCommand {
//!     setpoint: Some(0.2),
//!     ..Default::default()
//! });
//!
//! assert_eq!(view.setpoint, 0.2);
//! assert!(!view.dropped);
//! ```

// Core block trait and types
pub mod block;
pub mod blocks;
pub mod hal;
pub mod plant;
pub mod simulation;
pub mod solvers;
pub mod utils;

pub use beamsim_types::{
    Parameter, ParameterGroup, ParameterParseError, ParameterUpdate, ResetScope,
    SimulationSettings, SystemParams, MIN_PHYSICS_DT,
};
pub use block::{Block, StepResult};
pub use blocks::*;
pub use hal::{Hal, HalConfig, Measurements};
pub use plant::{BallBeamPlant, PlantState};
pub use simulation::{Actuation, FrameCommand, FrameView, Simulation};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::block::{Block, StepResult};
    pub use crate::blocks::*;
    pub use crate::hal::{Hal, HalConfig, Measurements};
    pub use crate::plant::{BallBeamPlant, PlantState};
    pub use crate::simulation::{FrameCommand, FrameView, Simulation};
    pub use crate::solvers::*;
    pub use beamsim_types::{Parameter, ParameterUpdate, SimulationSettings, SystemParams};
}
