//! Simulation settings types.

use serde::{Deserialize, Serialize};

/// What an explicit reset reinitializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResetScope {
    /// Plant state, both PID integrators and the encoder rate tracker.
    /// The sensor EMA filters keep their value and bootstrap flag.
    #[default]
    PlantAndControllerOnly,
    /// Everything above plus the sensor EMA filters.
    Everything,
}

impl ResetScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetScope::PlantAndControllerOnly => "plant-and-controller",
            ResetScope::Everything => "everything",
        }
    }

    /// Whether the sensor filters bootstrap again after a reset
    pub fn resets_filters(&self) -> bool {
        matches!(self, ResetScope::Everything)
    }
}

/// Smallest accepted physics timestep (s)
pub const MIN_PHYSICS_DT: f64 = 1e-6;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Physics timestep in seconds
    pub physics_dt: f64,

    /// Frames per second of the consuming render loop
    pub render_fps: f64,

    /// Seed for the position sensor noise (None = OS entropy)
    pub seed: Option<u64>,

    /// Reset policy
    pub reset_scope: ResetScope,
}

impl SimulationSettings {
    /// Settings with a usable physics timestep
    ///
    /// A timestep below [`MIN_PHYSICS_DT`] (zero, negative, NaN) is raised to
    /// it; an infinite one falls back to the default.
    pub fn sanitized(self) -> Self {
        let physics_dt = if self.physics_dt.is_infinite() {
            Self::default().physics_dt
        } else if self.physics_dt >= MIN_PHYSICS_DT {
            self.physics_dt
        } else {
            MIN_PHYSICS_DT
        };
        Self { physics_dt, ..self }
    }

    /// Number of physics sub-steps run per rendered frame
    ///
    /// Truncates `(1 / render_fps) / physics_dt`, never less than one.
    pub fn steps_per_frame(&self) -> usize {
        let steps = (1.0 / self.render_fps) / self.physics_dt;
        if steps.is_finite() && steps >= 1.0 {
            steps as usize
        } else {
            1
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            physics_dt: 0.001,
            render_fps: 60.0,
            seed: None,
            reset_scope: ResetScope::PlantAndControllerOnly,
        }
    }
}
