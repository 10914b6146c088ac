//! Block implementations

mod converters;
mod filters;
mod noise;
mod pid;

pub use converters::{quantize_counts, quantize_step, Encoder, PositionSensor, PwmDriver};
pub use filters::EmaFilter;
pub use noise::{UniformNoise, MAX_NOISE_HALF_WIDTH};
pub use pid::{CascadedPid, ControlOutput, Pid, OUTER_LOOP_SIGN};
