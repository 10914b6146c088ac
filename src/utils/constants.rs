//! Physical constants and reference configuration

use std::f64::consts::FRAC_PI_4;

/// Default physics timestep
pub const PHYSICS_DT: f64 = 0.001;

/// Gravitational acceleration (m/s^2)
pub const GRAVITY: f64 = 9.81;

/// Effective inertia factor of a solid sphere rolling on the beam (5/7)
pub const ROLLING_SPHERE_FACTOR: f64 = 5.0 / 7.0;

/// Viscous damping on the beam's angular velocity
pub const BEAM_ANGULAR_DAMPING: f64 = 0.5;

/// Viscous damping on the ball's linear velocity
pub const BALL_LINEAR_DAMPING: f64 = 0.2;

/// Mechanical hard stop of the beam (45 degrees)
pub const MAX_BEAM_ANGLE: f64 = FRAC_PI_4;

/// Shortest beam the plant accepts (m)
pub const MIN_BEAM_LENGTH: f64 = 0.2;

/// Beam length at startup (m)
pub const DEFAULT_BEAM_LENGTH: f64 = 0.8;

/// Setpoints are kept this far inside either beam end (m)
pub const SETPOINT_EDGE_MARGIN: f64 = 0.05;

/// Actuator torque at full PWM duty
pub const MAX_MOTOR_TORQUE: f64 = 50.0;

/// Position sensor readings per meter (1 mm resolution)
pub const POSITION_COUNTS_PER_METER: f64 = 1000.0;

/// Smoothing constant of the encoder-rate EMA
pub const RATE_FILTER_ALPHA: f64 = 0.05;

/// Default smoothing constant of the position EMA
pub const POSITION_FILTER_ALPHA: f64 = 0.1;

/// Default encoder pulses per revolution
pub const ENCODER_PPR: f64 = 600.0;

/// Default PWM steps per polarity
pub const PWM_RESOLUTION: f64 = 255.0;

/// Default position sensor noise half-width (m)
pub const SENSOR_NOISE: f64 = 0.003;

/// Commanded beam angle envelope of the outer loop (rad)
pub const MAX_COMMANDED_ANGLE: f64 = 0.4;

/// Integral clamp of the outer loop
pub const OUTER_MAX_INTEGRAL: f64 = 10.0;

/// Integral clamp of the inner loop
pub const INNER_MAX_INTEGRAL: f64 = 20.0;

/// Convert motor speed in RPM to angular velocity in rad/s
#[inline]
pub fn rpm_to_rad_per_sec(rpm: f64) -> f64 {
    rpm * 2.0 * std::f64::consts::PI / 60.0
}

/// Convert angular velocity in rad/s to motor speed in RPM
#[inline]
pub fn rad_per_sec_to_rpm(omega: f64) -> f64 {
    omega * 60.0 / (2.0 * std::f64::consts::PI)
}
