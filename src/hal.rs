//! Hardware abstraction layer
//!
//! Sits between the true plant state and the controller:
//! - position: noise, 1 mm quantization, EMA
//! - angle: encoder quantization only
//! - angular rate: finite difference of consecutive quantized angles, EMA
//! - velocity: passed through from the true state
//!
//! and between the controller and the plant:
//! - torque: PWM duty quantization

use crate::blocks::{EmaFilter, Encoder, PositionSensor, PwmDriver};
use crate::plant::PlantState;
use crate::utils::constants::{
    ENCODER_PPR, MAX_MOTOR_TORQUE, POSITION_FILTER_ALPHA, PWM_RESOLUTION, RATE_FILTER_ALPHA,
    SENSOR_NOISE,
};

/// Tunable HAL parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalConfig {
    /// Position sensor noise half-width (m)
    pub noise_half_width: f64,
    /// Encoder pulses per revolution
    pub encoder_ppr: f64,
    /// PWM steps per polarity
    pub pwm_resolution: f64,
    /// Smoothing constant of the position EMA
    pub position_filter_alpha: f64,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            noise_half_width: SENSOR_NOISE,
            encoder_ppr: ENCODER_PPR,
            pwm_resolution: PWM_RESOLUTION,
            position_filter_alpha: POSITION_FILTER_ALPHA,
        }
    }
}

/// What the controller gets to see in one sub-step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    /// Filtered position reading (m)
    pub filtered_x: f64,
    /// Ball velocity, ideal (m/s)
    pub velocity: f64,
    /// Quantized encoder angle (rad)
    pub measured_alpha: f64,
    /// Finite-difference rate of the quantized angle (rad/s)
    pub raw_omega: f64,
    /// Filtered angular rate (rad/s)
    pub filtered_omega: f64,
}

/// Sensor chain and motor driver between the plant and the controller
#[derive(Debug, Clone)]
pub struct Hal {
    position_sensor: PositionSensor,
    position_filter: EmaFilter,
    encoder: Encoder,
    rate_filter: EmaFilter,
    prev_measured_alpha: f64,
    pwm: PwmDriver,
    dt: f64,
}

impl Hal {
    /// `dt` is the physics timestep used to difference encoder readings
    pub fn new(config: HalConfig, dt: f64, seed: Option<u64>) -> Self {
        Self {
            position_sensor: PositionSensor::new(config.noise_half_width, seed),
            position_filter: EmaFilter::new(config.position_filter_alpha),
            encoder: Encoder::new(config.encoder_ppr),
            rate_filter: EmaFilter::new(RATE_FILTER_ALPHA),
            prev_measured_alpha: 0.0,
            pwm: PwmDriver::new(config.pwm_resolution, MAX_MOTOR_TORQUE),
            dt,
        }
    }

    /// Turn the true state into sensor readings
    pub fn sense(&mut self, state: &PlantState) -> Measurements {
        let measured_x = self.position_sensor.read(state.x);
        let filtered_x = self.position_filter.update(measured_x);

        let measured_alpha = self.encoder.read(state.alpha);
        let raw_omega = (measured_alpha - self.prev_measured_alpha) / self.dt;
        let filtered_omega = self.rate_filter.update(raw_omega);
        self.prev_measured_alpha = measured_alpha;

        Measurements {
            filtered_x,
            velocity: state.v,
            measured_alpha,
            raw_omega,
            filtered_omega,
        }
    }

    /// Torque the motor actually delivers for a torque command
    pub fn actuate(&self, motor_cmd: f64) -> f64 {
        self.pwm.apply(motor_cmd)
    }

    /// Forget the previous encoder reading
    pub fn reset_tracking(&mut self) {
        self.prev_measured_alpha = 0.0;
    }

    /// Let both EMA filters bootstrap on their next sample
    pub fn reset_filters(&mut self) {
        self.position_filter.reinitialize();
        self.rate_filter.reinitialize();
    }

    pub fn config(&self) -> HalConfig {
        HalConfig {
            noise_half_width: self.position_sensor.noise_half_width(),
            encoder_ppr: self.encoder.ppr(),
            pwm_resolution: self.pwm.resolution(),
            position_filter_alpha: self.position_filter.alpha(),
        }
    }

    pub fn set_noise_half_width(&mut self, half_width: f64) {
        self.position_sensor.set_noise_half_width(half_width);
    }

    pub fn set_encoder_ppr(&mut self, ppr: f64) {
        self.encoder.set_ppr(ppr);
    }

    pub fn set_pwm_resolution(&mut self, resolution: f64) {
        self.pwm.set_resolution(resolution);
    }

    pub fn set_position_filter_alpha(&mut self, alpha: f64) {
        self.position_filter.set_alpha(alpha);
    }

    pub fn reseed(&mut self, seed: u64) {
        self.position_sensor.reseed(seed);
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn position_filter(&self) -> &EmaFilter {
        &self.position_filter
    }

    pub fn rate_filter(&self) -> &EmaFilter {
        &self.rate_filter
    }

    pub fn prev_measured_alpha(&self) -> f64 {
        self.prev_measured_alpha
    }
}
