//! Frame-driven simulation driver
//!
//! A front end calls [`Simulation::frame`] once per rendered frame. Pending
//! reset, setpoint and parameter changes are applied first, then a fixed
//! batch of physics sub-steps runs, each one strictly
//! sense -> control -> actuate -> integrate.

use beamsim_types::{Parameter, ParameterUpdate, SimulationSettings, SystemParams};

use crate::blocks::{CascadedPid, ControlOutput};
use crate::hal::{Hal, HalConfig};
use crate::plant::{BallBeamPlant, PlantState};
use crate::utils::constants::SETPOINT_EDGE_MARGIN;

/// Requests collected by the front end since the previous frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameCommand {
    pub reset: bool,
    pub setpoint: Option<f64>,
    pub updates: ParameterUpdate,
}

/// Controller and actuator values of the most recent sub-step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Actuation {
    pub control: ControlOutput,
    /// Torque after PWM quantization
    pub applied_torque: f64,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub state: PlantState,
    pub setpoint: f64,
    pub params: SystemParams,
    pub dropped: bool,
    pub beam_length: f64,
    /// Simulated time since start or last reset (s)
    pub time: f64,
    pub last_actuation: Actuation,
}

/// Plant, controller and HAL stepped together in fixed frame batches
#[derive(Debug, Clone)]
pub struct Simulation {
    plant: BallBeamPlant,
    controller: CascadedPid,
    hal: Hal,
    setpoint: f64,
    settings: SimulationSettings,
    time: f64,
    last_actuation: Actuation,
}

impl Simulation {
    /// Simulation with the startup parameter set
    pub fn new(settings: SimulationSettings) -> Self {
        Self::with_params(settings, &SystemParams::default())
    }

    /// Simulation with every parameter taken from `params`
    ///
    /// A degenerate physics timestep is replaced, see
    /// [`SimulationSettings::sanitized`].
    pub fn with_params(settings: SimulationSettings, params: &SystemParams) -> Self {
        let requested_dt = settings.physics_dt;
        let settings = settings.sanitized();
        let dt = settings.physics_dt;
        if dt != requested_dt {
            tracing::warn!(requested_dt, dt, "invalid physics timestep, replacing");
        }

        let hal_config = HalConfig {
            noise_half_width: params.sensor_noise,
            encoder_ppr: params.encoder_ppr,
            pwm_resolution: params.pwm_resolution,
            position_filter_alpha: params.position_filter_alpha,
        };

        let mut sim = Self {
            plant: BallBeamPlant::new(params.beam_length, dt),
            controller: CascadedPid::new(dt),
            hal: Hal::new(hal_config, dt, settings.seed),
            setpoint: 0.0,
            settings,
            time: 0.0,
            last_actuation: Actuation::default(),
        };
        sim.apply_updates(&params.entries().collect::<ParameterUpdate>());
        sim
    }

    /// Apply the frame's requests, advance one frame of physics, report
    pub fn frame(&mut self, command: FrameCommand) -> FrameView {
        self.apply(&command);

        if !self.plant.is_dropped() {
            self.run_substeps(self.settings.steps_per_frame());
        }

        tracing::trace!(
            x = self.plant.state().x,
            setpoint = self.setpoint,
            dropped = self.plant.is_dropped(),
            "frame"
        );
        self.view()
    }

    /// Apply reset, then setpoint, then parameter updates
    pub fn apply(&mut self, command: &FrameCommand) {
        if command.reset {
            self.reset();
        }
        if let Some(setpoint) = command.setpoint {
            self.set_setpoint(setpoint);
        }
        if !command.updates.is_empty() {
            self.apply_updates(&command.updates);
        }
    }

    pub fn run_substeps(&mut self, count: usize) {
        for _ in 0..count {
            self.substep();
        }
    }

    /// One physics tick through the full loop
    pub fn substep(&mut self) -> PlantState {
        let state = self.plant.state();

        let measurements = self.hal.sense(&state);
        let control = self.controller.compute(
            self.setpoint,
            measurements.filtered_x,
            measurements.velocity,
            measurements.measured_alpha,
            measurements.filtered_omega,
        );
        let applied_torque = self.hal.actuate(control.motor_cmd);

        if !self.plant.is_dropped() {
            self.time += self.plant.dt();
        }
        self.last_actuation = Actuation {
            control,
            applied_torque,
        };
        self.plant.step(applied_torque)
    }

    /// Clamp a new target position to stay clear of the beam ends
    ///
    /// Returns the setpoint actually in force.
    pub fn set_setpoint(&mut self, setpoint: f64) -> f64 {
        let half = self.plant.beam_length() / 2.0;
        let (lower, upper) = (-half + SETPOINT_EDGE_MARGIN, half - SETPOINT_EDGE_MARGIN);

        // NaN resolves to the upper bound
        let clamped = lower.max(upper.min(setpoint));
        if clamped != setpoint {
            tracing::debug!(requested = setpoint, clamped, "setpoint clamped to beam");
        }

        self.setpoint = clamped;
        clamped
    }

    /// Zero the plant and controller state according to the reset scope
    pub fn reset(&mut self) {
        self.plant.reset();
        self.controller.reset();
        self.hal.reset_tracking();
        if self.settings.reset_scope.resets_filters() {
            self.hal.reset_filters();
        }
        self.setpoint = 0.0;
        self.time = 0.0;
        self.last_actuation = Actuation::default();

        tracing::info!(scope = self.settings.reset_scope.as_str(), "simulation reset");
    }

    pub fn apply_updates(&mut self, updates: &ParameterUpdate) {
        for (parameter, value) in updates.iter() {
            self.set_parameter(parameter, value);
        }
    }

    /// Write one parameter into the component that owns it
    pub fn set_parameter(&mut self, parameter: Parameter, value: f64) {
        match parameter {
            Parameter::BeamLength => self.plant.set_beam_length(value),
            Parameter::MotorMaxRpm => self.plant.set_motor_max_rpm(value),
            Parameter::EncoderPpr => self.hal.set_encoder_ppr(value),
            Parameter::PwmResolution => self.hal.set_pwm_resolution(value),
            Parameter::SensorNoise => self.hal.set_noise_half_width(value),
            Parameter::PositionFilterAlpha => self.hal.set_position_filter_alpha(value),
            Parameter::OuterP => self.controller.outer_mut().set_kp(value),
            Parameter::OuterI => self.controller.outer_mut().set_ki(value),
            Parameter::OuterD => self.controller.outer_mut().set_kd(value),
            Parameter::InnerP => self.controller.inner_mut().set_kp(value),
            Parameter::InnerI => self.controller.inner_mut().set_ki(value),
            Parameter::InnerD => self.controller.inner_mut().set_kd(value),
        }
        tracing::debug!(%parameter, value, "parameter applied");
    }

    /// Live parameter values read back from the components
    pub fn parameters(&self) -> SystemParams {
        let hal = self.hal.config();
        let (outer_p, outer_i, outer_d) = self.controller.outer().gains();
        let (inner_p, inner_i, inner_d) = self.controller.inner().gains();

        SystemParams {
            beam_length: self.plant.beam_length(),
            motor_max_rpm: self.plant.motor_max_rpm(),
            encoder_ppr: hal.encoder_ppr,
            pwm_resolution: hal.pwm_resolution,
            sensor_noise: hal.noise_half_width,
            position_filter_alpha: hal.position_filter_alpha,
            outer_p,
            outer_i,
            outer_d,
            inner_p,
            inner_i,
            inner_d,
        }
    }

    pub fn view(&self) -> FrameView {
        FrameView {
            state: self.plant.state(),
            setpoint: self.setpoint,
            params: self.parameters(),
            dropped: self.plant.is_dropped(),
            beam_length: self.plant.beam_length(),
            time: self.time,
            last_actuation: self.last_actuation,
        }
    }

    pub fn state(&self) -> PlantState {
        self.plant.state()
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn is_dropped(&self) -> bool {
        self.plant.is_dropped()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn plant(&self) -> &BallBeamPlant {
        &self.plant
    }

    /// Direct plant access, e.g. to place the ball for a scenario
    pub fn plant_mut(&mut self) -> &mut BallBeamPlant {
        &mut self.plant
    }

    pub fn controller(&self) -> &CascadedPid {
        &self.controller
    }

    pub fn hal(&self) -> &Hal {
        &self.hal
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationSettings::default())
    }
}
