use beamsim::{FrameCommand, Simulation, SimulationSettings};
use tracing::info;

/// Simulated run length (s)
const DURATION: f64 = 5.0;
const SETPOINT: f64 = 0.2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = SimulationSettings::default();
    let frames_per_second = settings.render_fps.round() as usize;
    let frames = (DURATION * settings.render_fps).round() as usize;

    let mut sim = Simulation::new(settings);
    info!(
        steps_per_frame = sim.settings().steps_per_frame(),
        setpoint = SETPOINT,
        "starting headless run"
    );

    let mut command = FrameCommand {
        setpoint: Some(SETPOINT),
        ..Default::default()
    };

    for frame in 1..=frames {
        let view = sim.frame(std::mem::take(&mut command));

        if frame % frames_per_second.max(1) == 0 || view.dropped {
            info!(
                time = %format!("{:.3}", view.time),
                x = %format!("{:.4}", view.state.x),
                alpha = %format!("{:.4}", view.state.alpha),
                torque = %format!("{:.3}", view.last_actuation.applied_torque),
                dropped = view.dropped,
                "state"
            );
        }
        if view.dropped {
            break;
        }
    }

    let state = sim.state();
    info!(
        x = state.x,
        error = (state.x - SETPOINT).abs(),
        "run finished"
    );
}
