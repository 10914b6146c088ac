//! Integration tests for the ball-and-beam plant
//!
//! Checks the integrator ordering, the beam hard stop, the motor speed limit
//! and the drop condition against hand-computed values.

use approx::assert_relative_eq;
use std::f64::consts::{FRAC_PI_4, PI};

use beamsim::utils::constants::GRAVITY;
use beamsim::{BallBeamPlant, Block, PlantState};

const DT: f64 = 0.001;

#[test]
fn test_equilibrium_is_preserved() {
    let mut plant = BallBeamPlant::new(0.8, DT);
    for _ in 0..5000 {
        plant.step(0.0);
    }
    assert_eq!(plant.state(), PlantState::default());
    assert!(!plant.is_dropped());
}

#[test]
fn test_single_step_matches_semi_implicit_euler() {
    let mut plant = BallBeamPlant::new(0.8, DT);
    plant.set_state(PlantState::new(0.05, 0.1, 0.2, -0.3));

    let state = plant.step(2.0);

    // Velocities first from the pre-step state, positions from new velocities
    let v = 0.1 + (-5.0 / 7.0 * GRAVITY * 0.2_f64.sin() - 0.2 * 0.1) * DT;
    let omega = -0.3 + (2.0 - 0.5 * -0.3) * DT;
    assert_relative_eq!(state.v, v, epsilon = 1e-12);
    assert_relative_eq!(state.omega, omega, epsilon = 1e-12);
    assert_relative_eq!(state.x, 0.05 + v * DT, epsilon = 1e-12);
    assert_relative_eq!(state.alpha, 0.2 + omega * DT, epsilon = 1e-12);
}

#[test]
fn test_ball_rolls_downhill() {
    let mut plant = BallBeamPlant::new(0.8, DT);
    plant.set_state(PlantState::new(0.0, 0.0, 0.1, 0.0));

    for _ in 0..200 {
        plant.step(0.0);
    }

    // Positive tilt sends the ball toward -x
    let state = plant.state();
    assert!(state.x < 0.0);
    assert!(state.v < 0.0);
    // No torque and no beam velocity: the tilt holds
    assert_eq!(state.alpha, 0.1);
}

#[test]
fn test_hard_stop_is_inelastic() {
    let mut plant = BallBeamPlant::new(0.8, DT);
    plant.set_state(PlantState::new(0.0, 0.0, 0.0, 0.0));

    for _ in 0..2000 {
        let state = plant.step(50.0);
        assert!(state.alpha <= FRAC_PI_4);
    }

    let state = plant.state();
    assert_eq!(state.alpha, FRAC_PI_4);
    assert_eq!(state.omega, 0.0);

    for _ in 0..2000 {
        plant.step(-50.0);
    }
    let state = plant.state();
    assert_eq!(state.alpha, -FRAC_PI_4);
    assert_eq!(state.omega, 0.0);
}

#[test]
fn test_motor_speed_limit() {
    let mut plant = BallBeamPlant::new(0.8, DT);
    plant.set_motor_max_rpm(60.0);
    assert_relative_eq!(plant.max_omega(), 2.0 * PI, epsilon = 1e-12);

    for _ in 0..1000 {
        let state = plant.step(50.0);
        assert!(state.omega <= 2.0 * PI);
    }
}

#[test]
fn test_ball_drops_and_freezes() {
    let mut plant = BallBeamPlant::new(0.8, DT);
    plant.set_state(PlantState::new(0.0, 0.0, 0.3, 0.0));

    let mut steps = 0;
    while !plant.is_dropped() && steps < 5000 {
        plant.step(0.0);
        steps += 1;
    }
    assert!(plant.is_dropped());
    assert!(plant.state().x < -0.4);

    let frozen = plant.state();
    for _ in 0..100 {
        assert_eq!(plant.step(10.0), frozen);
    }

    plant.reset();
    assert!(!plant.is_dropped());
    assert_eq!(plant.state(), PlantState::default());
}

#[test]
fn test_shorter_beam_drops_sooner() {
    let steps_to_drop = |length: f64| {
        let mut plant = BallBeamPlant::new(length, DT);
        plant.set_state(PlantState::new(0.0, 0.0, 0.3, 0.0));
        let mut steps = 0;
        while !plant.is_dropped() {
            plant.step(0.0);
            steps += 1;
        }
        steps
    };

    assert!(steps_to_drop(0.2) < steps_to_drop(0.8));
}

#[test]
fn test_block_interface_reports_drop() {
    let mut plant = BallBeamPlant::new(0.8, DT);
    plant.set_state(PlantState::new(0.3995, 1.0, 0.0, 0.0));
    plant.set_input(0, 0.0);

    let result = Block::step(&mut plant, 0.0, DT);
    assert!(result.terminal);
    assert!(plant.get_output(0) > 0.4);
}
