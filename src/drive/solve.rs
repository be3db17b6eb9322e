// ==============================================================================
// solve.rs — ONE VEHICLE TICK
// ==============================================================================
// advance(state, input, dt) -> state'
//
// Order (each stage reads the output of the previous one):
//  1) handbrake ramp
//  2) engine force (gear + boost + brake scaling)
//  3) push along heading, per-tick drag
//  4) per-gear speed cap
//  5) yaw + drift slide injection
//  6) lateral grip decay
//  7) position integration with forward + lateral velocity
//  8) extra handbrake damping on both components
//  9) display speed + rpm
// 10) gearbox (manual cycle, then auto up/down)
//
// Total: never fails. dt, gear and handbrake intensity are clamped on entry.
// ==============================================================================

use nalgebra::Vector3;

use crate::clock::sanitize_dt;
use crate::drive::handbrake::{handbrake_damping, lateral_grip, update_handbrake};
use crate::drive::longitudinal::{cap_speed, engine_force, integrate_velocity};
use crate::drive::state::update_gear;
use crate::drive::steering::solve_steering;
use crate::drive::types::InputState;
use crate::vehicle::{DriveTuning, GEAR_COUNT, VehicleState};

pub fn advance(state: &VehicleState, input: &InputState, dt: f32, tuning: &DriveTuning) -> VehicleState {
    let dt = sanitize_dt(dt, tuning.dt_max);
    let gear = state.gear.clamp(1, GEAR_COUNT);

    // 1) handbrake
    let hb = update_handbrake(state.handbrake_intensity.clamp(0.0, 1.0), input.handbrake, dt, tuning);

    // 2) + 3) engine, drag
    let force = engine_force(input, gear, tuning);
    let velocity = integrate_velocity(state.velocity, state.heading, force, dt, tuning);

    // 4) cap
    let velocity = cap_speed(velocity, tuning.max_speed_for(gear));
    let speed = velocity.norm();

    // 5) steering + drift
    let steer = solve_steering(state.heading, speed, input.steer, hb, dt, tuning);
    let lateral_velocity = state.lateral_velocity + steer.lateral_impulse;

    // 6) grip
    let lateral_velocity = lateral_velocity * lateral_grip(hb, tuning);

    // 7) position
    let position = state.position + (velocity + lateral_velocity) * dt;

    // 8) handbrake scrub
    let (velocity, lateral_velocity) = if hb > 0.0 {
        let k = handbrake_damping(hb, tuning);
        (velocity * k, lateral_velocity * k)
    } else {
        (velocity, lateral_velocity)
    };

    // 9) telemetry
    let display_speed = velocity.norm() * tuning.display_scale;
    let rpm = (tuning.idle_rpm + (display_speed / tuning.max_speed_for(gear)) * tuning.rpm_range())
        .clamp(tuning.idle_rpm, tuning.max_rpm);

    // 10) gearbox
    let (gear, shift) = update_gear(gear, display_speed, input.gear_shift, tuning);
    let rpm = shift.map_or(rpm, |s| s.rpm(tuning));

    VehicleState {
        position,
        heading: steer.heading,
        velocity: finite_or_zero(velocity),
        lateral_velocity: finite_or_zero(lateral_velocity),
        gear,
        rpm,
        handbrake_intensity: hb,
        drift_factor: steer.drift_factor,
        display_speed,
    }
}

#[inline]
fn finite_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    if v.iter().all(|c| c.is_finite()) { v } else { Vector3::zeros() }
}
