// ==============================================================================
// handbrake.rs — FIRST-ORDER HANDBRAKE RESPONSE
// ------------------------------------------------------------------------------
// The handbrake is not an on/off flag. Intensity ramps toward 1 while the
// control is held and back toward 0 once released, with independent rates:
//
//     held:     i += dt * ramp_up
//     released: i -= dt * ramp_down
//
// Release (4/s) is faster than engagement (3/s) in the shipped tuning.
// ==============================================================================

use crate::vehicle::DriveTuning;

pub fn update_handbrake(intensity: f32, held: bool, dt: f32, tuning: &DriveTuning) -> f32 {
    let next = if held {
        intensity + dt * tuning.handbrake_ramp_up
    } else {
        intensity - dt * tuning.handbrake_ramp_down
    };

    if next.is_nan() { 0.0 } else { next.clamp(0.0, 1.0) }
}

/// Per-tick lateral velocity multiplier.
#[inline]
pub fn lateral_grip(intensity: f32, tuning: &DriveTuning) -> f32 {
    tuning.base_lateral_grip - intensity * tuning.lateral_grip_handbrake_penalty
}

/// Extra per-tick multiplier on both velocity components while engaged.
#[inline]
pub fn handbrake_damping(intensity: f32, tuning: &DriveTuning) -> f32 {
    1.0 - intensity * tuning.handbrake_damping
}
