// ==============================================================================
// longitudinal.rs — ENGINE FORCE, DRAG AND PER-GEAR SPEED CAP
// ==============================================================================
// Arcade model, no wheel state:
//
//     force     = throttle_eff * (base_force + gear * gear_force_scale)
//     velocity += forward(heading) * force * dt
//     velocity *= drag                          (every tick, per tick)
//     |velocity| <= max_speed[gear]
//
// throttle_eff:
// - forward: 1, or boost_factor while boosting
// - reverse: -brake_scale
//
// Drag is a per-tick multiplier, so coasting decay depends on frame rate.
// ===============================================================================

use nalgebra::Vector3;

use crate::drive::types::{InputState, forward_axis, safe_normalize};
use crate::vehicle::DriveTuning;

/// Signed throttle after brake scaling and boost.
pub fn effective_throttle(input: &InputState, tuning: &DriveTuning) -> f32 {
    if input.throttle > 0.0 {
        if input.boost { tuning.boost_factor } else { 1.0 }
    } else if input.throttle < 0.0 {
        -tuning.brake_scale
    } else {
        0.0
    }
}

pub fn engine_force(input: &InputState, gear: u8, tuning: &DriveTuning) -> f32 {
    let throttle = effective_throttle(input, tuning);
    if throttle == 0.0 {
        return 0.0;
    }
    throttle * (tuning.base_force + gear as f32 * tuning.gear_force_scale)
}

/// Engine push along the heading, then drag.
pub fn integrate_velocity(
    velocity: Vector3<f32>,
    heading: f32,
    force: f32,
    dt: f32,
    tuning: &DriveTuning,
) -> Vector3<f32> {
    let pushed = velocity + forward_axis(heading) * (force * dt);
    pushed * tuning.drag
}

/// Rescale to the gear ceiling if above it.
pub fn cap_speed(velocity: Vector3<f32>, max_speed: f32) -> Vector3<f32> {
    if velocity.norm() <= max_speed {
        return velocity;
    }
    match safe_normalize(velocity) {
        Some(dir) => dir * max_speed,
        None => Vector3::zeros(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::ARCADE;

    fn input(throttle: f32, boost: bool) -> InputState {
        InputState { throttle, boost, ..InputState::default() }
    }

    #[test]
    fn first_gear_force() {
        assert_eq!(engine_force(&input(1.0, false), 1, &ARCADE), 40.0);
        assert_eq!(engine_force(&input(1.0, false), 6, &ARCADE), 90.0);
    }

    #[test]
    fn brake_is_reduced_reverse() {
        assert_eq!(engine_force(&input(-1.0, false), 1, &ARCADE), -20.0);
        // boost does nothing in reverse
        assert_eq!(engine_force(&input(-1.0, true), 1, &ARCADE), -20.0);
    }

    #[test]
    fn boost_multiplies_forward() {
        assert_eq!(engine_force(&input(1.0, true), 1, &ARCADE), 60.0);
    }

    #[test]
    fn no_throttle_no_force() {
        assert_eq!(engine_force(&input(0.0, true), 3, &ARCADE), 0.0);
    }

    #[test]
    fn drag_applies_without_force() {
        let v = integrate_velocity(Vector3::new(0.0, 0.0, 10.0), 0.0, 0.0, 0.016, &ARCADE);
        assert!((v.z - 9.8).abs() < 1e-5);
    }

    #[test]
    fn cap_keeps_direction() {
        let v = cap_speed(Vector3::new(30.0, 0.0, 40.0), 20.0);
        assert!((v.norm() - 20.0).abs() < 1e-4);
        assert!((v.x / v.z - 0.75).abs() < 1e-5);

        let slow = Vector3::new(1.0, 0.0, 1.0);
        assert_eq!(cap_speed(slow, 20.0), slow);
        assert_eq!(cap_speed(Vector3::zeros(), 0.0), Vector3::zeros());
    }
}
