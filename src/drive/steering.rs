// ==============================================================================
// steering.rs — YAW + DRIFT (LATERAL SLIDE INJECTION)
// ==============================================================================
// Only active above min_steer_speed with a non-zero steer input.
//
//     speed_factor = min(|v| / speed_ref, 1)
//     heading     += steer * dt * speed_factor * (1 + hb * steer_handbrake_gain)
//     drift        = |steer| * speed_factor * (1 + hb * drift_handbrake_gain)
//
// When drift > drift_threshold or hb > handbrake_drift_threshold, a slide
// impulse is added along the chassis right axis (after the yaw update):
//
//     Δv_lat = right * steer * drift * |v| * dt * (base_blend + hb * hb_blend)
//
// Lateral velocity then decays through lateral_grip() in handbrake.rs.
// ==============================================================================

use nalgebra::Vector3;

use crate::drive::types::right_axis;
use crate::vehicle::DriveTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteerOutput {
    pub heading: f32,
    pub drift_factor: f32,
    pub lateral_impulse: Vector3<f32>,
}

pub fn solve_steering(
    heading: f32,
    speed: f32,
    steer: f32,
    handbrake: f32,
    dt: f32,
    tuning: &DriveTuning,
) -> SteerOutput {
    let idle = SteerOutput {
        heading,
        drift_factor: 0.0,
        lateral_impulse: Vector3::zeros(),
    };

    if speed <= tuning.min_steer_speed || steer == 0.0 {
        return idle;
    }

    let speed_factor = (speed / tuning.speed_ref).min(1.0);
    let steer_amount = steer * dt * speed_factor;
    let heading = heading + steer_amount * (1.0 + handbrake * tuning.steer_handbrake_gain);

    let drift_factor = steer.abs() * speed_factor * (1.0 + handbrake * tuning.drift_handbrake_gain);

    let sliding = drift_factor > tuning.drift_threshold
        || handbrake > tuning.handbrake_drift_threshold;

    let lateral_impulse = if sliding {
        let blend = tuning.drift_base_blend + handbrake * tuning.drift_handbrake_blend;
        right_axis(heading) * (steer * drift_factor * speed * dt * blend)
    } else {
        Vector3::zeros()
    };

    SteerOutput { heading, drift_factor, lateral_impulse }
}
