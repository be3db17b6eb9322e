//! Core shared types for `drive` (engine-agnostic).
// drive/types.rs
use std::f32::consts::FRAC_PI_2;

use nalgebra::{UnitQuaternion, Vector3};

// ============================================
// ----- per-tick driver input ----------------
// ============================================
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub throttle: f32,        // -1, 0, 1 (negative = brake / reverse)
    pub steer: f32,           // -1, 0, 1 (+1 turns right)
    pub handbrake: bool,
    pub boost: bool,
    pub gear_shift: bool,     // edge, true for exactly one tick per press
    pub camera_toggle: bool,  // edge, consumed by the camera rig
}

impl InputState {
    pub fn accelerating(&self) -> bool {
        self.throttle > 0.0
    }

    pub fn braking(&self) -> bool {
        self.throttle < 0.0
    }

    pub fn boosting(&self) -> bool {
        self.boost && self.throttle > 0.0
    }
}

// ============================================
// ----- heading frame ------------------------
// ============================================
// Heading is the planar angle in the x–z ground plane, measured from +x
// toward +z (same frame as the track points). Chassis local frame is +z
// forward, +y up, -x right.

#[inline]
pub fn up() -> Vector3<f32> {
    Vector3::new(0.0, 1.0, 0.0)
}

#[inline]
pub fn forward_axis(heading: f32) -> Vector3<f32> {
    Vector3::new(heading.cos(), 0.0, heading.sin())
}

/// forward × up
#[inline]
pub fn right_axis(heading: f32) -> Vector3<f32> {
    Vector3::new(-heading.sin(), 0.0, heading.cos())
}

/// Yaw rotation taking chassis-local +z onto `forward_axis(heading)`.
#[inline]
pub fn yaw_rotation(heading: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2 - heading)
}

#[inline]
pub fn safe_normalize(v: Vector3<f32>) -> Option<Vector3<f32>> {
    v.try_normalize(1e-6)
}
