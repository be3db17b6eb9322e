// ==============================================================================
// camera.rs — CHASE / COCKPIT CAMERA RIG
// ------------------------------------------------------------------------------
// Offsets are chassis-local (+z forward, +y up) and rotated by the vehicle yaw:
//
//   TPP: eye = p + R(h) * tpp_offset      target = p
//   FPP: eye = p + R(h) * fpp_offset      target = p + R(h) * forward_probe
//
// Toggle edges closer together than toggle_cooldown are dropped.
// ==============================================================================

use nalgebra::{Isometry3, Point3, Vector3};
use serde::Serialize;
use tracing::debug;

use crate::drive::types::{up, yaw_rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Tpp,
    Fpp,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Tpp => CameraMode::Fpp,
            CameraMode::Fpp => CameraMode::Tpp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
}

impl CameraTransform {
    /// Right-handed world -> view isometry.
    pub fn view(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.eye, &self.target, &up())
    }
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    pub mode: CameraMode,
    pub tpp_offset: Vector3<f32>,
    pub fpp_offset: Vector3<f32>,
    pub forward_probe: Vector3<f32>,
    pub toggle_cooldown: f32, // s
    since_toggle: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            mode: CameraMode::Tpp,
            tpp_offset: Vector3::new(0.0, 5.0, -10.0),
            fpp_offset: Vector3::new(0.0, 1.2, 0.3),
            forward_probe: Vector3::new(0.0, 1.0, 10.0),
            toggle_cooldown: 0.25,
            since_toggle: f32::INFINITY,
        }
    }
}

impl CameraRig {
    /// Advance the debounce timer and apply a toggle edge if allowed.
    /// Returns true when the mode changed.
    pub fn update(&mut self, toggle_requested: bool, dt: f32) -> bool {
        self.since_toggle += dt;

        if !toggle_requested || self.since_toggle < self.toggle_cooldown {
            return false;
        }

        self.mode = self.mode.toggled();
        self.since_toggle = 0.0;
        debug!(mode = ?self.mode, "camera toggled");
        true
    }

    pub fn transform(&self, position: Point3<f32>, heading: f32) -> CameraTransform {
        let rot = yaw_rotation(heading);
        match self.mode {
            CameraMode::Tpp => CameraTransform {
                eye: position + rot * self.tpp_offset,
                target: position,
            },
            CameraMode::Fpp => CameraTransform {
                eye: position + rot * self.fpp_offset,
                target: position + rot * self.forward_probe,
            },
        }
    }
}
