use nalgebra::{Point3, Vector3};

pub const GEAR_COUNT: u8 = 6;

pub struct DriveTuning {
    // --- Engine ---
    pub base_force: f32,          // force at throttle 1, before gear scaling
    pub gear_force_scale: f32,    // extra force per gear index
    pub brake_scale: f32,         // reverse throttle magnitude (0..1)
    pub boost_factor: f32,        // throttle multiplier while boosting forward
    pub drag: f32,                // per-tick velocity multiplier (frame-rate dependent)
    pub max_speed: [f32; GEAR_COUNT as usize], // per-gear speed ceiling (gear 1 first)

    // --- Steering / drift ---
    pub min_steer_speed: f32,     // below this the car does not turn
    pub speed_ref: f32,           // speed at which steering authority saturates
    pub steer_handbrake_gain: f32,
    pub drift_handbrake_gain: f32,
    pub drift_threshold: f32,
    pub handbrake_drift_threshold: f32,
    pub drift_base_blend: f32,
    pub drift_handbrake_blend: f32,

    // --- Grip ---
    pub base_lateral_grip: f32,   // per-tick lateral velocity multiplier
    pub lateral_grip_handbrake_penalty: f32,
    pub handbrake_damping: f32,   // extra per-tick loss at full handbrake

    // --- Handbrake response ---
    pub handbrake_ramp_up: f32,   // intensity per second while held
    pub handbrake_ramp_down: f32, // intensity per second after release

    // --- Telemetry / gearbox ---
    pub display_scale: f32,
    pub idle_rpm: f32,
    pub max_rpm: f32,
    pub manual_shift_rpm: f32,
    pub upshift_rpm: f32,
    pub downshift_rpm: f32,
    pub upshift_ratio: f32,       // of current gear ceiling
    pub downshift_ratio: f32,     // of current gear ceiling
    pub auto_shift: bool,

    pub dt_max: f32,              // s
}

impl DriveTuning {
    /// Ceiling for `gear`, clamped into the valid gear range.
    #[inline]
    pub fn max_speed_for(&self, gear: u8) -> f32 {
        let idx = gear.clamp(1, GEAR_COUNT) as usize - 1;
        self.max_speed[idx]
    }

    #[inline]
    pub fn rpm_range(&self) -> f32 {
        self.max_rpm - self.idle_rpm
    }
}

pub const ARCADE: DriveTuning = DriveTuning {
    base_force: 30.0,
    gear_force_scale: 10.0,
    brake_scale: 0.5,
    boost_factor: 1.5,
    drag: 0.98,
    max_speed: [20.0, 35.0, 50.0, 65.0, 80.0, 95.0],

    min_steer_speed: 0.1,
    speed_ref: 10.0,
    steer_handbrake_gain: 0.5,
    drift_handbrake_gain: 1.0,
    drift_threshold: 0.7,
    handbrake_drift_threshold: 0.3,
    drift_base_blend: 0.1,
    drift_handbrake_blend: 0.3,

    base_lateral_grip: 0.9,
    lateral_grip_handbrake_penalty: 0.15,
    handbrake_damping: 0.02,

    handbrake_ramp_up: 3.0,
    handbrake_ramp_down: 4.0,

    display_scale: 1.0,
    idle_rpm: 800.0,
    max_rpm: 7000.0,
    manual_shift_rpm: 2500.0,
    upshift_rpm: 3000.0,
    downshift_rpm: 5000.0,
    upshift_ratio: 0.9,
    downshift_ratio: 0.4,
    auto_shift: true,

    dt_max: 0.1,
};

/// Player car state. Only `drive::advance` produces new values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Point3<f32>,
    pub heading: f32,                  // yaw, planar angle from +x toward +z
    pub velocity: Vector3<f32>,        // forward component
    pub lateral_velocity: Vector3<f32>,// sliding component
    pub gear: u8,                      // 1..=6
    pub rpm: f32,
    pub handbrake_intensity: f32,      // 0..1, smoothed
    pub drift_factor: f32,             // recomputed every tick
    pub display_speed: f32,
}

impl VehicleState {
    pub fn at_rest(position: Point3<f32>, heading: f32, tuning: &DriveTuning) -> Self {
        Self {
            position,
            heading,
            velocity: Vector3::zeros(),
            lateral_velocity: Vector3::zeros(),
            gear: 1,
            rpm: tuning.idle_rpm,
            handbrake_intensity: 0.0,
            drift_factor: 0.0,
            display_speed: 0.0,
        }
    }
}
