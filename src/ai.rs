// ==============================================================================
// ai.rs — KINEMATIC AI CARS ON FIXED CIRCLES
// ------------------------------------------------------------------------------
// Each car keeps its own accumulated angle; position and heading are derived
// from it every tick and never fed back:
//
//     angle   += angular_rate * dt
//     position = (cos(angle) * radius, 0, sin(angle) * radius)
//     heading  = angle + π/2        (path tangent)
//
// Purely decorative: no avoidance, no contact with the player or the track.
// ==============================================================================

use std::f32::consts::FRAC_PI_2;

use nalgebra::Point3;

use crate::spawn::AiSpawnSlot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiCar {
    pub angle: f32,
    pub radius: f32,
    pub angular_rate: f32,
    pub position: Point3<f32>,
    pub heading: f32,
}

impl AiCar {
    pub fn new(angle: f32, radius: f32, angular_rate: f32) -> Self {
        let mut car = Self {
            angle,
            radius,
            angular_rate,
            position: Point3::origin(),
            heading: 0.0,
        };
        car.derive_pose();
        car
    }

    pub fn step(&mut self, dt: f32) {
        self.angle += self.angular_rate * dt;
        self.derive_pose();
    }

    fn derive_pose(&mut self) {
        self.position = Point3::new(self.angle.cos() * self.radius, 0.0, self.angle.sin() * self.radius);
        self.heading = self.angle + FRAC_PI_2;
    }
}

impl From<AiSpawnSlot> for AiCar {
    fn from(slot: AiSpawnSlot) -> Self {
        AiCar::new(slot.start_angle, slot.radius, slot.angular_rate)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AiRoster {
    pub cars: Vec<AiCar>,
}

impl AiRoster {
    pub fn from_slots(slots: impl IntoIterator<Item = AiSpawnSlot>) -> Self {
        Self { cars: slots.into_iter().map(AiCar::from).collect() }
    }

    pub fn step(&mut self, dt: f32) {
        for car in &mut self.cars {
            car.step(dt);
        }
    }
}
