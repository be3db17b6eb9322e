use std::f32::consts::TAU;

// ---------------------------------------------
// AI LANE ASSIGNMENT
// ---------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiSpawnSlot {
    pub radius: f32,
    pub angular_rate: f32, // rad/s
    pub start_angle: f32,  // rad
}

/// Hands out staggered lanes so AI cars never share a circle or a phase.
#[derive(Debug)]
pub struct SpawnPlanner {
    pub base_radius: f32,
    pub lane_spacing: f32, // m between neighbouring lanes
    pub base_rate: f32,    // rad/s for the innermost car
    pub rate_step: f32,    // rad/s added per lane
}

impl SpawnPlanner {
    pub fn new(base_radius: f32, half_width: f32) -> Self {
        Self {
            base_radius,
            lane_spacing: (half_width * 0.5).max(2.0),
            base_rate: 0.10,
            rate_step: 0.015,
        }
    }

    // ---------------------------------------------------------
    // Lanes alternate around the centerline radius:
    //   0 -> r, 1 -> r + s, 2 -> r - s, 3 -> r + 2s, ...
    // ---------------------------------------------------------
    fn lane_offset(&self, index: usize) -> f32 {
        let step = index.div_ceil(2) as f32;
        let sign = if index % 2 == 1 { 1.0 } else { -1.0 };
        sign * step * self.lane_spacing
    }

    pub fn plan(&self, count: usize) -> Vec<AiSpawnSlot> {
        (0..count)
            .map(|index| AiSpawnSlot {
                radius: (self.base_radius + self.lane_offset(index)).max(self.lane_spacing),
                angular_rate: self.base_rate + index as f32 * self.rate_step,
                start_angle: TAU * index as f32 / count as f32,
            })
            .collect()
    }
}
