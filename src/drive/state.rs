use crate::vehicle::{DriveTuning, GEAR_COUNT};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GearShift {
    Manual,
    Up,
    Down,
}

impl GearShift {
    /// Rpm forced right after the shift.
    pub fn rpm(self, tuning: &DriveTuning) -> f32 {
        match self {
            GearShift::Manual => tuning.manual_shift_rpm,
            GearShift::Up => tuning.upshift_rpm,
            GearShift::Down => tuning.downshift_rpm,
        }
    }
}

/// Gear state machine. Returns the new gear and the transition that fired,
/// if any. Manual requests win over automatic shifts in the same tick.
pub fn update_gear(
    prev: u8,
    display_speed: f32,
    shift_requested: bool,
    tuning: &DriveTuning,
) -> (u8, Option<GearShift>) {
    let gear = prev.clamp(1, GEAR_COUNT);

    // Manual cycle 1 -> 2 -> .. -> 6 -> 1
    if shift_requested {
        let next = if gear < GEAR_COUNT { gear + 1 } else { 1 };
        return (next, Some(GearShift::Manual));
    }

    if !tuning.auto_shift {
        return (gear, None);
    }

    let ceiling = tuning.max_speed_for(gear);

    if gear < GEAR_COUNT && display_speed > tuning.upshift_ratio * ceiling {
        return (gear + 1, Some(GearShift::Up));
    }

    if gear > 1 && display_speed < tuning.downshift_ratio * ceiling {
        return (gear - 1, Some(GearShift::Down));
    }

    (gear, None)
}
