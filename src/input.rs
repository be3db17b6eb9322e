// ==============================================================================
// input.rs — LOGICAL CONTROLS -> PER-TICK InputState
// ------------------------------------------------------------------------------
// Each client owns a KeyState written by the network task whenever a key event
// arrives (last write wins). The frame loop reads the union of all of them
// once at the start of each tick through InputSource.
//
// InputSampler turns the held/released levels into an InputState:
// - steer:    left -> +1, right -> -1. Left turns the car right and right
//             turns it left; this mirrored mapping is intentional.
//             Both held: right wins (read last).
// - throttle: forward -> +1, back -> -1. Both held: back wins (read last).
// - gear_shift / camera_toggle: rising edges only, computed here from the
//   previous tick's level.
// ==============================================================================

use serde::Deserialize;

use crate::drive::InputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    ThrottleForward,
    ThrottleBack,
    SteerLeft,
    SteerRight,
    Handbrake,
    Boost,
    GearShift,
    CameraToggle,
}

impl Control {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

pub trait InputSource {
    fn is_active(&self, control: Control) -> bool;
}

/// Latest level per control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    held: [bool; 8],
}

impl KeyState {
    pub fn set(&mut self, control: Control, active: bool) {
        self.held[control.index()] = active;
    }

    /// Held in either.
    pub fn union(self, other: KeyState) -> KeyState {
        let mut held = self.held;
        for (h, o) in held.iter_mut().zip(other.held) {
            *h |= o;
        }
        KeyState { held }
    }
}

impl InputSource for KeyState {
    fn is_active(&self, control: Control) -> bool {
        self.held[control.index()]
    }
}

#[derive(Debug, Default)]
pub struct InputSampler {
    gear_was_held: bool,
    camera_was_held: bool,
}

impl InputSampler {
    pub fn sample<S: InputSource + ?Sized>(&mut self, src: &S) -> InputState {
        let mut throttle = 0.0;
        if src.is_active(Control::ThrottleForward) {
            throttle = 1.0;
        }
        if src.is_active(Control::ThrottleBack) {
            throttle = -1.0;
        }

        let mut steer = 0.0;
        if src.is_active(Control::SteerLeft) {
            steer = 1.0;
        }
        if src.is_active(Control::SteerRight) {
            steer = -1.0;
        }

        let gear_held = src.is_active(Control::GearShift);
        let camera_held = src.is_active(Control::CameraToggle);

        let gear_shift = gear_held && !self.gear_was_held;
        let camera_toggle = camera_held && !self.camera_was_held;

        self.gear_was_held = gear_held;
        self.camera_was_held = camera_held;

        InputState {
            throttle,
            steer,
            handbrake: src.is_active(Control::Handbrake),
            boost: src.is_active(Control::Boost),
            gear_shift,
            camera_toggle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Control; 8] = [
        Control::ThrottleForward,
        Control::ThrottleBack,
        Control::SteerLeft,
        Control::SteerRight,
        Control::Handbrake,
        Control::Boost,
        Control::GearShift,
        Control::CameraToggle,
    ];

    fn keys(held: &[Control]) -> KeyState {
        let mut k = KeyState::default();
        for c in held {
            k.set(*c, true);
        }
        k
    }

    #[test]
    fn left_steers_positive_right_negative() {
        let mut s = InputSampler::default();
        assert_eq!(s.sample(&keys(&[Control::SteerLeft])).steer, 1.0);
        assert_eq!(s.sample(&keys(&[Control::SteerRight])).steer, -1.0);
        assert_eq!(s.sample(&keys(&[])).steer, 0.0);
    }

    #[test]
    fn conflicting_controls_resolve_to_last_read() {
        let mut s = InputSampler::default();
        let both = keys(&[
            Control::SteerLeft,
            Control::SteerRight,
            Control::ThrottleForward,
            Control::ThrottleBack,
        ]);
        let input = s.sample(&both);
        assert_eq!(input.steer, -1.0);
        assert_eq!(input.throttle, -1.0);
    }

    #[test]
    fn gear_and_camera_fire_once_per_press() {
        let mut s = InputSampler::default();
        let held = keys(&[Control::GearShift, Control::CameraToggle]);

        let first = s.sample(&held);
        assert!(first.gear_shift && first.camera_toggle);

        for _ in 0..5 {
            let again = s.sample(&held);
            assert!(!again.gear_shift && !again.camera_toggle);
        }

        s.sample(&keys(&[]));
        assert!(s.sample(&held).gear_shift);
    }

    #[test]
    fn levels_pass_through() {
        let mut s = InputSampler::default();
        let input = s.sample(&keys(&[Control::Handbrake, Control::Boost, Control::ThrottleForward]));
        assert!(input.handbrake && input.boost);
        assert!(input.boosting());
        assert!(input.accelerating() && !input.braking());
    }

    #[test]
    fn union_holds_what_either_holds() {
        let a = keys(&[Control::ThrottleForward, Control::Boost]);
        let b = keys(&[Control::SteerLeft, Control::Boost]);
        let both = a.union(b);
        for c in ALL {
            let expected = a.is_active(c) || b.is_active(c);
            assert_eq!(both.is_active(c), expected, "{c:?}");
        }
        assert_eq!(KeyState::default().union(KeyState::default()), KeyState::default());
    }

    #[test]
    fn control_names_parse_from_json() {
        let c: Control = serde_json::from_str("\"steer_left\"").unwrap();
        assert_eq!(c, Control::SteerLeft);
        assert!(serde_json::from_str::<Control>("\"fly\"").is_err());
    }
}
