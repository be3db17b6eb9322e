use tokio::time::Instant;

/// Frame clock. Values are untrusted: callers run them through `sanitize_dt`.
pub trait ClockSource {
    fn elapsed_since_last_tick(&mut self) -> f32;
}

/// NaN / negative -> 0, anything above `dt_max` -> `dt_max`.
#[inline]
pub fn sanitize_dt(dt: f32, dt_max: f32) -> f32 {
    if dt.is_nan() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(dt_max)
}

/// Wall clock measured between consecutive reads.
pub struct MonotonicClock {
    last: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }
}

impl ClockSource for MonotonicClock {
    fn elapsed_since_last_tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

/// Constant step.
#[cfg(test)]
pub struct FixedClock(pub f32);

#[cfg(test)]
impl ClockSource for FixedClock {
    fn elapsed_since_last_tick(&mut self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_untrusted_values() {
        assert_eq!(sanitize_dt(f32::NAN, 0.1), 0.0);
        assert_eq!(sanitize_dt(-0.2, 0.1), 0.0);
        assert_eq!(sanitize_dt(5.0, 0.1), 0.1);
        assert_eq!(sanitize_dt(f32::INFINITY, 0.1), 0.1);
        assert_eq!(sanitize_dt(0.016, 0.1), 0.016);
    }

    #[tokio::test]
    async fn monotonic_clock_reports_frame_gap() {
        let mut clock = MonotonicClock::new();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let dt = clock.elapsed_since_last_tick();
        assert!(dt >= 0.019, "dt = {dt}");
        assert!(clock.elapsed_since_last_tick() < dt);
    }

    #[test]
    fn fixed_clock_repeats() {
        let mut clock = FixedClock(0.25);
        assert_eq!(clock.elapsed_since_last_tick(), 0.25);
        assert_eq!(clock.elapsed_since_last_tick(), 0.25);
    }
}
