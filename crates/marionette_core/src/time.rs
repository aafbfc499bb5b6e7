use std::time::Duration;

/// Fixed-step frame clock for headless playback.
///
/// Every [`tick`](Self::tick) advances by the same step, so a run of N
/// frames yields the same animation times no matter how long each frame
/// took to compute.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: Duration,
    /// Time since last tick
    pub delta: Duration,
    /// Total simulated time
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl FrameClock {
    #[must_use]
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// A clock stepping `1 / fps` seconds. `None` unless `fps` is positive
    /// and the step is representable.
    #[must_use]
    pub fn from_fps(fps: f32) -> Option<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return None;
        }
        Duration::try_from_secs_f32(1.0 / fps).ok().map(Self::new)
    }

    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn tick(&mut self) {
        self.delta = self.step;
        self.elapsed += self.step;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ticks_accumulate() {
        let mut clock = FrameClock::new(Duration::from_millis(250));
        assert_eq!(clock.delta, Duration::ZERO);
        for _ in 0..4 {
            clock.tick();
        }
        assert_eq!(clock.frame_count, 4);
        assert_eq!(clock.elapsed, Duration::from_secs(1));
        assert!((clock.dt_seconds() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn fps_must_be_positive() {
        assert!(FrameClock::from_fps(0.0).is_none());
        assert!(FrameClock::from_fps(-30.0).is_none());
        assert!(FrameClock::from_fps(f32::NAN).is_none());

        let clock = FrameClock::from_fps(50.0).unwrap();
        assert!((clock.step().as_secs_f32() - 0.02).abs() < 1e-6);
    }
}
