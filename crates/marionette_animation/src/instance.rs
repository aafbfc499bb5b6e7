use crate::clip::wrap_ticks;

/// Per-instance speed used when none is given.
pub const DEFAULT_INSTANCE_SPEED: f32 = 0.4;

/// Where a new instance starts its clip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StartFrame {
    /// A whole frame drawn uniformly from the clip, so a crowd does not move
    /// in lockstep.
    #[default]
    Random,
    /// A fixed time in ticks, wrapped into the clip.
    At(f32),
}

/// Playback state of a single instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceState {
    pub(crate) current_frame: f32,
    pub(crate) is_animating: bool,
    pub(crate) speed: f32,
}

impl InstanceState {
    #[must_use]
    pub fn current_frame(&self) -> f32 {
        self.current_frame
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Moves the clock by `speed * delta_ticks`, wrapping at `duration`.
    /// Paused instances stay put.
    pub(crate) fn advance(&mut self, delta_ticks: f32, duration: f32) {
        if self.is_animating {
            self.current_frame = wrap_ticks(self.current_frame + self.speed * delta_ticks, duration);
        }
    }
}
