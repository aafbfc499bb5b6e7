//! Playback configuration.
//!
//! ```rust,ignore
//! use marionette::PlaybackSettings;
//!
//! // Reproducible crowd: every run picks the same start frames.
//! let settings = PlaybackSettings {
//!     rng_seed: Some(7),
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::clip::DEFAULT_TICKS_PER_SECOND;
use crate::instance::DEFAULT_INSTANCE_SPEED;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Speed given to instances registered without one.
    pub default_speed: f32,
    /// Tick rate for clips whose asset leaves it at zero.
    pub fallback_ticks_per_second: f32,
    /// Seed for random start frames. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_INSTANCE_SPEED,
            fallback_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            rng_seed: None,
        }
    }
}
