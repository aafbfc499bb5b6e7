use rustc_hash::FxHashMap;

use marionette_core::import::ImportedAnimation;
use marionette_core::{MarionetteError, Result};

use crate::channel::AnimationChannel;

/// Tick rate used when an asset leaves it unspecified.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Wraps `time` into `[0, duration)` using the Euclidean remainder, so
/// negative times wrap from the end.
#[must_use]
pub fn wrap_ticks(time: f32, duration: f32) -> f32 {
    let wrapped = time.rem_euclid(duration);
    // Tiny negative inputs can round up to exactly `duration`.
    if wrapped >= duration { 0.0 } else { wrapped }
}

/// A keyframe animation: one channel per animated node, a tick rate and a
/// duration. Immutable once built.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    duration_ticks: f32,
    ticks_per_second: f32,
    channels: Vec<AnimationChannel>,
    channel_lookup: FxHashMap<String, usize>,
}

impl AnimationClip {
    /// Builds a clip. `ticks_per_second` of zero (or any non-positive value)
    /// falls back to [`DEFAULT_TICKS_PER_SECOND`].
    ///
    /// Every track with more than one key must reach `duration_ticks`,
    /// otherwise [`MarionetteError::TrackEndsEarly`] is returned. When two
    /// channels target the same node the first one wins.
    pub fn new(
        name: impl Into<String>,
        duration_ticks: f32,
        ticks_per_second: f32,
        channels: Vec<AnimationChannel>,
    ) -> Result<Self> {
        Self::with_fallback_rate(
            name,
            duration_ticks,
            ticks_per_second,
            DEFAULT_TICKS_PER_SECOND,
            channels,
        )
    }

    fn with_fallback_rate(
        name: impl Into<String>,
        duration_ticks: f32,
        ticks_per_second: f32,
        fallback_ticks_per_second: f32,
        channels: Vec<AnimationChannel>,
    ) -> Result<Self> {
        if !duration_ticks.is_finite() || duration_ticks <= 0.0 {
            return Err(MarionetteError::InvalidDuration(duration_ticks));
        }

        let ticks_per_second = if ticks_per_second.is_finite() && ticks_per_second > 0.0 {
            ticks_per_second
        } else {
            fallback_ticks_per_second
        };

        for channel in &channels {
            for (property, keys, end) in channel.track_extents() {
                if keys > 1 && end < duration_ticks {
                    return Err(MarionetteError::TrackEndsEarly {
                        node: channel.node_name().to_string(),
                        property,
                        end,
                        duration: duration_ticks,
                    });
                }
            }
        }

        let mut channel_lookup =
            FxHashMap::with_capacity_and_hasher(channels.len(), rustc_hash::FxBuildHasher);
        for (i, channel) in channels.iter().enumerate() {
            channel_lookup
                .entry(channel.node_name().to_string())
                .or_insert(i);
        }

        Ok(Self {
            name: name.into(),
            duration_ticks,
            ticks_per_second,
            channels,
            channel_lookup,
        })
    }

    /// Validates every channel of an imported animation.
    pub fn from_imported(
        animation: &ImportedAnimation,
        fallback_ticks_per_second: f32,
    ) -> Result<Self> {
        let channels = animation
            .channels
            .iter()
            .map(AnimationChannel::from_imported)
            .collect::<Result<Vec<_>>>()?;

        let clip = Self::with_fallback_rate(
            animation.name.clone(),
            animation.duration_ticks,
            animation.ticks_per_second,
            fallback_ticks_per_second,
            channels,
        )?;

        log::debug!(
            "Animation '{}': {} channels, {} ticks at {} ticks/s",
            clip.name,
            clip.channels.len(),
            clip.duration_ticks,
            clip.ticks_per_second
        );
        Ok(clip)
    }

    #[must_use]
    pub fn duration_ticks(&self) -> f32 {
        self.duration_ticks
    }

    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration_ticks / self.ticks_per_second
    }

    #[must_use]
    pub fn seconds_to_ticks(&self, seconds: f32) -> f32 {
        seconds * self.ticks_per_second
    }

    /// Channel animating `node_name`, if any. A node without a channel keeps
    /// its bind pose.
    #[must_use]
    pub fn channel(&self, node_name: &str) -> Option<&AnimationChannel> {
        self.channel_lookup
            .get(node_name)
            .map(|&i| &self.channels[i])
    }

    #[must_use]
    pub fn channels(&self) -> &[AnimationChannel] {
        &self.channels
    }

    #[must_use]
    pub fn wrap_time(&self, time: f32) -> f32 {
        wrap_ticks(time, self.duration_ticks)
    }

    /// Checks that `time` lies in `[0, duration)`.
    pub fn check_time(&self, time: f32) -> Result<()> {
        if time >= 0.0 && time < self.duration_ticks {
            Ok(())
        } else {
            Err(MarionetteError::TimeOutOfRange {
                time,
                start: 0.0,
                end: self.duration_ticks,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{InterpolationMode, KeyframeTrack};
    use glam::{Quat, Vec3};
    use marionette_core::import::Key;

    fn static_channel(name: &str, x: f32) -> AnimationChannel {
        AnimationChannel::new(
            name,
            KeyframeTrack::constant(Vec3::new(x, 0.0, 0.0)),
            KeyframeTrack::constant(Quat::IDENTITY),
            KeyframeTrack::constant(Vec3::ONE),
        )
    }

    #[test]
    fn zero_rate_falls_back_to_default() {
        let clip = AnimationClip::new("idle", 50.0, 0.0, vec![]).unwrap();
        assert!((clip.ticks_per_second() - DEFAULT_TICKS_PER_SECOND).abs() < f32::EPSILON);
        assert!((clip.duration_seconds() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        assert!(matches!(
            AnimationClip::new("bad", 0.0, 25.0, vec![]),
            Err(MarionetteError::InvalidDuration(_))
        ));
        assert!(AnimationClip::new("bad", f32::NAN, 25.0, vec![]).is_err());
    }

    #[test]
    fn first_channel_for_a_node_wins() {
        let clip = AnimationClip::new(
            "walk",
            10.0,
            25.0,
            vec![static_channel("hips", 1.0), static_channel("hips", 2.0)],
        )
        .unwrap();
        let sample = clip.channel("hips").unwrap().sample(0.0).unwrap();
        assert!((sample.position.x - 1.0).abs() < f32::EPSILON);
        assert!(clip.channel("head").is_none());
    }

    #[test]
    fn track_ending_before_the_clip_is_rejected() {
        let keys = [Key::new(0.0, Vec3::ZERO), Key::new(5.0, Vec3::X)];
        let short = AnimationChannel::new(
            "hips",
            KeyframeTrack::from_keys(&keys, InterpolationMode::Linear).unwrap(),
            KeyframeTrack::constant(Quat::IDENTITY),
            KeyframeTrack::constant(Vec3::ONE),
        );

        match AnimationClip::new("walk", 10.0, 25.0, vec![short.clone()]) {
            Err(MarionetteError::TrackEndsEarly { node, property, end, duration }) => {
                assert_eq!(node, "hips");
                assert_eq!(property, "position");
                assert!((end - 5.0).abs() < f32::EPSILON);
                assert!((duration - 10.0).abs() < f32::EPSILON);
            }
            other => panic!("expected TrackEndsEarly, got {other:?}"),
        }

        // Same keys, clip no longer than the track.
        let clip = AnimationClip::new("walk", 5.0, 25.0, vec![short]).unwrap();
        assert!(clip.channel("hips").unwrap().sample(clip.wrap_time(7.0)).is_ok());
    }

    #[test]
    fn wrap_stays_in_range() {
        assert!((wrap_ticks(105.0, 100.0) - 5.0).abs() < 1e-4);
        assert!((wrap_ticks(-5.0, 100.0) - 95.0).abs() < 1e-4);
        let tiny = wrap_ticks(-1e-9, 100.0);
        assert!((0.0..100.0).contains(&tiny));
    }
}
