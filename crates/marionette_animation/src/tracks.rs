use marionette_core::import::{ImportedInterpolation, Key, Tangents};
use marionette_core::{MarionetteError, Result};

use crate::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    /// Hold the earlier key until the next one.
    Step,
    /// Hermite spline through the keys, shaped by per-key tangents.
    CubicSpline,
}

impl From<ImportedInterpolation> for InterpolationMode {
    fn from(mode: ImportedInterpolation) -> Self {
        match mode {
            ImportedInterpolation::Linear => Self::Linear,
            ImportedInterpolation::Step => Self::Step,
            ImportedInterpolation::CubicSpline => Self::CubicSpline,
        }
    }
}

/// Why a key list was rejected. Converted into a [`MarionetteError`] once the
/// owning node and property are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyframeDefect {
    Empty,
    /// Index of the first key that is not finite or precedes its predecessor.
    Unordered(usize),
    /// A cubic-spline sequence whose tangent count differs from its key count.
    MissingTangents { keys: usize, tangents: usize },
}

impl KeyframeDefect {
    #[must_use]
    pub fn into_error(self, node: &str, property: &'static str) -> MarionetteError {
        match self {
            Self::Empty => MarionetteError::EmptyKeyframes {
                node: node.to_string(),
                property,
            },
            Self::Unordered(index) => MarionetteError::UnsortedKeyframes {
                node: node.to_string(),
                property,
                index,
            },
            Self::MissingTangents { keys, tangents } => MarionetteError::MissingTangents {
                node: node.to_string(),
                property,
                keys,
                tangents,
            },
        }
    }
}

/// An ordered key sequence for a single property.
///
/// Always holds at least one key and its timestamps never decrease. A
/// cubic-spline track also holds exactly one tangent pair per key.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    tangents: Vec<Tangents<T>>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a `Linear` or `Step` track. Asking for `CubicSpline` here is
    /// reported as missing tangents; use [`from_cubic_keys`](Self::from_cubic_keys).
    pub fn from_keys(
        keys: &[Key<T>],
        interpolation: InterpolationMode,
    ) -> std::result::Result<Self, KeyframeDefect> {
        Self::with_tangents(keys, &[], interpolation)
    }

    pub fn from_cubic_keys(
        keys: &[Key<T>],
        tangents: &[Tangents<T>],
    ) -> std::result::Result<Self, KeyframeDefect> {
        Self::with_tangents(keys, tangents, InterpolationMode::CubicSpline)
    }

    /// `tangents` is only read for `CubicSpline`.
    pub fn with_tangents(
        keys: &[Key<T>],
        tangents: &[Tangents<T>],
        interpolation: InterpolationMode,
    ) -> std::result::Result<Self, KeyframeDefect> {
        if keys.is_empty() {
            return Err(KeyframeDefect::Empty);
        }
        let tangents = if interpolation == InterpolationMode::CubicSpline {
            if tangents.len() != keys.len() {
                return Err(KeyframeDefect::MissingTangents {
                    keys: keys.len(),
                    tangents: tangents.len(),
                });
            }
            tangents.to_vec()
        } else {
            Vec::new()
        };

        let mut times = Vec::with_capacity(keys.len());
        let mut values = Vec::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            if !key.time.is_finite() || times.last().is_some_and(|&prev| key.time < prev) {
                return Err(KeyframeDefect::Unordered(i));
            }
            times.push(key.time);
            values.push(key.value);
        }

        Ok(Self {
            times,
            values,
            tangents,
            interpolation,
        })
    }

    /// A track that holds `value` forever.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            times: vec![0.0],
            values: vec![value],
            tangents: Vec::new(),
            interpolation: InterpolationMode::Step,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Timestamp of the last key.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Samples the track at `time` (in ticks).
    ///
    /// A single-key track returns its key for any time. Otherwise the
    /// interval `[times[i], times[i + 1])` containing `time` is located by
    /// binary search. Times before the first key hold the first key; times
    /// at or past the last key, negative times and NaN are rejected with
    /// [`MarionetteError::TimeOutOfRange`].
    pub fn sample(&self, time: f32) -> Result<T> {
        let len = self.times.len();
        if len == 1 {
            return Ok(self.values[0]);
        }

        let out_of_range = || MarionetteError::TimeOutOfRange {
            time,
            start: 0.0,
            end: self.end_time(),
        };

        if time.is_nan() || time < 0.0 {
            return Err(out_of_range());
        }

        // First index whose time is strictly greater than `time`.
        let next_idx = self.times.partition_point(|&t| t <= time);
        if next_idx >= len {
            return Err(out_of_range());
        }
        if next_idx == 0 {
            return Ok(self.values[0]);
        }

        let index = next_idx - 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];

        match self.interpolation {
            InterpolationMode::Step => Ok(self.values[index]),
            InterpolationMode::Linear => {
                // t0 <= time < t1, so the interval is never empty.
                let factor = (time - t0) / (t1 - t0);
                Ok(T::interpolate_linear(
                    self.values[index],
                    self.values[next_idx],
                    factor,
                ))
            }
            InterpolationMode::CubicSpline => {
                let dt = t1 - t0;
                Ok(T::interpolate_cubic(
                    self.values[index],
                    self.tangents[index].out_tangent,
                    self.tangents[next_idx].in_tangent,
                    self.values[next_idx],
                    (time - t0) / dt,
                    dt,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn track(times: &[f32], mode: InterpolationMode) -> KeyframeTrack<f32> {
        let keys: Vec<_> = times.iter().map(|&t| Key::new(t, t * 2.0)).collect();
        KeyframeTrack::from_keys(&keys, mode).unwrap()
    }

    #[test]
    fn rejects_empty_and_unordered_keys() {
        let empty: [Key<Vec3>; 0] = [];
        assert_eq!(
            KeyframeTrack::from_keys(&empty, InterpolationMode::Linear).unwrap_err(),
            KeyframeDefect::Empty
        );

        let keys = [Key::new(0.0, 1.0_f32), Key::new(2.0, 1.0), Key::new(1.0, 1.0)];
        assert_eq!(
            KeyframeTrack::from_keys(&keys, InterpolationMode::Linear).unwrap_err(),
            KeyframeDefect::Unordered(2)
        );

        let keys = [Key::new(0.0, 1.0_f32), Key::new(f32::NAN, 1.0)];
        assert_eq!(
            KeyframeTrack::from_keys(&keys, InterpolationMode::Linear).unwrap_err(),
            KeyframeDefect::Unordered(1)
        );
    }

    #[test]
    fn picks_smallest_interval_containing_time() {
        let t = track(&[0.0, 1.0, 2.0, 4.0], InterpolationMode::Linear);
        // exactly on a key: interval starts at that key
        assert!((t.sample(1.0).unwrap() - 2.0).abs() < 1e-6);
        assert!((t.sample(3.0).unwrap() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn duplicate_timestamps_do_not_divide_by_zero() {
        let keys = [Key::new(0.0, 0.0_f32), Key::new(1.0, 1.0), Key::new(1.0, 5.0), Key::new(2.0, 7.0)];
        let t = KeyframeTrack::from_keys(&keys, InterpolationMode::Linear).unwrap();
        assert!((t.sample(1.0).unwrap() - 5.0).abs() < 1e-6);
        assert!((t.sample(0.5).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn step_holds_previous_key() {
        let t = track(&[0.0, 10.0, 20.0], InterpolationMode::Step);
        assert!((t.sample(9.9).unwrap() - 0.0).abs() < 1e-6);
        assert!((t.sample(10.0).unwrap() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_times_are_errors() {
        let t = track(&[0.0, 10.0], InterpolationMode::Linear);
        assert!(t.sample(10.0).is_err());
        assert!(t.sample(-0.1).is_err());
        assert!(t.sample(f32::NAN).is_err());
    }

    #[test]
    fn cubic_needs_a_tangent_pair_per_key() {
        let keys = [Key::new(0.0, 0.0_f32), Key::new(1.0, 1.0)];
        assert_eq!(
            KeyframeTrack::from_keys(&keys, InterpolationMode::CubicSpline).unwrap_err(),
            KeyframeDefect::MissingTangents { keys: 2, tangents: 0 }
        );
        let one = [Tangents::new(0.0_f32, 0.0)];
        assert!(KeyframeTrack::from_cubic_keys(&keys, &one).is_err());
    }

    #[test]
    fn cubic_with_zero_tangents_eases_between_keys() {
        let keys = [Key::new(0.0, 0.0_f32), Key::new(10.0, 1.0)];
        let flat = [Tangents::new(0.0, 0.0); 2];
        let t = KeyframeTrack::from_cubic_keys(&keys, &flat).unwrap();
        assert!((t.sample(5.0).unwrap() - 0.5).abs() < 1e-6);
        // smoothstep: 3t^2 - 2t^3 at t = 0.25
        assert!((t.sample(2.5).unwrap() - 0.156_25).abs() < 1e-6);
        assert!(t.sample(0.0).unwrap().abs() < 1e-6);
    }

    #[test]
    fn cubic_tangents_scale_with_interval_length() {
        // Tangent 0.1 units/tick over 10 ticks reproduces the straight line.
        let keys = [Key::new(0.0, 0.0_f32), Key::new(10.0, 1.0)];
        let slope = [Tangents::new(0.1, 0.1); 2];
        let t = KeyframeTrack::from_cubic_keys(&keys, &slope).unwrap();
        for time in [1.0, 3.0, 7.5] {
            assert!((t.sample(time).unwrap() - time / 10.0).abs() < 1e-5);
        }
    }

    #[test]
    fn time_before_first_key_holds_first_key() {
        let t = track(&[2.0, 4.0], InterpolationMode::Linear);
        assert!((t.sample(1.0).unwrap() - 4.0).abs() < 1e-6);
    }
}
