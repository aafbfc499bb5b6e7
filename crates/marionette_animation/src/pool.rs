//! Instance playback state.
//!
//! An [`InstancePool`] owns the playback state of every instance of one
//! model. All mutation goes through the pool; instances are kept in
//! registration order, which is also the order used for export.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use marionette_core::{MarionetteError, Result};

use crate::clip::wrap_ticks;
use crate::export::PlaybackParams;
use crate::instance::{InstanceState, StartFrame};

/// Stable handle of an instance. Ids are never reused within a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct InstancePool {
    duration_ticks: f32,
    // Sorted by id, since ids only grow.
    instances: Vec<(InstanceId, InstanceState)>,
    next_id: u32,
    rng: StdRng,
}

impl InstancePool {
    /// A pool for a clip of `duration_ticks`, seeded from entropy.
    pub fn new(duration_ticks: f32) -> Result<Self> {
        Self::with_rng(duration_ticks, StdRng::from_entropy())
    }

    /// A pool whose random start frames are reproducible.
    pub fn with_seed(duration_ticks: f32, seed: u64) -> Result<Self> {
        Self::with_rng(duration_ticks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(duration_ticks: f32, rng: StdRng) -> Result<Self> {
        if !duration_ticks.is_finite() || duration_ticks <= 0.0 {
            return Err(MarionetteError::InvalidDuration(duration_ticks));
        }
        Ok(Self {
            duration_ticks,
            instances: Vec::new(),
            next_id: 0,
            rng,
        })
    }

    #[must_use]
    pub fn duration_ticks(&self) -> f32 {
        self.duration_ticks
    }

    /// Adds an instance that starts out animating.
    pub fn register_instance(&mut self, speed: f32, start: StartFrame) -> InstanceId {
        let current_frame = match start {
            StartFrame::Random => {
                let whole_frames = self.duration_ticks.floor() as u32;
                if whole_frames == 0 {
                    0.0
                } else {
                    self.rng.gen_range(0..whole_frames) as f32
                }
            }
            StartFrame::At(time) => wrap_ticks(time, self.duration_ticks),
        };

        let id = InstanceId(self.next_id);
        self.next_id += 1;
        self.instances.push((
            id,
            InstanceState {
                current_frame,
                is_animating: true,
                speed,
            },
        ));
        id
    }

    pub fn remove_instance(&mut self, id: InstanceId) -> Result<InstanceState> {
        let slot = self.slot(id)?;
        Ok(self.instances.remove(slot).1)
    }

    /// Advances every animating instance by `speed * delta_ticks`, wrapping
    /// modulo the clip duration.
    pub fn advance(&mut self, delta_ticks: f32) {
        let duration = self.duration_ticks;
        for (_, state) in &mut self.instances {
            state.advance(delta_ticks, duration);
        }
    }

    /// Flips the play/pause flag of every instance.
    pub fn toggle_animating(&mut self) {
        for (_, state) in &mut self.instances {
            state.is_animating = !state.is_animating;
        }
    }

    pub fn set_speed(&mut self, id: InstanceId, speed: f32) -> Result<()> {
        let slot = self.slot(id)?;
        self.instances[slot].1.speed = speed;
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&InstanceState> {
        self.slot(id).ok().map(|slot| &self.instances[slot].1)
    }

    /// Instances in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &InstanceState)> {
        self.instances.iter().map(|(id, state)| (*id, state))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Scalar playback data in registration order.
    #[must_use]
    pub fn playback_params(&self) -> PlaybackParams {
        let mut params = PlaybackParams {
            current_frames: Vec::with_capacity(self.len()),
            animating: Vec::with_capacity(self.len()),
            speeds: Vec::with_capacity(self.len()),
            max_frame: self.duration_ticks,
        };
        for (_, state) in &self.instances {
            params.current_frames.push(state.current_frame);
            params.animating.push(u32::from(state.is_animating));
            params.speeds.push(state.speed);
        }
        params
    }

    fn slot(&self, id: InstanceId) -> Result<usize> {
        self.instances
            .binary_search_by_key(&id, |(id, _)| *id)
            .map_err(|_| MarionetteError::UnknownInstance(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_start_is_a_whole_frame_inside_the_clip() {
        let mut pool = InstancePool::with_seed(100.0, 7).unwrap();
        for _ in 0..200 {
            let id = pool.register_instance(1.0, StartFrame::Random);
            let frame = pool.get(id).unwrap().current_frame();
            assert!((0.0..100.0).contains(&frame));
            assert!((frame - frame.floor()).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn same_seed_same_start_frames() {
        let mut a = InstancePool::with_seed(60.0, 42).unwrap();
        let mut b = InstancePool::with_seed(60.0, 42).unwrap();
        for _ in 0..10 {
            let ia = a.register_instance(1.0, StartFrame::Random);
            let ib = b.register_instance(1.0, StartFrame::Random);
            assert_eq!(a.get(ia), b.get(ib));
        }
    }

    #[test]
    fn removed_ids_stay_unknown() {
        let mut pool = InstancePool::with_seed(10.0, 0).unwrap();
        let first = pool.register_instance(1.0, StartFrame::At(0.0));
        let second = pool.register_instance(2.0, StartFrame::At(1.0));

        pool.remove_instance(first).unwrap();
        assert!(pool.get(first).is_none());
        assert!(matches!(pool.remove_instance(first), Err(MarionetteError::UnknownInstance(_))));
        assert!(pool.set_speed(first, 1.0).is_err());

        let third = pool.register_instance(1.0, StartFrame::At(0.0));
        assert_ne!(third, first);
        let order: Vec<_> = pool.iter().map(|(id, _)| id).collect();
        assert_eq!(order, [second, third]);
    }

    #[test]
    fn negative_speed_wraps_backwards() {
        let mut pool = InstancePool::with_seed(100.0, 0).unwrap();
        let id = pool.register_instance(-1.0, StartFrame::At(2.0));
        pool.advance(5.0);
        assert!((pool.get(id).unwrap().current_frame() - 97.0).abs() < 1e-4);
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(InstancePool::with_seed(0.0, 0).is_err());
    }

    #[test]
    fn playback_params_follow_registration_order() {
        let mut pool = InstancePool::with_seed(30.0, 0).unwrap();
        pool.register_instance(0.5, StartFrame::At(3.0));
        pool.register_instance(2.0, StartFrame::At(4.0));
        pool.toggle_animating();

        let params = pool.playback_params();
        assert_eq!(params.current_frames, [3.0, 4.0]);
        assert_eq!(params.animating, [0, 0]);
        assert_eq!(params.speeds, [0.5, 2.0]);
        assert!((params.max_frame - 30.0).abs() < f32::EPSILON);
    }
}
