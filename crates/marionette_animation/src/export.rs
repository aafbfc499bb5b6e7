//! GPU upload boundary.
//!
//! The crowd hands its per-frame results to a [`TransformExporter`]; a
//! renderer implements it to copy the data into its own buffers.
//! [`CpuTransformBuffer`] is a plain staging implementation.

use glam::Mat4;

use marionette_core::{ChangeTracker, MutGuard};

/// Scalar playback data of one model's instances, in instance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackParams {
    pub current_frames: Vec<f32>,
    /// `1` while animating, `0` while paused.
    pub animating: Vec<u32>,
    pub speeds: Vec<f32>,
    /// Clip duration in ticks.
    pub max_frame: f32,
}

pub trait TransformExporter {
    /// Called once per model before its instances are exported.
    fn begin_frame(&mut self, _model: usize, _instance_count: usize, _bone_count: usize) {}

    /// Bone transforms of one instance, already transposed.
    fn export_bone_transforms(&mut self, model: usize, instance: usize, transforms: &[Mat4]);

    fn export_playback(&mut self, model: usize, params: &PlaybackParams);
}

#[derive(Debug, Default)]
struct ModelStaging {
    bone_count: usize,
    instance_count: usize,
    transforms: Vec<Mat4>,
    playback: PlaybackParams,
    tracker: ChangeTracker,
}

/// CPU-side staging of everything exported, one region per model.
///
/// Each model carries a version that changes only when its content does, so
/// uploads can be skipped for models that did not move.
#[derive(Debug, Default)]
pub struct CpuTransformBuffer {
    models: Vec<ModelStaging>,
}

impl CpuTransformBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn staging_mut(&mut self, model: usize) -> &mut ModelStaging {
        if model >= self.models.len() {
            self.models.resize_with(model + 1, ModelStaging::default);
        }
        &mut self.models[model]
    }

    /// All instance transforms of `model`, instance-major.
    #[must_use]
    pub fn transforms(&self, model: usize) -> &[Mat4] {
        self.models.get(model).map_or(&[], |m| m.transforms.as_slice())
    }

    #[must_use]
    pub fn instance_transforms(&self, model: usize, instance: usize) -> Option<&[Mat4]> {
        let staging = self.models.get(model)?;
        let start = instance * staging.bone_count;
        staging.transforms.get(start..start + staging.bone_count)
    }

    #[must_use]
    pub fn playback(&self, model: usize) -> Option<&PlaybackParams> {
        self.models.get(model).map(|m| &m.playback)
    }

    #[must_use]
    pub fn version(&self, model: usize) -> u64 {
        self.models.get(model).map_or(0, |m| m.tracker.version())
    }

    #[must_use]
    pub fn instance_count(&self, model: usize) -> usize {
        self.models.get(model).map_or(0, |m| m.instance_count)
    }

    #[must_use]
    pub fn as_bytes(&self, model: usize) -> &[u8] {
        bytemuck::cast_slice(self.transforms(model))
    }
}

impl TransformExporter for CpuTransformBuffer {
    fn begin_frame(&mut self, model: usize, instance_count: usize, bone_count: usize) {
        let staging = self.staging_mut(model);
        let len = instance_count * bone_count;
        if staging.transforms.len() != len || staging.bone_count != bone_count {
            let ModelStaging { transforms, tracker, .. } = staging;
            MutGuard::new(transforms, tracker).resize(len, Mat4::IDENTITY);
        }
        staging.bone_count = bone_count;
        staging.instance_count = instance_count;
    }

    fn export_bone_transforms(&mut self, model: usize, instance: usize, transforms: &[Mat4]) {
        let staging = self.staging_mut(model);
        let start = instance * staging.bone_count;
        let Some(slot) = staging.transforms.get(start..start + transforms.len()) else {
            log::warn!("Instance {instance} of model {model} exported outside its frame layout");
            return;
        };
        if slot != transforms {
            let ModelStaging { transforms: dst, tracker, .. } = staging;
            let mut guard = MutGuard::new(dst, tracker);
            guard[start..start + transforms.len()].copy_from_slice(transforms);
        }
    }

    fn export_playback(&mut self, model: usize, params: &PlaybackParams) {
        let staging = self.staging_mut(model);
        if staging.playback != *params {
            let ModelStaging { playback, tracker, .. } = staging;
            *MutGuard::new(playback, tracker) = params.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn version_moves_only_on_change() {
        let mut buffer = CpuTransformBuffer::new();
        buffer.begin_frame(0, 2, 1);
        let after_resize = buffer.version(0);

        let moved = [Mat4::from_translation(Vec3::X)];
        buffer.export_bone_transforms(0, 1, &moved);
        let after_write = buffer.version(0);
        assert!(after_write > after_resize);

        buffer.begin_frame(0, 2, 1);
        buffer.export_bone_transforms(0, 1, &moved);
        assert_eq!(buffer.version(0), after_write);

        assert_eq!(buffer.instance_transforms(0, 1), Some(&moved[..]));
        assert_eq!(buffer.instance_transforms(0, 0), Some(&[Mat4::IDENTITY][..]));
    }

    #[test]
    fn out_of_layout_export_is_ignored() {
        let mut buffer = CpuTransformBuffer::new();
        buffer.begin_frame(0, 1, 2);
        buffer.export_bone_transforms(0, 3, &[Mat4::IDENTITY; 2]);
        assert_eq!(buffer.transforms(0).len(), 2);
    }
}
