use glam::Mat4;

use marionette_core::Result;

use crate::model::SkinnedModel;
use crate::walker::HierarchyWalker;

/// Bone transforms of a clip pre-computed at every whole tick.
///
/// Stored as one flat `frames x bones` array, frame-major, ready to be
/// uploaded as a single storage buffer and indexed per instance.
#[derive(Debug, Clone)]
pub struct AnimationBake {
    bone_count: usize,
    frame_count: usize,
    transforms: Vec<Mat4>,
}

impl AnimationBake {
    /// Samples the model's clip at ticks `0, 1, .., floor(duration) - 1`.
    /// A clip shorter than one tick still gets the frame at tick 0.
    pub fn bake(model: &SkinnedModel) -> Result<Self> {
        let clip = model.clip()?;
        let bone_count = model.bone_count();
        let frame_count = (clip.duration_ticks().floor() as usize).max(1);

        let mut transforms = vec![Mat4::IDENTITY; frame_count * bone_count];
        if bone_count > 0 {
            for (frame, chunk) in transforms.chunks_exact_mut(bone_count).enumerate() {
                HierarchyWalker::compute_bone_transforms_into(
                    model.tree(),
                    model.bones(),
                    clip,
                    frame as f32,
                    chunk,
                )?;
            }
        }

        log::info!(
            "Baked '{}' of '{}': {} frames x {} bones",
            clip.name,
            model.name,
            frame_count,
            bone_count
        );

        Ok(Self {
            bone_count,
            frame_count,
            transforms,
        })
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&[Mat4]> {
        if index >= self.frame_count {
            return None;
        }
        let start = index * self.bone_count;
        self.transforms.get(start..start + self.bone_count)
    }

    /// Frame holding `current_frame`, rounded down and wrapped.
    #[must_use]
    pub fn frame_at(&self, current_frame: f32) -> &[Mat4] {
        let whole = current_frame.floor().rem_euclid(self.frame_count as f32) as usize;
        self.frame(whole.min(self.frame_count - 1)).unwrap_or(&[])
    }

    #[must_use]
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }
}
