//! Per-instance, per-frame model matrices read from a text file.
//!
//! The file is a flat list of whitespace separated floats. Every 16 floats
//! form one column-major 4x4 matrix; matrices are stored frame by frame,
//! each frame holding one matrix per instance.

use std::path::Path;

use glam::Mat4;

use marionette_core::{MarionetteError, Result};

#[derive(Debug, Clone)]
pub struct PlacementTrack {
    instance_count: usize,
    frame_count: usize,
    // Frame-major: frame * instance_count + instance
    matrices: Vec<Mat4>,
}

impl PlacementTrack {
    pub fn parse(text: &str, instance_count: usize) -> Result<Self> {
        if instance_count == 0 {
            return Err(MarionetteError::PlacementParse(
                "instance count must be positive".to_string(),
            ));
        }

        let floats = text
            .split_whitespace()
            .enumerate()
            .map(|(i, token)| {
                token.parse::<f32>().map_err(|e| {
                    MarionetteError::PlacementParse(format!("value {i} ('{token}'): {e}"))
                })
            })
            .collect::<Result<Vec<f32>>>()?;

        let per_frame = 16 * instance_count;
        if floats.is_empty() {
            return Err(MarionetteError::PlacementParse("no matrices".to_string()));
        }
        if floats.len() % per_frame != 0 {
            return Err(MarionetteError::PlacementParse(format!(
                "{} values do not form whole frames of {instance_count} matrices",
                floats.len()
            )));
        }

        let matrices: Vec<Mat4> = floats
            .chunks_exact(16)
            .map(Mat4::from_cols_slice)
            .collect();
        let frame_count = floats.len() / per_frame;

        log::debug!("Placement track: {instance_count} instances x {frame_count} frames");

        Ok(Self {
            instance_count,
            frame_count,
            matrices,
        })
    }

    pub fn from_file(path: impl AsRef<Path>, instance_count: usize) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, instance_count)
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[must_use]
    pub fn matrix(&self, instance: usize, frame: usize) -> Option<Mat4> {
        if instance >= self.instance_count || frame >= self.frame_count {
            return None;
        }
        self.matrices.get(frame * self.instance_count + instance).copied()
    }

    /// Matrices of every instance at `frame`.
    #[must_use]
    pub fn frame(&self, frame: usize) -> Option<&[Mat4]> {
        let start = frame.checked_mul(self.instance_count)?;
        self.matrices.get(start..start + self.instance_count)
    }

    /// Frame for a playback position, rounded down and looped.
    #[must_use]
    pub fn frame_at(&self, position: f32) -> &[Mat4] {
        let whole = position.floor().rem_euclid(self.frame_count as f32) as usize;
        self.frame(whole.min(self.frame_count - 1)).unwrap_or(&[])
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }
}
