use glam::{Mat4, Quat, Vec3};
use marionette_core::Result;
use marionette_core::import::ImportedChannel;

use crate::tracks::{InterpolationMode, KeyframeTrack};

/// Decomposed local transform of one node at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSample {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeSample {
    /// `T(position) * R(rotation) * S(scale)`.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Keyframes bound to a single node. The three property tracks are
/// independent: each has its own timestamps and interpolation mode.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    node_name: String,
    pub position: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl AnimationChannel {
    #[must_use]
    pub fn new(
        node_name: impl Into<String>,
        position: KeyframeTrack<Vec3>,
        rotation: KeyframeTrack<Quat>,
        scale: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            node_name: node_name.into(),
            position,
            rotation,
            scale,
        }
    }

    /// Validates and converts an imported channel. Empty or unordered key
    /// lists, and cubic sequences without tangents, are reported as
    /// malformed-asset errors naming the node.
    pub fn from_imported(channel: &ImportedChannel) -> Result<Self> {
        let node = channel.node_name.as_str();

        let position = KeyframeTrack::with_tangents(
            &channel.position_keys,
            &channel.position_tangents,
            InterpolationMode::from(channel.position_interpolation),
        )
        .map_err(|defect| defect.into_error(node, "position"))?;

        let rotation = KeyframeTrack::with_tangents(
            &channel.rotation_keys,
            &channel.rotation_tangents,
            InterpolationMode::from(channel.rotation_interpolation),
        )
        .map_err(|defect| defect.into_error(node, "rotation"))?;

        let scale = KeyframeTrack::with_tangents(
            &channel.scale_keys,
            &channel.scale_tangents,
            InterpolationMode::from(channel.scale_interpolation),
        )
        .map_err(|defect| defect.into_error(node, "scale"))?;

        Ok(Self::new(node, position, rotation, scale))
    }

    #[must_use]
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Property name, key count and last key time of each track.
    pub(crate) fn track_extents(&self) -> [(&'static str, usize, f32); 3] {
        [
            ("position", self.position.len(), self.position.end_time()),
            ("rotation", self.rotation.len(), self.rotation.end_time()),
            ("scale", self.scale.len(), self.scale.end_time()),
        ]
    }

    /// Latest key time over all three tracks.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.position
            .end_time()
            .max(self.rotation.end_time())
            .max(self.scale.end_time())
    }

    pub fn sample(&self, time: f32) -> Result<NodeSample> {
        Ok(NodeSample {
            position: self.position.sample(time)?,
            rotation: self.rotation.sample(time)?,
            scale: self.scale.sample(time)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marionette_core::MarionetteError;
    use marionette_core::import::Key;

    #[test]
    fn missing_scale_keys_name_the_node() {
        let imported = ImportedChannel {
            node_name: "spine".into(),
            position_keys: vec![Key::new(0.0, Vec3::ZERO)],
            rotation_keys: vec![Key::new(0.0, Quat::IDENTITY)],
            ..Default::default()
        };

        match AnimationChannel::from_imported(&imported) {
            Err(MarionetteError::EmptyKeyframes { node, property }) => {
                assert_eq!(node, "spine");
                assert_eq!(property, "scale");
            }
            other => panic!("expected EmptyKeyframes, got {other:?}"),
        }
    }

    #[test]
    fn sample_composes_translate_rotate_scale() {
        let channel = AnimationChannel::new(
            "arm",
            KeyframeTrack::constant(Vec3::new(1.0, 0.0, 0.0)),
            KeyframeTrack::constant(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
            KeyframeTrack::constant(Vec3::splat(2.0)),
        );

        let m = channel.sample(3.0).unwrap().to_matrix();
        // Scale first, then rotate +X onto +Y, then translate.
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }
}
