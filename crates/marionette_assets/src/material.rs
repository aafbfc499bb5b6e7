use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use marionette_core::import::ImportedMaterial;

pub const DEFAULT_AMBIENT: f32 = 0.2;
pub const DEFAULT_DIFFUSE: f32 = 1.0;
pub const DEFAULT_SPECULAR: f32 = 0.3;
pub const DEFAULT_SHININESS: f32 = 1.0;

/// Phong surface parameters, with fallbacks applied.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PhongMaterial {
    pub ambient: Vec3,
    pub shininess: f32,
    pub diffuse: Vec3,
    _pad0: f32,
    pub specular: Vec3,
    _pad1: f32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self::new(
            Vec3::splat(DEFAULT_AMBIENT),
            Vec3::splat(DEFAULT_DIFFUSE),
            Vec3::splat(DEFAULT_SPECULAR),
            DEFAULT_SHININESS,
        )
    }
}

impl PhongMaterial {
    #[must_use]
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) -> Self {
        Self {
            ambient,
            shininess,
            diffuse,
            _pad0: 0.0,
            specular,
            _pad1: 0.0,
        }
    }

    /// Colours of zero length fall back to grey defaults, a negative
    /// shininess falls back to 1.0. A mesh without material gets all
    /// defaults.
    #[must_use]
    pub fn from_imported(imported: Option<&ImportedMaterial>) -> Self {
        let Some(m) = imported else {
            return Self::default();
        };

        let or_grey = |colour: Vec3, grey: f32| {
            if colour.length_squared() == 0.0 { Vec3::splat(grey) } else { colour }
        };

        Self::new(
            or_grey(m.ambient, DEFAULT_AMBIENT),
            or_grey(m.diffuse, DEFAULT_DIFFUSE),
            or_grey(m.specular, DEFAULT_SPECULAR),
            if m.shininess < 0.0 { DEFAULT_SHININESS } else { m.shininess },
        )
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
