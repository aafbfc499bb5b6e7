//! Asset import boundary.
//!
//! Plain data handed over by an external asset loader. Nothing here parses a
//! file format; loaders (see `marionette_assets`) fill these structures and
//! the animation crate builds its runtime types from them.

use glam::{Mat4, Quat, Vec3};

use crate::errors::{MarionetteError, Result};

/// One node of the imported scene graph.
#[derive(Debug, Clone)]
pub struct ImportedNode {
    pub name: String,
    /// Local bind-pose transform relative to the parent.
    pub transform: Mat4,
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    /// Builder helper that appends a child and returns `self`.
    #[must_use]
    pub fn with_child(mut self, child: ImportedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ImportedNode::count).sum::<usize>()
    }
}

/// A single vertex influence as reported by the loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    /// Vertex index local to the owning mesh.
    pub vertex: u32,
    pub weight: f32,
}

/// A bone referenced by a mesh.
#[derive(Debug, Clone)]
pub struct ImportedBone {
    pub name: String,
    /// Mesh space to bone space at bind pose.
    pub offset: Mat4,
    pub weights: Vec<VertexWeight>,
}

/// Surface colours as the loader found them, before defaults are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImportedMaterial {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ImportedMesh {
    pub name: String,
    pub vertex_count: u32,
    pub index_count: u32,
    pub bones: Vec<ImportedBone>,
    pub material: Option<ImportedMaterial>,
}

/// How a key sequence should be interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportedInterpolation {
    #[default]
    Linear,
    Step,
    /// Hermite spline; the channel carries one [`Tangents`] pair per key.
    CubicSpline,
}

/// A timestamped value. Time is in clip ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Key<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// In and out tangents of one cubic-spline key, in value units per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tangents<T> {
    pub in_tangent: T,
    pub out_tangent: T,
}

impl<T> Tangents<T> {
    pub fn new(in_tangent: T, out_tangent: T) -> Self {
        Self {
            in_tangent,
            out_tangent,
        }
    }
}

/// Keyframes of one animated node. Tangent lists stay empty unless the
/// matching interpolation is [`ImportedInterpolation::CubicSpline`].
#[derive(Debug, Clone, Default)]
pub struct ImportedChannel {
    pub node_name: String,
    pub position_keys: Vec<Key<Vec3>>,
    pub rotation_keys: Vec<Key<Quat>>,
    pub scale_keys: Vec<Key<Vec3>>,
    pub position_interpolation: ImportedInterpolation,
    pub rotation_interpolation: ImportedInterpolation,
    pub scale_interpolation: ImportedInterpolation,
    pub position_tangents: Vec<Tangents<Vec3>>,
    pub rotation_tangents: Vec<Tangents<Quat>>,
    pub scale_tangents: Vec<Tangents<Vec3>>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportedAnimation {
    pub name: String,
    pub duration_ticks: f32,
    /// Zero means "unspecified"; the clip substitutes a fallback rate.
    pub ticks_per_second: f32,
    pub channels: Vec<ImportedChannel>,
}

/// Everything a loader extracted from one asset.
#[derive(Debug, Clone, Default)]
pub struct ImportedScene {
    pub name: String,
    pub root: Option<ImportedNode>,
    pub meshes: Vec<ImportedMesh>,
    pub animations: Vec<ImportedAnimation>,
}

impl ImportedScene {
    /// Number of vertices over all meshes, or [`MarionetteError::MeshTooLarge`]
    /// naming the first mesh that pushes the total past `u32::MAX`.
    pub fn vertex_count(&self) -> Result<u32> {
        self.meshes.iter().try_fold(0_u32, |total, mesh| {
            total
                .checked_add(mesh.vertex_count)
                .ok_or_else(|| MarionetteError::MeshTooLarge(mesh.name.clone()))
        })
    }
}
