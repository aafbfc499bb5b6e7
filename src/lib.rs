//! Marionette: skeletal animation for crowds of skinned characters.
//!
//! This crate re-exports the workspace crates under one roof:
//!
//! - [`common`]: errors, import boundary types, change tracking, timer
//! - [`animation`]: bone table, node tree, clips, walker, instance pools, crowd
//! - [`assets`]: glTF import, placement tracks, material defaults
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use marionette::prelude::*;
//!
//! let settings = PlaybackSettings::default();
//! let model = marionette::assets::loaders::load_gltf_model("soldier.glb", &settings)?;
//!
//! let mut crowd = Crowd::new(settings);
//! let id = crowd.add_model(Arc::new(model))?;
//! for _ in 0..100 {
//!     crowd.register_instance(id, None, StartFrame::Random)?;
//! }
//!
//! let mut staging = CpuTransformBuffer::new();
//! crowd.update(1.0, &mut staging)?;
//! ```

pub use marionette_animation as animation;
pub use marionette_assets as assets;
pub use marionette_core as common;

pub use marionette_animation::{
    AnimationBake, AnimationChannel, AnimationClip, Bone, BoneTable, CpuTransformBuffer, Crowd,
    HierarchyWalker, InstanceId, InstancePool, InstanceState, InterpolationMode, KeyframeTrack,
    NodeTree, PlaybackParams, PlaybackSettings, SkinWeights, SkinnedModel, StartFrame,
    TransformExporter, VertexBoneData,
};
pub use marionette_assets::{PhongMaterial, PlacementTrack};
pub use marionette_core::{FrameClock, MarionetteError, Result};

pub mod prelude {
    pub use marionette_animation::{
        AnimationClip, BoneTable, CpuTransformBuffer, Crowd, HierarchyWalker, InstancePool,
        NodeTree, PlaybackSettings, SkinnedModel, StartFrame, TransformExporter,
    };
    pub use marionette_core::import::ImportedScene;
    pub use marionette_core::{MarionetteError, Result};
}
