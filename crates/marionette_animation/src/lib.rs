//! Skeletal animation for instanced skinned characters.
//!
//! Load time builds an immutable [`SkinnedModel`]: node tree, bone table,
//! skin weights and an [`AnimationClip`]. Each frame an [`InstancePool`]
//! advances per-instance clocks, the [`HierarchyWalker`] turns a clock value
//! into one matrix per bone, and a [`TransformExporter`] receives the result.
//! [`Crowd`] runs that loop over several models.

pub mod bake;
pub mod channel;
pub mod clip;
pub mod export;
pub mod hierarchy;
pub mod instance;
pub mod model;
pub mod pool;
pub mod settings;
pub mod skeleton;
pub mod skinning;
pub mod system;
pub mod tracks;
mod values;
pub mod walker;

pub use bake::AnimationBake;
pub use channel::{AnimationChannel, NodeSample};
pub use clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND, wrap_ticks};
pub use export::{CpuTransformBuffer, PlaybackParams, TransformExporter};
pub use hierarchy::{NodeHandle, NodeTree, SkeletonNode};
pub use instance::{DEFAULT_INSTANCE_SPEED, InstanceState, StartFrame};
pub use model::{MeshRange, SkinnedModel};
pub use pool::{InstanceId, InstancePool};
pub use settings::PlaybackSettings;
pub use skeleton::{Bone, BoneTable};
pub use skinning::{DroppedInfluence, MAX_BONES_PER_VERTEX, SkinWeights, VertexBoneData};
pub use system::{Crowd, ModelId};
pub use tracks::{InterpolationMode, KeyframeDefect, KeyframeTrack};
pub use values::Interpolatable;
pub use walker::HierarchyWalker;
