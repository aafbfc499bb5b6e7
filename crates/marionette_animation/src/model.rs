use glam::Mat4;

use marionette_core::import::ImportedScene;
use marionette_core::{MarionetteError, Result};

use crate::clip::AnimationClip;
use crate::hierarchy::NodeTree;
use crate::skeleton::BoneTable;
use crate::skinning::SkinWeights;
use crate::walker::HierarchyWalker;

/// Draw range of one mesh inside the model's shared vertex and index
/// buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRange {
    pub name: String,
    pub base_vertex: u32,
    pub base_index: u32,
    pub index_count: u32,
}

/// Skeleton, skin and (optionally) animation of one character asset.
///
/// Everything here is immutable after loading; playback state lives in an
/// [`InstancePool`](crate::pool::InstancePool).
#[derive(Debug, Clone)]
pub struct SkinnedModel {
    pub name: String,
    tree: NodeTree,
    bones: BoneTable,
    skin: SkinWeights,
    meshes: Vec<MeshRange>,
    clip: Option<AnimationClip>,
}

impl SkinnedModel {
    /// Builds the node tree, bone table, skin weights and mesh ranges of a
    /// scene. Bones are indexed in the order meshes list them.
    ///
    /// No animation is attached; see [`with_animation`](Self::with_animation).
    pub fn from_scene(scene: &ImportedScene) -> Result<Self> {
        let root = scene.root.as_ref().ok_or(MarionetteError::MissingRootNode)?;
        let tree = NodeTree::from_imported(root);

        let vertex_count = scene.vertex_count()?;
        let mut bones = BoneTable::new();
        let mut skin = SkinWeights::new(vertex_count as usize);
        let mut meshes = Vec::with_capacity(scene.meshes.len());

        let mut base_vertex = 0_u32;
        let mut base_index = 0_u32;
        for mesh in &scene.meshes {
            meshes.push(MeshRange {
                name: mesh.name.clone(),
                base_vertex,
                base_index,
                index_count: mesh.index_count,
            });

            for bone in &mesh.bones {
                let bone_index = bones.resolve(&bone.name, bone.offset) as u32;
                for w in &bone.weights {
                    // base_vertex + w.vertex < vertex_count once the local index is in range.
                    let in_mesh = w.vertex < mesh.vertex_count;
                    let vertex = base_vertex.saturating_add(w.vertex);
                    if !in_mesh || !skin.add_influence(vertex, bone_index, w.weight) {
                        return Err(MarionetteError::VertexOutOfRange {
                            bone: bone.name.clone(),
                            vertex,
                            vertex_count,
                        });
                    }
                }
            }

            base_vertex = base_vertex
                .checked_add(mesh.vertex_count)
                .ok_or_else(|| MarionetteError::MeshTooLarge(mesh.name.clone()))?;
            base_index = base_index
                .checked_add(mesh.index_count)
                .ok_or_else(|| MarionetteError::MeshTooLarge(mesh.name.clone()))?;
        }

        let name = if scene.name.is_empty() { root.name.clone() } else { scene.name.clone() };
        skin.report_dropped(&name);

        log::info!(
            "Loaded skinned model '{}': {} nodes, {} bones, {} meshes, {} vertices",
            name,
            tree.len(),
            bones.len(),
            meshes.len(),
            vertex_count
        );

        Ok(Self {
            name,
            tree,
            bones,
            skin,
            meshes,
            clip: None,
        })
    }

    /// Attaches `clip`, replacing any previous one.
    #[must_use]
    pub fn with_animation(mut self, clip: AnimationClip) -> Self {
        self.clip = Some(clip);
        self
    }

    /// Attaches animation `index` of `scene`, which may be a separate
    /// animation-only asset.
    pub fn with_animation_from(
        self,
        scene: &ImportedScene,
        index: usize,
        fallback_ticks_per_second: f32,
    ) -> Result<Self> {
        let animation = scene.animations.get(index).ok_or(
            MarionetteError::AnimationIndexOutOfBounds {
                index,
                count: scene.animations.len(),
            },
        )?;
        let clip = AnimationClip::from_imported(animation, fallback_ticks_per_second)?;
        Ok(self.with_animation(clip))
    }

    pub fn set_animation(&mut self, clip: AnimationClip) {
        self.clip = Some(clip);
    }

    /// The attached clip, or [`MarionetteError::NoAnimation`].
    pub fn clip(&self) -> Result<&AnimationClip> {
        self.clip
            .as_ref()
            .ok_or_else(|| MarionetteError::NoAnimation(self.name.clone()))
    }

    #[must_use]
    pub fn has_animation(&self) -> bool {
        self.clip.is_some()
    }

    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    #[must_use]
    pub fn bones(&self) -> &BoneTable {
        &self.bones
    }

    #[must_use]
    pub fn skin(&self) -> &SkinWeights {
        &self.skin
    }

    #[must_use]
    pub fn meshes(&self) -> &[MeshRange] {
        &self.meshes
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Final bone transforms at `time` ticks, see [`HierarchyWalker`].
    pub fn bone_transforms(&self, time: f32) -> Result<Vec<Mat4>> {
        HierarchyWalker::compute_bone_transforms(&self.tree, &self.bones, self.clip()?, time)
    }

    pub fn bone_transforms_into(&self, time: f32, out: &mut [Mat4]) -> Result<()> {
        HierarchyWalker::compute_bone_transforms_into(&self.tree, &self.bones, self.clip()?, time, out)
    }
}
