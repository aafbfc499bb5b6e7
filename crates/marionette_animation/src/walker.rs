//! Per-frame bone transform computation.
//!
//! The walker is stateless: every call takes the node tree, the bone table,
//! the clip and a time, and writes one matrix per bone. Several instances can
//! therefore be evaluated independently over the same shared model data.

use glam::Mat4;
use slotmap::SecondaryMap;

use marionette_core::{MarionetteError, Result};

use crate::clip::AnimationClip;
use crate::hierarchy::{NodeHandle, NodeTree, SkeletonNode};
use crate::skeleton::BoneTable;

pub struct HierarchyWalker;

impl HierarchyWalker {
    /// Computes the final transform of every bone at `time` (ticks).
    ///
    /// The result has `bones.len()` entries, indexed by bone index, each
    /// transposed for a row-major consumer. Bones the walk never reaches are
    /// identity.
    pub fn compute_bone_transforms(
        tree: &NodeTree,
        bones: &BoneTable,
        clip: &AnimationClip,
        time: f32,
    ) -> Result<Vec<Mat4>> {
        let mut out = vec![Mat4::IDENTITY; bones.len()];
        Self::compute_bone_transforms_into(tree, bones, clip, time, &mut out)?;
        Ok(out)
    }

    /// Same as [`compute_bone_transforms`](Self::compute_bone_transforms) but
    /// writes into a caller-owned slice of exactly `bones.len()` matrices.
    pub fn compute_bone_transforms_into(
        tree: &NodeTree,
        bones: &BoneTable,
        clip: &AnimationClip,
        time: f32,
        out: &mut [Mat4],
    ) -> Result<()> {
        if out.len() != bones.len() {
            return Err(MarionetteError::BufferSizeMismatch {
                expected: bones.len(),
                actual: out.len(),
            });
        }
        clip.check_time(time)?;

        out.fill(Mat4::IDENTITY);
        let global_inverse = tree.global_inverse();

        Self::walk(tree, Some(clip), time, |_, node, global| {
            if let Some(index) = bones.get(&node.name) {
                let offset = bones.offset(index).unwrap_or(Mat4::IDENTITY);
                out[index] = (global_inverse * global * offset).transpose();
            }
        })
    }

    /// Global transform of every node, with `clip` applied when given.
    /// Useful for debug drawing and bounds; not transposed.
    pub fn compute_global_transforms(
        tree: &NodeTree,
        clip: Option<&AnimationClip>,
        time: f32,
    ) -> Result<SecondaryMap<NodeHandle, Mat4>> {
        if let Some(clip) = clip {
            clip.check_time(time)?;
        }

        let mut globals = SecondaryMap::with_capacity(tree.len());
        Self::walk(tree, clip, time, |handle, _, global| {
            globals.insert(handle, global);
        })?;
        Ok(globals)
    }

    /// Depth-first, parent before child, siblings in order. `visit` receives
    /// every node with its global transform.
    fn walk(
        tree: &NodeTree,
        clip: Option<&AnimationClip>,
        time: f32,
        mut visit: impl FnMut(NodeHandle, &SkeletonNode, Mat4),
    ) -> Result<()> {
        // Work stack: (node, parent global transform)
        let mut stack: Vec<(NodeHandle, Mat4)> = Vec::with_capacity(64);
        stack.push((tree.root(), Mat4::IDENTITY));

        while let Some((handle, parent_global)) = stack.pop() {
            let Some(node) = tree.get(handle) else {
                continue;
            };

            let local = match clip.and_then(|c| c.channel(&node.name)) {
                Some(channel) => channel.sample(time)?.to_matrix(),
                None => node.local_transform,
            };
            let global = parent_global * local;

            visit(handle, node, global);

            // Reverse push keeps sibling order on pop.
            for &child in node.children().iter().rev() {
                stack.push((child, global));
            }
        }
        Ok(())
    }
}
