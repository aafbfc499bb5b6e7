//! Bind-pose node hierarchy.
//!
//! Nodes live in a [`SlotMap`] arena and refer to each other by handle, so
//! the tree can be walked without recursion or shared ownership.

use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use marionette_core::import::ImportedNode;
use marionette_core::{MarionetteError, Result};

new_key_type! {
    pub struct NodeHandle;
}

#[derive(Debug, Clone)]
pub struct SkeletonNode {
    pub name: String,
    /// Bind-pose transform relative to the parent.
    pub local_transform: Mat4,
    parent: Option<NodeHandle>,
    children: SmallVec<[NodeHandle; 4]>,
}

impl SkeletonNode {
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}

/// A node tree with exactly one root.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: SlotMap<NodeHandle, SkeletonNode>,
    root: NodeHandle,
    global_inverse: Mat4,
    name_lookup: FxHashMap<String, NodeHandle>,
}

impl NodeTree {
    /// Creates a tree holding only its root. The global inverse transform is
    /// the inverse of the root's local transform and is fixed from here on.
    #[must_use]
    pub fn new(root_name: impl Into<String>, root_transform: Mat4) -> Self {
        let root_name = root_name.into();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SkeletonNode {
            name: root_name.clone(),
            local_transform: root_transform,
            parent: None,
            children: SmallVec::new(),
        });

        let mut name_lookup = FxHashMap::default();
        name_lookup.insert(root_name, root);

        Self {
            nodes,
            root,
            global_inverse: root_transform.inverse(),
            name_lookup,
        }
    }

    /// Appends a child under `parent`. Siblings keep insertion order.
    pub fn add_child(
        &mut self,
        parent: NodeHandle,
        name: impl Into<String>,
        local_transform: Mat4,
    ) -> Result<NodeHandle> {
        let name = name.into();
        if !self.nodes.contains_key(parent) {
            return Err(MarionetteError::UnknownParentNode(name));
        }
        Ok(self.attach(parent, name, local_transform))
    }

    /// Copies an imported hierarchy, preserving child order.
    #[must_use]
    pub fn from_imported(root: &ImportedNode) -> Self {
        let mut tree = Self::new(root.name.clone(), root.transform);

        let mut stack: Vec<(&ImportedNode, NodeHandle)> = Vec::with_capacity(64);
        stack.push((root, tree.root));

        while let Some((imported, handle)) = stack.pop() {
            for child in &imported.children {
                let child_handle = tree.attach(handle, child.name.clone(), child.transform);
                stack.push((child, child_handle));
            }
        }
        tree
    }

    // `parent` must already be in the arena.
    fn attach(&mut self, parent: NodeHandle, name: String, local_transform: Mat4) -> NodeHandle {
        let handle = self.nodes.insert(SkeletonNode {
            name: name.clone(),
            local_transform,
            parent: Some(parent),
            children: SmallVec::new(),
        });
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(handle);
        }
        // Duplicate names resolve to the first node carrying them.
        self.name_lookup.entry(name).or_insert(handle);
        handle
    }

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[must_use]
    pub fn global_inverse(&self) -> Mat4 {
        self.global_inverse
    }

    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&SkeletonNode> {
        self.nodes.get(handle)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.name_lookup.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &SkeletonNode)> {
        self.nodes.iter()
    }
}
