use glam::Mat4;
use rustc_hash::FxHashMap;

use marionette_core::{MarionetteError, Result};

/// A bone as seen by the skinning shader.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// Position in the table, matches the joint id stored in vertex data.
    pub index: usize,
    /// Mesh space to bone space at bind pose.
    pub offset: Mat4,
}

/// Name to stable bone index mapping.
///
/// Indices are handed out in first-seen order starting at 0 and never change.
/// The table only grows.
#[derive(Debug, Clone, Default)]
pub struct BoneTable {
    bones: Vec<Bone>,
    lookup: FxHashMap<String, usize>,
}

impl BoneTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `name`, registering it with `offset` if unseen.
    ///
    /// A name that is already present keeps its original offset; the
    /// `offset` argument is ignored in that case.
    pub fn resolve(&mut self, name: &str, offset: Mat4) -> usize {
        if let Some(&index) = self.lookup.get(name) {
            return index;
        }

        let index = self.bones.len();
        self.bones.push(Bone {
            name: name.to_string(),
            index,
            offset,
        });
        self.lookup.insert(name.to_string(), index);
        index
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Like [`get`](Self::get) but an unknown name is an error.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.get(name)
            .ok_or_else(|| MarionetteError::UnknownBone(name.to_string()))
    }

    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    #[must_use]
    pub fn offset(&self, index: usize) -> Option<Mat4> {
        self.bones.get(index).map(|b| b.offset)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bones in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn resolve_is_idempotent_and_keeps_first_offset() {
        let mut table = BoneTable::new();
        let first = Mat4::from_translation(Vec3::X);
        let a = table.resolve("hips", first);
        let b = table.resolve("spine", Mat4::IDENTITY);
        let again = table.resolve("hips", Mat4::from_translation(Vec3::Y));

        assert_eq!((a, b, again), (0, 1, 0));
        assert_eq!(table.len(), 2);
        assert_eq!(table.offset(0), Some(first));
    }

    #[test]
    fn index_of_unknown_bone_fails() {
        let table = BoneTable::new();
        assert!(matches!(
            table.index_of("tail"),
            Err(MarionetteError::UnknownBone(name)) if name == "tail"
        ));
    }
}
