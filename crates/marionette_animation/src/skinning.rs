use bytemuck::{Pod, Zeroable};

/// Maximum number of bones that can influence a single vertex.
pub const MAX_BONES_PER_VERTEX: usize = 4;

/// Per-vertex bone influences in the layout the skinning shader reads.
///
/// A slot with weight `0.0` is empty; slots are filled in arrival order.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexBoneData {
    pub ids: [u32; MAX_BONES_PER_VERTEX],
    pub weights: [f32; MAX_BONES_PER_VERTEX],
}

impl VertexBoneData {
    /// Stores the influence in the first free slot. Returns `false` when all
    /// slots are taken.
    pub fn add(&mut self, bone: u32, weight: f32) -> bool {
        match self.weights.iter().position(|&w| w == 0.0) {
            Some(slot) => {
                self.ids[slot] = bone;
                self.weights[slot] = weight;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn influence_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w != 0.0).count()
    }

    #[must_use]
    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// An influence that did not fit into a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroppedInfluence {
    pub vertex: u32,
    pub bone: u32,
    pub weight: f32,
}

/// Bone influences of every vertex of a model, numbered globally across
/// meshes.
#[derive(Debug, Clone, Default)]
pub struct SkinWeights {
    vertices: Vec<VertexBoneData>,
    dropped: Vec<DroppedInfluence>,
}

impl SkinWeights {
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertices: vec![VertexBoneData::default(); vertex_count],
            dropped: Vec::new(),
        }
    }

    /// Records that `bone` moves `vertex` with `weight`.
    ///
    /// Non-positive weights carry no influence and are skipped. A fifth
    /// influence on the same vertex is kept in [`dropped`](Self::dropped).
    /// Returns `false` if `vertex` is outside the model.
    pub fn add_influence(&mut self, vertex: u32, bone: u32, weight: f32) -> bool {
        let Some(data) = self.vertices.get_mut(vertex as usize) else {
            return false;
        };
        if weight.is_nan() || weight <= 0.0 {
            return true;
        }
        if !data.add(bone, weight) {
            self.dropped.push(DroppedInfluence {
                vertex,
                bone,
                weight,
            });
        }
        true
    }

    #[must_use]
    pub fn vertices(&self) -> &[VertexBoneData] {
        &self.vertices
    }

    #[must_use]
    pub fn dropped(&self) -> &[DroppedInfluence] {
        &self.dropped
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Logs a summary of dropped influences, if any.
    pub fn report_dropped(&self, model_name: &str) {
        if let Some(first) = self.dropped.first() {
            log::warn!(
                "Model '{}': {} bone influences exceed {} per vertex and were dropped (first: vertex {}, bone {}, weight {})",
                model_name,
                self.dropped.len(),
                MAX_BONES_PER_VERTEX,
                first.vertex,
                first.bone,
                first.weight
            );
        }
    }
}
