//! glTF 2.0 importer.
//!
//! Reads the default scene's node hierarchy, every skinned primitive (joints
//! become bones named after their node, the inverse bind matrix becomes the
//! bone offset) and every animation. Only skeleton, skin and animation data
//! is extracted; geometry and textures are left to the renderer.

use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use marionette_core::import::{
    ImportedAnimation, ImportedBone, ImportedChannel, ImportedInterpolation, ImportedMaterial,
    ImportedMesh, ImportedNode, ImportedScene, Key, Tangents, VertexWeight,
};
use marionette_core::{MarionetteError, Result};

/// glTF keyframe times are seconds; they are scaled to this many ticks so
/// that whole-tick baking keeps a usable frame rate.
pub const GLTF_TICKS_PER_SECOND: f32 = 30.0;

/// Name of the synthetic root inserted when a scene has several roots.
pub const SYNTHETIC_ROOT_NAME: &str = "__scene_root__";

/// Imports a `.gltf` or `.glb` file.
pub fn load_gltf(path: impl AsRef<Path>) -> Result<ImportedScene> {
    let path = path.as_ref();
    let (document, buffers, _images) = ::gltf::import(path).map_err(gltf_error)?;
    let mut scene = GltfImporter::new(&document, &buffers).import()?;
    if scene.name.is_empty() {
        scene.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(scene)
}

/// Imports a glTF document held in memory. External buffer URIs are not
/// resolved; embedded and data-URI buffers are.
pub fn load_gltf_slice(bytes: &[u8]) -> Result<ImportedScene> {
    let (document, buffers, _images) = ::gltf::import_slice(bytes).map_err(gltf_error)?;
    GltfImporter::new(&document, &buffers).import()
}

fn gltf_error(err: ::gltf::Error) -> MarionetteError {
    MarionetteError::Gltf(err.to_string())
}

fn node_name(node: &::gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

struct GltfImporter<'a> {
    document: &'a ::gltf::Document,
    buffers: &'a [::gltf::buffer::Data],
}

impl<'a> GltfImporter<'a> {
    fn new(document: &'a ::gltf::Document, buffers: &'a [::gltf::buffer::Data]) -> Self {
        Self { document, buffers }
    }

    fn import(&self) -> Result<ImportedScene> {
        let scene = self
            .document
            .default_scene()
            .or_else(|| self.document.scenes().next());

        let (name, root) = match scene {
            Some(scene) => (
                scene.name().unwrap_or_default().to_string(),
                Self::import_roots(&scene),
            ),
            None => (String::new(), None),
        };

        let meshes = self.import_meshes()?;
        let animations = self.import_animations()?;

        log::info!(
            "glTF '{}': {} nodes, {} skinned primitives, {} animations",
            name,
            root.as_ref().map_or(0, ImportedNode::count),
            meshes.len(),
            animations.len()
        );

        Ok(ImportedScene {
            name,
            root,
            meshes,
            animations,
        })
    }

    fn import_roots(scene: &::gltf::Scene) -> Option<ImportedNode> {
        let mut roots: Vec<ImportedNode> = scene.nodes().map(|n| Self::import_node(&n)).collect();
        match roots.len() {
            0 => None,
            1 => roots.pop(),
            _ => {
                let mut root = ImportedNode::new(SYNTHETIC_ROOT_NAME, Mat4::IDENTITY);
                root.children = roots;
                Some(root)
            }
        }
    }

    fn import_node(node: &::gltf::Node) -> ImportedNode {
        let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
        let mut imported = ImportedNode::new(node_name(node), transform);
        imported.children = node.children().map(|c| Self::import_node(&c)).collect();
        imported
    }

    // ========================================================================
    // Skins
    // ========================================================================

    fn import_meshes(&self) -> Result<Vec<ImportedMesh>> {
        let mut meshes = Vec::new();

        for node in self.document.nodes() {
            let Some(mesh) = node.mesh() else {
                continue;
            };
            let skin_bones = match node.skin() {
                Some(skin) => self.skin_bones(&skin),
                None => Vec::new(),
            };

            let mesh_name = mesh.name().map_or_else(|| node_name(&node), str::to_string);
            let primitive_count = mesh.primitives().len();

            for (p, primitive) in mesh.primitives().enumerate() {
                let reader = primitive.reader(|buffer| Some(&self.buffers[buffer.index()]));

                let vertex_count = reader.read_positions().map_or(0, |it| it.len()) as u32;
                let index_count = reader
                    .read_indices()
                    .map_or(vertex_count, |it| it.into_u32().len() as u32);

                let mut bones = skin_bones.clone();
                if let (Some(joints), Some(weights)) = (reader.read_joints(0), reader.read_weights(0)) {
                    for (vertex, (ids, ws)) in joints.into_u16().zip(weights.into_f32()).enumerate() {
                        for (&joint, &weight) in ids.iter().zip(ws.iter()) {
                            if weight <= 0.0 {
                                continue;
                            }
                            let bone = bones.get_mut(joint as usize).ok_or_else(|| {
                                MarionetteError::Gltf(format!(
                                    "mesh '{mesh_name}' references joint {joint} of a {}-joint skin",
                                    skin_bones.len()
                                ))
                            })?;
                            bone.weights.push(VertexWeight {
                                vertex: vertex as u32,
                                weight,
                            });
                        }
                    }
                }

                let base = primitive.material().pbr_metallic_roughness().base_color_factor();
                let material = ImportedMaterial {
                    diffuse: Vec3::new(base[0], base[1], base[2]),
                    // Left unspecified, the Phong defaults fill them in.
                    shininess: -1.0,
                    ..Default::default()
                };

                meshes.push(ImportedMesh {
                    name: if primitive_count == 1 {
                        mesh_name.clone()
                    } else {
                        format!("{mesh_name}#{p}")
                    },
                    vertex_count,
                    index_count,
                    bones,
                    material: Some(material),
                });
            }
        }
        Ok(meshes)
    }

    /// One bone per joint, in joint order, with no weights yet.
    fn skin_bones(&self, skin: &::gltf::Skin) -> Vec<ImportedBone> {
        let reader = skin.reader(|buffer| Some(&self.buffers[buffer.index()]));
        let ibms: Vec<Mat4> = reader
            .read_inverse_bind_matrices()
            .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_default();

        skin.joints()
            .enumerate()
            .map(|(j, joint)| ImportedBone {
                name: node_name(&joint),
                offset: ibms.get(j).copied().unwrap_or(Mat4::IDENTITY),
                weights: Vec::new(),
            })
            .collect()
    }

    // ========================================================================
    // Animations
    // ========================================================================

    fn import_animations(&self) -> Result<Vec<ImportedAnimation>> {
        self.document
            .animations()
            .map(|anim| self.import_animation(&anim))
            .collect()
    }

    fn import_animation(&self, anim: &::gltf::Animation) -> Result<ImportedAnimation> {
        use ::gltf::animation::util::ReadOutputs;
        use ::gltf::animation::{Interpolation, Property};

        let name = anim
            .name()
            .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);

        let mut channels: Vec<ImportedChannel> = Vec::new();
        let mut bind_poses: Vec<([f32; 3], [f32; 4], [f32; 3])> = Vec::new();
        let mut by_node: FxHashMap<usize, usize> = FxHashMap::default();
        let mut end_time = 0.0_f32;

        for channel in anim.channels() {
            let target = channel.target();
            let node = target.node();
            let slot = *by_node.entry(node.index()).or_insert_with(|| {
                channels.push(ImportedChannel {
                    node_name: node_name(&node),
                    ..Default::default()
                });
                bind_poses.push(node.transform().decomposed());
                channels.len() - 1
            });

            let reader = channel.reader(|buffer| Some(&self.buffers[buffer.index()]));
            let Some(inputs) = reader.read_inputs() else {
                continue;
            };
            let times: Vec<f32> = inputs.map(|t| t * GLTF_TICKS_PER_SECOND).collect();
            if let Some(&last) = times.last() {
                end_time = end_time.max(last);
            }

            let interpolation = match channel.sampler().interpolation() {
                Interpolation::Linear => ImportedInterpolation::Linear,
                Interpolation::Step => ImportedInterpolation::Step,
                Interpolation::CubicSpline => ImportedInterpolation::CubicSpline,
            };
            let cubic = interpolation == ImportedInterpolation::CubicSpline;

            let per_tick = |v: Vec3| v / GLTF_TICKS_PER_SECOND;
            let imported = &mut channels[slot];
            match (target.property(), reader.read_outputs()) {
                (Property::Translation, Some(ReadOutputs::Translations(iter))) => {
                    (imported.position_keys, imported.position_tangents) =
                        zip_keys(&times, iter.map(Vec3::from_array), cubic, per_tick)?;
                    imported.position_interpolation = interpolation;
                }
                (Property::Rotation, Some(ReadOutputs::Rotations(iter))) => {
                    (imported.rotation_keys, imported.rotation_tangents) =
                        zip_keys(&times, iter.into_f32().map(Quat::from_array), cubic, |q| {
                            q * (1.0 / GLTF_TICKS_PER_SECOND)
                        })?;
                    imported.rotation_interpolation = interpolation;
                }
                (Property::Scale, Some(ReadOutputs::Scales(iter))) => {
                    (imported.scale_keys, imported.scale_tangents) =
                        zip_keys(&times, iter.map(Vec3::from_array), cubic, per_tick)?;
                    imported.scale_interpolation = interpolation;
                }
                (Property::MorphTargetWeights, _) => {
                    log::debug!("Animation '{name}': skipping morph target weights");
                }
                (property, _) => {
                    return Err(MarionetteError::Gltf(format!(
                        "animation '{name}': {property:?} channel has unreadable outputs"
                    )));
                }
            }
        }

        // A pose-only animation still needs a positive duration.
        let duration_ticks = if end_time > 0.0 { end_time } else { 1.0 };

        for (channel, (t, r, s)) in channels.iter_mut().zip(bind_poses) {
            fill_or_pad(
                &mut channel.position_keys,
                &mut channel.position_tangents,
                Vec3::from_array(t),
                Vec3::ZERO,
                duration_ticks,
            );
            fill_or_pad(
                &mut channel.rotation_keys,
                &mut channel.rotation_tangents,
                Quat::from_array(r),
                Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
                duration_ticks,
            );
            fill_or_pad(
                &mut channel.scale_keys,
                &mut channel.scale_tangents,
                Vec3::from_array(s),
                Vec3::ZERO,
                duration_ticks,
            );
        }

        Ok(ImportedAnimation {
            name,
            duration_ticks,
            ticks_per_second: GLTF_TICKS_PER_SECOND,
            channels,
        })
    }
}

/// Pairs sampler inputs with outputs. Cubic-spline outputs come as
/// (in-tangent, value, out-tangent) triples with tangents per second;
/// `per_tick` rescales them to the tick time base.
fn zip_keys<T: Copy>(
    times: &[f32],
    values: impl Iterator<Item = T>,
    cubic: bool,
    per_tick: impl Fn(T) -> T,
) -> Result<(Vec<Key<T>>, Vec<Tangents<T>>)> {
    let values: Vec<T> = values.collect();
    let stride = if cubic { 3 } else { 1 };

    if values.len() != times.len() * stride {
        return Err(MarionetteError::Gltf(format!(
            "sampler has {} inputs but {} outputs",
            times.len(),
            values.len()
        )));
    }

    if !cubic {
        let keys = times
            .iter()
            .zip(values)
            .map(|(&time, value)| Key::new(time, value))
            .collect();
        return Ok((keys, Vec::new()));
    }

    let mut keys = Vec::with_capacity(times.len());
    let mut tangents = Vec::with_capacity(times.len());
    for (&time, triple) in times.iter().zip(values.chunks_exact(3)) {
        keys.push(Key::new(time, triple[1]));
        tangents.push(Tangents::new(per_tick(triple[0]), per_tick(triple[2])));
    }
    Ok((keys, tangents))
}

/// A property the animation leaves alone holds its bind value. A sequence
/// ending before the clip does is extended with a held key at the end, so
/// every time in `[0, duration)` can be sampled. For cubic sequences the
/// held segment gets flat tangents.
fn fill_or_pad<T: Copy>(
    keys: &mut Vec<Key<T>>,
    tangents: &mut Vec<Tangents<T>>,
    bind: T,
    zero: T,
    duration: f32,
) {
    match keys.last().copied() {
        None => keys.push(Key::new(0.0, bind)),
        Some(last) if keys.len() > 1 && last.time < duration => {
            keys.push(Key::new(duration, last.value));
            if let Some(held) = tangents.last_mut() {
                held.out_tangent = zero;
                tangents.push(Tangents::new(zero, zero));
            }
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_outputs_split_into_values_and_tangents() {
        let times = [0.0, 30.0];
        let outputs = [3.0_f32, 11.0, 6.0, 9.0, 21.0, 12.0];
        let (keys, tangents) = zip_keys(&times, outputs.into_iter(), true, |v| v / 3.0).unwrap();
        assert_eq!(keys, vec![Key::new(0.0, 11.0), Key::new(30.0, 21.0)]);
        assert_eq!(tangents, vec![Tangents::new(1.0, 2.0), Tangents::new(3.0, 4.0)]);
    }

    #[test]
    fn mismatched_sampler_is_an_error() {
        assert!(zip_keys(&[0.0, 1.0], [1.0_f32].into_iter(), false, |v| v).is_err());
        // Cubic samplers need three outputs per input.
        assert!(zip_keys(&[0.0, 1.0], [1.0_f32, 2.0].into_iter(), true, |v| v).is_err());
    }

    #[test]
    fn short_sequences_are_padded() {
        let mut keys = vec![Key::new(0.0, 1.0_f32), Key::new(5.0, 2.0)];
        let mut tangents = Vec::new();
        fill_or_pad(&mut keys, &mut tangents, 0.0, 0.0, 30.0);
        assert_eq!(keys.last(), Some(&Key::new(30.0, 2.0)));
        assert!(tangents.is_empty());

        let mut empty: Vec<Key<f32>> = Vec::new();
        fill_or_pad(&mut empty, &mut tangents, 7.0, 0.0, 30.0);
        assert_eq!(empty, vec![Key::new(0.0, 7.0)]);
    }

    #[test]
    fn padded_cubic_sequence_holds_flat() {
        let mut keys = vec![Key::new(0.0, 1.0_f32), Key::new(5.0, 2.0)];
        let mut tangents = vec![Tangents::new(0.5, 0.5), Tangents::new(0.5, 0.5)];
        fill_or_pad(&mut keys, &mut tangents, 0.0, 0.0, 30.0);
        assert_eq!(keys.len(), 3);
        assert_eq!(tangents, vec![Tangents::new(0.5, 0.5), Tangents::new(0.5, 0.0), Tangents::new(0.0, 0.0)]);
    }
}
