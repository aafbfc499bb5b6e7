use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Mat4, Quat, Vec3};

use marionette::common::import::{ImportedAnimation, ImportedBone, ImportedChannel, ImportedMesh, ImportedNode, ImportedScene, Key};
use marionette::{CpuTransformBuffer, Crowd, PlaybackSettings, SkinnedModel, StartFrame};

/// A single chain of `depth` bones, every one of them animated.
fn chain_model(depth: usize) -> SkinnedModel {
    let mut node = ImportedNode::new(format!("bone{}", depth - 1), Mat4::from_translation(Vec3::Y));
    for i in (0..depth - 1).rev() {
        node = ImportedNode::new(format!("bone{i}"), Mat4::from_translation(Vec3::Y)).with_child(node);
    }
    let root = ImportedNode::new("root", Mat4::IDENTITY).with_child(node);

    let bones = (0..depth)
        .map(|i| ImportedBone {
            name: format!("bone{i}"),
            offset: Mat4::from_translation(Vec3::new(0.0, -(i as f32 + 1.0), 0.0)),
            weights: Vec::new(),
        })
        .collect();

    let channels = (0..depth)
        .map(|i| ImportedChannel {
            node_name: format!("bone{i}"),
            position_keys: (0..=30).map(|k| Key::new(k as f32, Vec3::Y)).collect(),
            rotation_keys: (0..=30)
                .map(|k| Key::new(k as f32, Quat::from_rotation_z(k as f32 * 0.05)))
                .collect(),
            scale_keys: vec![Key::new(0.0, Vec3::ONE)],
            ..Default::default()
        })
        .collect();

    let scene = ImportedScene {
        name: "chain".into(),
        root: Some(root),
        meshes: vec![ImportedMesh {
            name: "chain".into(),
            bones,
            ..Default::default()
        }],
        animations: vec![ImportedAnimation {
            name: "wave".into(),
            duration_ticks: 30.0,
            ticks_per_second: 30.0,
            channels,
        }],
    };

    SkinnedModel::from_scene(&scene)
        .and_then(|m| m.with_animation_from(&scene, 0, 25.0))
        .expect("benchmark model")
}

fn bench_bone_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("bone_transforms");
    for depth in [16, 64] {
        let model = chain_model(depth);
        let mut out = vec![Mat4::IDENTITY; model.bone_count()];
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                model.bone_transforms_into(black_box(12.5), &mut out).unwrap();
                black_box(&out);
            });
        });
    }
    group.finish();
}

fn bench_crowd_update(c: &mut Criterion) {
    let mut crowd = Crowd::new(PlaybackSettings {
        rng_seed: Some(1),
        ..Default::default()
    });
    let model = crowd.add_model(Arc::new(chain_model(32))).unwrap();
    for _ in 0..256 {
        crowd.register_instance(model, None, StartFrame::Random).unwrap();
    }
    let mut staging = CpuTransformBuffer::new();

    c.bench_function("crowd_update_256x32", |b| {
        b.iter(|| crowd.update(black_box(1.0), &mut staging).unwrap());
    });
}

criterion_group!(benches, bench_bone_transforms, bench_crowd_update);
criterion_main!(benches);
