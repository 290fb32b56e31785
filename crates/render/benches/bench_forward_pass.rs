use std::hint::black_box;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;
use lumen_assets::shapes;
use lumen_common::Transform;
use lumen_ecs::{
    ComponentStore, Drawable, EventQueue, GeometryChunk, Light, Material, ProjectionCamera,
    StaticModel,
};
use lumen_render::{
    ForwardRenderingSystem, MeshCache, RecordingDevice, RenderConfig, ResolutionPolicy,
};

fn make_scene(
    system: &mut ForwardRenderingSystem<lumen_render::UniversalPhongEffect<RecordingDevice>>,
    entity_count: usize,
    chunks_per_model: usize,
    light_count: usize,
) -> ComponentStore {
    let mut store = ComponentStore::new();
    let mut cache = MeshCache::new();
    let material = Arc::new(Material::new(Vec3::new(0.7, 0.7, 0.7)));

    let chunks = (0..chunks_per_model)
        .map(|i| {
            let mesh = cache
                .get_or_upload(
                    system.device_mut(),
                    &shapes::sphere(0.5 + i as f32 * 0.1, 12, 12),
                )
                .expect("bench mesh upload");
            GeometryChunk::new(mesh, material.clone())
        })
        .collect();
    let model = Arc::new(StaticModel::new("bench", chunks));

    let camera = store.create();
    store
        .assign(camera, Transform::from_translation(Vec3::new(0.0, 5.0, 20.0)))
        .expect("camera transform");
    store.assign(camera, ProjectionCamera::default()).expect("camera");

    for i in 0..light_count {
        let light = store.create();
        store
            .assign(
                light,
                Transform::from_translation(Vec3::new(i as f32, 10.0, 0.0)),
            )
            .expect("light transform");
        store.assign(light, Light::default()).expect("light");
    }

    let side = (entity_count as f32).sqrt().ceil() as usize;
    for i in 0..entity_count {
        let x = (i % side) as f32 * 2.0;
        let z = (i / side) as f32 * 2.0;
        let entity = store.create();
        store
            .assign(entity, Transform::from_translation(Vec3::new(x, 0.0, z)))
            .expect("transform");
        store.assign(entity, Drawable::new(model.clone())).expect("drawable");
    }
    store
}

fn bench_frame(
    entity_count: usize,
    chunks_per_model: usize,
    light_count: usize,
    iterations: usize,
) {
    let config = RenderConfig {
        resolution_policy: ResolutionPolicy::LastVisited,
        ..RenderConfig::default()
    };
    let mut system = ForwardRenderingSystem::new(RecordingDevice::new(), config).expect("system");
    let store = make_scene(&mut system, entity_count, chunks_per_model, light_count);
    let mut events = EventQueue::new();

    let start = Instant::now();
    for _ in 0..iterations {
        let stats = system
            .update(black_box(&store), &mut events, Duration::from_millis(16))
            .expect("frame");
        black_box(stats);
        system.device_mut().take_commands();
        events.drain();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  frame ({entity_count} entities x {chunks_per_model} chunks, {light_count} lights, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Forward Pass Benchmarks ===\n");

    println!("Single chunk models:");
    bench_frame(100, 1, 1, 1000);
    bench_frame(1000, 1, 1, 100);
    bench_frame(10000, 1, 1, 10);

    println!("\nMulti chunk models:");
    bench_frame(1000, 4, 1, 100);

    println!("\nLight markers:");
    bench_frame(100, 1, 64, 1000);

    println!("\n=== Done ===");
}
