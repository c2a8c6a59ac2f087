//! # ECS Performance Benchmark
//!
//! Covers the three hot paths of the engine:
//! - Entity churn through the recycle queue
//! - Movement over a live query with direct column writes
//! - Change detection diffing over a tracked query
//!
//! Run with: `cargo bench --package strata_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_core::{Engine, EngineConfig, Entity, FieldType, QueryId, QueryTerm, Schema, StoreId, WorldId};

/// Entity count for the iteration benchmarks.
const ENTITY_COUNT: usize = 100_000;

struct Scene {
    engine: Engine,
    world: WorldId,
    position: StoreId,
    velocity: StoreId,
    entities: Vec<Entity>,
}

fn scene(count: usize) -> Scene {
    let config = EngineConfig {
        default_size: count * 2,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config).unwrap();
    let position = engine.define_component(&Schema::vector3(FieldType::F32)).unwrap();
    let velocity = engine.define_component(&Schema::vector3(FieldType::F32)).unwrap();
    let world = engine.create_world().unwrap();

    let mut entities = Vec::with_capacity(count);
    for _ in 0..count {
        let eid = engine.add_entity(world).unwrap();
        engine.add_component(world, position, eid).unwrap();
        engine.add_component(world, velocity, eid).unwrap();
        entities.push(eid);
    }
    engine
        .store_mut(velocity)
        .unwrap()
        .scalar_mut::<f32>("x")
        .unwrap()
        .fill(0.1);

    Scene {
        engine,
        world,
        position,
        velocity,
        entities,
    }
}

fn movement(scene: &mut Scene, query: QueryId) -> usize {
    let (entities, stores) = scene.engine.query_with_stores(scene.world, query).unwrap();
    let (pos, vel) = stores.get_pair_mut(scene.position, scene.velocity).unwrap();
    let [px, py, pz] = pos.scalars_mut::<f32, 3>(["x", "y", "z"]).unwrap();
    let [vx, vy, vz] = vel.scalars::<f32, 3>(["x", "y", "z"]).unwrap();
    for &eid in entities {
        let i = eid as usize;
        px[i] += vx[i] * 0.016;
        py[i] += vy[i] * 0.016;
        pz[i] += vz[i] * 0.016;
    }
    entities.len()
}

/// Benchmark: Add entities and components from scratch.
fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(scene(count).entities.len()));
        });
    }

    group.finish();
}

/// Benchmark: Movement system over a live query.
fn bench_query_movement(c: &mut Criterion) {
    let mut scene = scene(ENTITY_COUNT);
    let query = scene
        .engine
        .define_query([QueryTerm::With(scene.position), QueryTerm::With(scene.velocity)])
        .unwrap();

    c.bench_function("query_movement_100K", |b| {
        b.iter(|| black_box(movement(&mut scene, query)));
    });
}

/// Benchmark: Component add/remove churn with deferred query commits.
fn bench_component_churn(c: &mut Criterion) {
    let mut scene = scene(ENTITY_COUNT);
    let query = scene
        .engine
        .define_query([QueryTerm::With(scene.position), QueryTerm::With(scene.velocity)])
        .unwrap();
    scene.engine.query(scene.world, query).unwrap();
    let targets: Vec<Entity> = scene.entities.iter().copied().step_by(10).collect();

    c.bench_function("component_churn_10K", |b| {
        b.iter(|| {
            for &eid in &targets {
                scene.engine.remove_component(scene.world, scene.velocity, eid).unwrap();
            }
            let without = scene.engine.query(scene.world, query).unwrap().len();
            for &eid in &targets {
                scene.engine.add_component(scene.world, scene.velocity, eid).unwrap();
            }
            black_box(without)
        });
    });
}

/// Benchmark: Entity removal and recycling.
fn bench_entity_recycling(c: &mut Criterion) {
    let mut scene = scene(ENTITY_COUNT);
    // Reuse every removed handle so the cursor stays put across iterations.
    scene.engine.set_removed_recycle_threshold(0.0).unwrap();

    c.bench_function("remove_add_cycle_10K", |b| {
        b.iter(|| {
            for eid in scene.entities.drain(..10_000) {
                scene.engine.remove_entity(scene.world, eid).unwrap();
            }
            for _ in 0..10_000 {
                let eid = scene.engine.add_entity(scene.world).unwrap();
                scene.entities.push(eid);
            }
            black_box(scene.engine.entity_cursor(scene.world).unwrap())
        });
    });
}

/// Benchmark: Change detection over a tracked query.
fn bench_changed_diff(c: &mut Criterion) {
    let mut scene = scene(ENTITY_COUNT);
    let changed = scene
        .engine
        .define_query([QueryTerm::Changed(scene.position)])
        .unwrap();
    scene.engine.query(scene.world, changed).unwrap();

    let mut group = c.benchmark_group("changed_diff");

    group.bench_function("clean_100K", |b| {
        b.iter(|| black_box(scene.engine.query(scene.world, changed).unwrap().len()));
    });

    group.bench_function("every_tenth_dirty_100K", |b| {
        b.iter(|| {
            let column = scene
                .engine
                .store_mut(scene.position)
                .unwrap()
                .scalar_mut::<f32>("x")
                .unwrap();
            for &eid in scene.entities.iter().step_by(10) {
                column[eid as usize] += 1.0;
            }
            black_box(scene.engine.query(scene.world, changed).unwrap().len())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_populate,
    bench_query_movement,
    bench_component_churn,
    bench_entity_recycling,
    bench_changed_diff,
);

criterion_main!(benches);
