//! Collision benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench collision
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench collision -- sweep

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Quat, Vec3};
use hullcast::math::Pose;
use hullcast::physics::hitpoints::HitpointTracker;
use hullcast::physics::resolver::{ResponseMode, process};
use hullcast::physics::touchable::{Placed, Touchable};
use hullcast_bench::*;

// ---------------------------------------------------------------------------
// Swept tests
// ---------------------------------------------------------------------------

fn bench_sweep(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("sweep/maximum_movement");
        let shape = box_hull(Vec3::splat(1.0));

        group.bench_function("hit", |b| {
            b.iter(|| shape.maximum_movement(Vec3::new(-3.0, 0.2, 0.1), Vec3::new(4.0, 0.0, 0.0)));
        });
        group.bench_function("miss", |b| {
            b.iter(|| shape.maximum_movement(Vec3::new(-3.0, 5.0, 0.0), Vec3::new(4.0, 0.0, 0.0)));
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("sweep/hitpoints_vs_box");
        let target = box_hull(Vec3::splat(1.0));
        let mover = box_hull(Vec3::new(0.5, 0.2, 0.8));
        let from = Pose::from_position(Vec3::new(-4.0, 0.0, 0.0));
        let to = Pose::new(Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(0.3));

        let mut tracker = HitpointTracker::new();
        let hitpoints = tracker.hitpoints(1, &mover, from, to).to_vec();
        let placed = Placed::fixed(&target, Pose::IDENTITY);
        group.bench_function("static_target", |b| {
            b.iter(|| placed.test_hitpoints(&hitpoints));
        });

        let moving = Placed::new(
            &target,
            Pose::IDENTITY,
            Pose::from_position(Vec3::new(-1.0, 0.5, 0.0)),
        );
        group.bench_function("moving_target", |b| {
            b.iter(|| moving.test_hitpoints(&hitpoints));
        });
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

fn bench_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("response/mode");
    for mode in ResponseMode::ALL {
        let a = jet_snapshot(5.0, Vec3::new(30.0, 2.0, 0.0), Vec3::NEG_X);
        let b_jet = jet_snapshot(8.0, Vec3::new(-20.0, 0.0, 1.0), Vec3::X);
        let name = format!("{mode:?}");
        group.bench_with_input(BenchmarkId::new("two_jets", &name), &mode, |b, &mode| {
            b.iter_batched(
                || (a.clone(), b_jet.clone()),
                |(mut a, mut b)| process(mode, &mut a, &mut b),
                criterion::BatchSize::SmallInput,
            );
        });

        let wall = wall_snapshot(Vec3::X);
        group.bench_with_input(BenchmarkId::new("jet_wall", &name), &mode, |b, &mode| {
            b.iter_batched(
                || (a.clone(), wall.clone()),
                |(mut a, mut w)| process(mode, &mut a, &mut w),
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Full tick
// ---------------------------------------------------------------------------

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick/wall_scene");
    group.sample_size(30);
    for &n in &[10, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || setup_wall_scene(n),
                |(mut world, mut physics, pairs)| {
                    for _ in 0..4 {
                        physics.fixed_step(&mut world, 1.0 / 60.0, &pairs);
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sweep, bench_response, bench_tick);
criterion_main!(benches);
