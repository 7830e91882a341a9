//! Shared setup helpers for hullcast benchmarks.
//!
//! ## Running
//!
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench collision
//!
//! Filter by group:
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench collision -- response

use glam::Vec3;
use hullcast::ecs::components::physics::{Hull, Motion, PhysicalBody, RigidState};
use hullcast::physics::rigid_body::{Contact, RigidBody};
use hullcast::physics::shape::Shape;
use hullcast::physics::{CollisionConfig, CollisionWorld};

// ---------------------------------------------------------------------------
// Hulls
// ---------------------------------------------------------------------------

/// Box hull with the given half extents.
pub fn box_hull(half_extents: Vec3) -> Shape {
    Shape::cuboid(half_extents).expect("valid cuboid")
}

/// Large square wall facing -X at `x`.
pub fn wall_hull(x: f32) -> Shape {
    Shape::square(Vec3::new(x, 0.0, 0.0), Vec3::NEG_X, 50.0).expect("valid square")
}

// ---------------------------------------------------------------------------
// Response snapshots
// ---------------------------------------------------------------------------

/// Off-center contact between a moving jet and whatever it struck.
pub fn jet_snapshot(mass: f32, velocity: Vec3, normal: Vec3) -> RigidBody {
    RigidBody::dynamic(
        &PhysicalBody::new_dynamic(mass),
        &RigidState::default()
            .with_velocity(velocity)
            .with_rotation_speed(Vec3::new(0.1, 0.4, -0.2)),
        Contact {
            time_scalar: 0.5,
            hit_position: Vec3::new(0.5, 0.3, -0.2),
            normal,
        },
    )
}

pub fn wall_snapshot(normal: Vec3) -> RigidBody {
    RigidBody::static_contact(Contact {
        time_scalar: 0.5,
        hit_position: Vec3::new(0.5, 0.3, -0.2),
        normal,
    })
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

/// `n` box jets flying at a shared wall, with every jet/wall pair as a candidate.
pub fn setup_wall_scene(
    n: usize,
) -> (hecs::World, CollisionWorld, Vec<(hecs::Entity, hecs::Entity)>) {
    let mut world = hecs::World::new();
    let wall = world.spawn((
        Hull::new(wall_hull(2.0)),
        RigidState::default(),
        PhysicalBody::new_static(),
    ));

    let cols = (n as f32).sqrt().ceil() as usize;
    let mut pairs = Vec::with_capacity(n);
    for i in 0..n {
        let y = (i % cols) as f32 * 2.0 - cols as f32;
        let z = (i / cols) as f32 * 2.0 - cols as f32;
        let jet = world.spawn((
            Hull::new(box_hull(Vec3::new(0.5, 0.2, 0.8))),
            RigidState::at(Vec3::new(0.0, y, z)).with_velocity(Vec3::new(120.0, 0.0, 0.0)),
            PhysicalBody::new_dynamic(5.0),
            Motion::default(),
        ));
        pairs.push((jet, wall));
    }

    (world, CollisionWorld::new(CollisionConfig::default()), pairs)
}
