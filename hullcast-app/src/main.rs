use glam::{Quat, Vec3};
use hullcast::ecs::components::physics::{
    Controls, FlightModel, Hull, Motion, PhysicalBody, RigidState,
};
use hullcast::physics::resolver::ResponseMode;
use hullcast::physics::shape::Shape;
use hullcast::physics::{CollisionConfig, CollisionWorld};
use hullcast::StateHistory;

const FRAME_TIME: f64 = 1.0 / 60.0;
const FRAMES: usize = 600;

/// Every pair whose bounding spheres can meet within one tick.
fn candidate_pairs(world: &hecs::World, dt: f32) -> Vec<(hecs::Entity, hecs::Entity)> {
    let bodies: Vec<_> = world
        .query::<(&RigidState, &Hull)>()
        .iter()
        .map(|(entity, (state, hull))| {
            let reach = hull.shape().bounding_radius() + state.velocity.length() * dt;
            (entity, state.position, reach)
        })
        .collect();

    let mut pairs = Vec::new();
    for (i, &(a, pa, ra)) in bodies.iter().enumerate() {
        for &(b, pb, rb) in &bodies[i + 1..] {
            if pa.distance(pb) <= ra + rb {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

fn spawn_jet(
    world: &mut hecs::World,
    position: Vec3,
    heading: Quat,
    throttle: f32,
) -> anyhow::Result<hecs::Entity> {
    let hull = Shape::cuboid(Vec3::new(1.5, 0.4, 3.0))?;
    Ok(world.spawn((
        Hull::new(hull),
        RigidState::at(position).with_rotation(heading),
        PhysicalBody::new_dynamic(800.0),
        Motion::default(),
        Controls {
            throttle,
            ..Controls::default()
        },
        FlightModel {
            max_thrust: 40_000.0,
            ..FlightModel::default()
        },
        StateHistory::default(),
    )))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut world = hecs::World::new();
    let mut physics = CollisionWorld::new(CollisionConfig::default());

    // Arena wall, facing the jets
    world.spawn((
        Hull::new(Shape::square(Vec3::new(0.0, 0.0, -400.0), Vec3::Z, 200.0)?),
        RigidState::default(),
        PhysicalBody::new_static(),
    ));

    // Two jets on a collision course, a third heading for the wall
    let east = Quat::from_rotation_y(-90f32.to_radians());
    let west = Quat::from_rotation_y(90f32.to_radians());
    let red = spawn_jet(&mut world, Vec3::new(-60.0, 0.0, 0.0), east, 1.0)?;
    let blue = spawn_jet(&mut world, Vec3::new(60.0, 0.5, 0.0), west, 1.0)?;
    let green = spawn_jet(&mut world, Vec3::new(0.0, 20.0, 0.0), Quat::IDENTITY, 1.0)?;
    log::info!("spawned jets {red:?}, {blue:?}, {green:?}");

    let mut crashes = 0usize;
    for frame in 0..FRAMES {
        if frame == FRAMES / 2 {
            physics.set_response_mode(ResponseMode::StaticContact);
            log::info!("switched response mode to {:?}", ResponseMode::StaticContact);
        }

        let pairs = candidate_pairs(&world, physics.config().fixed_timestep as f32);
        physics.step(&mut world, FRAME_TIME, &pairs);

        for event in physics.crashes() {
            crashes += 1;
            log::info!(
                "t={:.3}s {:?} hit {:?} at {:.2} of the tick, normal {:?}",
                physics.time(),
                event.entity,
                event.other,
                event.collision.time_to_impact,
                event.collision.normal,
            );
        }
    }

    for (entity, (state, history)) in world.query_mut::<(&RigidState, &mut StateHistory)>() {
        let drawn = history.sample(physics.time() - FRAME_TIME * 0.5)?;
        log::info!(
            "{entity:?} ends at {:?} moving {:?} (drawn at {:?})",
            state.position,
            state.velocity,
            drawn.position,
        );
    }
    log::info!("{crashes} crashes in {} ticks", physics.tick());

    Ok(())
}
