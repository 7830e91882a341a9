//! Continuous collision detection and collision response.
//!
//! # Architecture
//!
//! Each fixed tick runs these phases in order, on one thread:
//!
//! 1. Extrapolate every moving entity and cache its swept hitpoints
//! 2. Test the hitpoints of each candidate pair against the other side's hull
//! 3. Reduce the results to the earliest crash per entity
//! 4. Resolve each crash into new velocities (one [`ResponseMode`] per tick)
//! 5. Commit the corrected extrapolation and record render history
//!
//! Candidate pairs come from the caller's broad phase.

pub mod collision;
pub mod hitpoints;
pub mod interpolation;
pub mod motion;
pub mod resolver;
pub mod rigid_body;
pub mod shape;
pub mod touchable;

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use tracing::{debug, warn};

use crate::ecs::components::physics::{Hull, Motion, PhysicalBody, RigidState};
use crate::math::Pose;

use self::collision::{Collision, Crash, Extreme};
use self::interpolation::StateHistory;
use self::resolver::{ResolveError, ResponseMode};
use self::rigid_body::{Contact, RigidBody};
use self::touchable::{Placed, Touchable};

/// Configuration for the collision simulation.
#[derive(Debug, Clone)]
pub struct CollisionConfig {
    /// Fixed timestep for ticks in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of ticks per frame. Default: 4.
    pub max_substeps: u32,
    /// Response algorithm, read once at the start of every tick. Default: two-body.
    pub response_mode: ResponseMode,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
            response_mode: ResponseMode::default(),
        }
    }
}

/// A crash resolved during the last tick.
#[derive(Debug, Clone, Copy)]
pub struct CrashEvent {
    /// The entity whose hitpoints struck.
    pub entity: hecs::Entity,
    /// The entity that was struck.
    pub other: hecs::Entity,
    /// World-space collision.
    pub collision: Collision,
}

/// Drives ticks over a `hecs::World`.
pub struct CollisionWorld {
    config: CollisionConfig,
    accumulator: f64,
    tick: u64,
    time: f64,
    crashes: Vec<CrashEvent>,
    numeric_warned: bool,
}

impl CollisionWorld {
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            tick: 0,
            time: 0.0,
            crashes: Vec::new(),
            numeric_warned: false,
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Change the response algorithm. Takes effect on the next tick.
    pub fn set_response_mode(&mut self, mode: ResponseMode) {
        self.config.response_mode = mode;
    }

    /// Number of ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Crashes resolved during the most recent tick.
    pub fn crashes(&self) -> &[CrashEvent] {
        &self.crashes
    }

    /// Advance by `delta_time` seconds in fixed ticks, testing the given
    /// candidate pairs every tick.
    pub fn step(
        &mut self,
        world: &mut hecs::World,
        delta_time: f64,
        pairs: &[(hecs::Entity, hecs::Entity)],
    ) {
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.fixed_step(world, self.config.fixed_timestep as f32, pairs);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            self.accumulator = 0.0;
        }
    }

    /// Run exactly one tick of `dt` seconds.
    pub fn fixed_step(
        &mut self,
        world: &mut hecs::World,
        dt: f32,
        pairs: &[(hecs::Entity, hecs::Entity)],
    ) {
        let mode = self.config.response_mode;
        self.tick += 1;
        self.crashes.clear();

        // 1. Extrapolate and cache hitpoints
        motion::extrapolate(world, self.tick, dt);

        // 2-3. Narrow phase, then one writer per entity
        let confirmed = find_crashes(world, self.tick, pairs);
        for &(entity, crash) in &confirmed {
            if let Ok(mut motion) = world.get::<&mut Motion>(entity) {
                motion.crash = Some(crash);
            }
        }

        // 4. Response, once per touching pair
        let mut resolved = HashSet::new();
        for (entity, crash) in confirmed {
            if !resolved.insert(unordered(entity, crash.other)) {
                continue;
            }
            self.resolve(world, mode, entity, crash);
        }

        // 5. Commit and record
        motion::commit(world, self.tick);
        self.time += dt as f64;
        for (_, (state, history)) in world.query_mut::<(&RigidState, &mut StateHistory)>() {
            history.record(self.time, state.pose());
        }
    }

    fn resolve(
        &mut self,
        world: &hecs::World,
        mode: ResponseMode,
        entity: hecs::Entity,
        crash: Crash,
    ) {
        let collision = crash.collision;
        let mut a = snapshot(world, self.tick, entity, &collision, collision.normal);
        let mut b = snapshot(world, self.tick, crash.other, &collision, -collision.normal);

        match resolver::process(mode, &mut a, &mut b) {
            Ok(()) => {
                a.apply_to_world(world);
                b.apply_to_world(world);
                debug!(
                    ?entity,
                    other = ?crash.other,
                    time = collision.time_to_impact,
                    ?mode,
                    "crash resolved"
                );
                self.crashes.push(CrashEvent {
                    entity,
                    other: crash.other,
                    collision,
                });
            }
            Err(ResolveError::Degenerate) => {
                warn!(
                    ?entity,
                    other = ?crash.other,
                    "both sides of a crash are immovable, skipping"
                );
            }
            Err(err) => {
                if !self.numeric_warned {
                    self.numeric_warned = true;
                    warn!(
                        ?entity,
                        other = ?crash.other,
                        %err,
                        "crash left unresolved, further occurrences are not logged"
                    );
                }
            }
        }
    }
}

/// Earliest crash of every entity whose hitpoints struck something, ordered by time.
fn find_crashes(
    world: &hecs::World,
    tick: u64,
    pairs: &[(hecs::Entity, hecs::Entity)],
) -> Vec<(hecs::Entity, Crash)> {
    let mut earliest: HashMap<hecs::Entity, Extreme<Crash>> = HashMap::new();
    for &(a, b) in pairs {
        if a == b {
            continue;
        }
        for (subject, other) in [(a, b), (b, a)] {
            if let Some(collision) = sweep(world, tick, subject, other) {
                earliest
                    .entry(subject)
                    .or_default()
                    .offer(Crash { other, collision });
            }
        }
    }

    let mut confirmed: Vec<_> = earliest
        .into_iter()
        .filter_map(|(entity, crash)| crash.into_inner().map(|c| (entity, c)))
        .collect();
    confirmed.sort_by(|x, y| x.1.cmp(&y.1).then(x.0.cmp(&y.0)));
    confirmed
}

/// Test the swept hitpoints of `subject` against the hull of `other`.
fn sweep(
    world: &hecs::World,
    tick: u64,
    subject: hecs::Entity,
    other: hecs::Entity,
) -> Option<Collision> {
    let motion = world.get::<&Motion>(subject).ok()?;
    let hitpoints = motion.hitpoints.cached(tick)?;
    let hull = world.get::<&Hull>(other).ok()?;
    let (from, to) = tick_poses(world, tick, other)?;
    Placed::new(hull.shape(), from, to).test_hitpoints(hitpoints)
}

/// Start and end pose of an entity over `tick`.
fn tick_poses(world: &hecs::World, tick: u64, entity: hecs::Entity) -> Option<(Pose, Pose)> {
    if let Ok(motion) = world.get::<&Motion>(entity) {
        if motion.is_current(tick) {
            return Some((motion.previous.pose(), motion.next.pose()));
        }
    }
    let state = world.get::<&RigidState>(entity).ok()?;
    Some((state.pose(), state.pose()))
}

/// Contact-time snapshot of one side of a crash.
fn snapshot(
    world: &hecs::World,
    tick: u64,
    entity: hecs::Entity,
    collision: &Collision,
    normal: Vec3,
) -> RigidBody {
    let contact = Contact {
        time_scalar: collision.time_to_impact,
        hit_position: collision.hit_pos,
        normal,
    };
    let body = world.get::<&PhysicalBody>(entity).ok().map(|b| *b);
    let state = world
        .get::<&Motion>(entity)
        .ok()
        .filter(|m| m.is_current(tick))
        .map(|m| m.state_at(collision.time_to_impact));

    match (body, state) {
        (Some(body), Some(state)) => RigidBody::dynamic(&body, &state, contact),
        _ => RigidBody::static_contact(contact),
    }
    .with_source(entity)
}

fn unordered(a: hecs::Entity, b: hecs::Entity) -> (hecs::Entity, hecs::Entity) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
