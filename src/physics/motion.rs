//! Extrapolation and integration of entity state across a tick.

use glam::Vec3;

use crate::ecs::components::physics::{
    Controls, FlightModel, Hull, Motion, PhysicalBody, RigidState,
};
use crate::math::integrate_rotation;

/// Receives the corrected velocities of a resolved collision.
///
/// This is the only write path from collision response back into an entity.
pub trait CollisionReceiver {
    /// `time_scalar` is the fraction of the tick at which contact happened.
    fn apply_collision(&mut self, velocity: Vec3, rotation_speed: Vec3, time_scalar: f32);
}

impl RigidState {
    /// State after `dt` seconds under constant accelerations (semi-implicit Euler).
    pub fn extrapolate(&self, linear_accel: Vec3, angular_accel: Vec3, dt: f32) -> RigidState {
        let velocity = self.velocity + linear_accel * dt;
        let rotation_speed = self.rotation_speed + angular_accel * dt;
        RigidState {
            position: self.position + velocity * dt,
            rotation: integrate_rotation(self.rotation, rotation_speed, dt),
            velocity,
            rotation_speed,
        }
    }
}

impl FlightModel {
    /// Linear and angular acceleration produced by `controls` for a body in `state`.
    pub fn acceleration(&self, controls: &Controls, state: &RigidState, mass: f32) -> (Vec3, Vec3) {
        let forward = state.rotation * Vec3::NEG_Z;
        let thrust = forward * (self.max_thrust * controls.throttle.clamp(0.0, 1.0));
        let thrust_accel = if mass > 0.0 && mass.is_finite() {
            thrust / mass
        } else {
            Vec3::ZERO
        };
        let linear = thrust_accel - state.velocity * self.drag;

        let deflection = Vec3::new(
            controls.pitch.clamp(-1.0, 1.0),
            controls.yaw.clamp(-1.0, 1.0),
            controls.roll.clamp(-1.0, 1.0),
        );
        let angular = state.rotation * (deflection * self.turn_rates)
            - state.rotation_speed * self.angular_drag;

        (linear, angular)
    }
}

impl Motion {
    /// Begin `tick`, lasting `dt` seconds, from `state` with the given accelerations.
    pub fn begin(
        &mut self,
        tick: u64,
        state: &RigidState,
        linear_accel: Vec3,
        angular_accel: Vec3,
        dt: f32,
    ) {
        self.tick = Some(tick);
        self.previous = *state;
        self.next = state.extrapolate(linear_accel, angular_accel, dt);
        self.step = dt;
        self.impact = None;
        self.crash = None;
    }

    /// Whether this motion was begun for `tick`.
    pub fn is_current(&self, tick: u64) -> bool {
        self.tick == Some(tick)
    }

    /// State a fraction `t` through the tick along the extrapolated path.
    pub fn state_at(&self, t: f32) -> RigidState {
        let pose = self.previous.pose().lerp(&self.next.pose(), t);
        RigidState {
            position: pose.position,
            rotation: pose.rotation,
            velocity: self.next.velocity,
            rotation_speed: self.next.rotation_speed,
        }
    }
}

impl CollisionReceiver for Motion {
    /// Move to the impact point along the extrapolated path, then spend the
    /// rest of the tick moving with the corrected velocities.
    fn apply_collision(&mut self, velocity: Vec3, rotation_speed: Vec3, time_scalar: f32) {
        let t = time_scalar.clamp(0.0, 1.0);
        let at_impact = self.state_at(t);
        let remaining = self.step * (1.0 - t);

        self.next = RigidState {
            position: at_impact.position + velocity * remaining,
            rotation: integrate_rotation(at_impact.rotation, rotation_speed, remaining),
            velocity,
            rotation_speed,
        };
        self.impact = Some(self.impact.map_or(t, |previous| previous.min(t)));
    }
}

impl CollisionReceiver for RigidState {
    /// Overwrite the velocities in place, leaving position and rotation to the
    /// caller's own integration.
    fn apply_collision(&mut self, velocity: Vec3, rotation_speed: Vec3, _time_scalar: f32) {
        self.velocity = velocity;
        self.rotation_speed = rotation_speed;
    }
}

/// Extrapolate every moving entity for the tick and refresh its hitpoints.
pub fn extrapolate(world: &mut hecs::World, tick: u64, dt: f32) {
    for (_, (state, body, hull, motion, controls, flight)) in world.query_mut::<(
        &RigidState,
        &PhysicalBody,
        &Hull,
        &mut Motion,
        Option<&Controls>,
        Option<&FlightModel>,
    )>() {
        let (linear, angular) = match (controls, flight) {
            (Some(controls), Some(flight)) if !body.is_static() => {
                flight.acceleration(controls, state, body.mass)
            }
            _ => (Vec3::ZERO, Vec3::ZERO),
        };

        if body.is_static() {
            motion.begin(tick, state, Vec3::ZERO, Vec3::ZERO, 0.0);
        } else {
            motion.begin(tick, state, linear, angular, dt);
        }

        let from = motion.previous.pose();
        let to = motion.next.pose();
        motion.hitpoints.hitpoints(tick, hull.shape(), from, to);
    }
}

/// Fold each entity's (possibly corrected) extrapolated state into its
/// authoritative state. Motions not begun for `tick` are left alone.
pub fn commit(world: &mut hecs::World, tick: u64) {
    for (_, (state, motion)) in world.query_mut::<(&mut RigidState, &Motion)>() {
        if motion.is_current(tick) {
            *state = motion.next;
        }
    }
}
