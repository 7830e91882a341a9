//! Physics components for ECS entities.

use std::sync::Arc;

use glam::{Mat3, Quat, Vec3};

use crate::math::Pose;
use crate::physics::collision::Crash;
use crate::physics::hitpoints::HitpointTracker;
use crate::physics::shape::Shape;

/// Shared, read-only collision hull of an entity.
#[derive(Debug, Clone)]
pub struct Hull(pub Arc<Shape>);

impl Hull {
    pub fn new(shape: Shape) -> Self {
        Self(Arc::new(shape))
    }

    pub fn shape(&self) -> &Shape {
        &self.0
    }
}

/// Mass properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalBody {
    /// `f32::INFINITY` for bodies that never move under collision response.
    pub mass: f32,
    /// Inertia tensor in local space.
    pub inertia: Mat3,
}

impl PhysicalBody {
    /// Create a dynamic body with the given mass.
    pub fn new_dynamic(mass: f32) -> Self {
        // Default inertia tensor: identity * mass
        Self {
            mass,
            inertia: Mat3::IDENTITY * mass,
        }
    }

    /// Create an immovable body.
    pub fn new_static() -> Self {
        Self {
            mass: f32::INFINITY,
            inertia: Mat3::ZERO,
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass.is_infinite()
    }
}

/// Authoritative kinematic state, owned by the entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidState {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    /// World-space angular velocity in radians per second.
    pub rotation_speed: Vec3,
}

impl RigidState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_rotation_speed(mut self, rotation_speed: Vec3) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }
}

impl Default for RigidState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            rotation_speed: Vec3::ZERO,
        }
    }
}

/// Per-tick movement of a moving entity.
///
/// Holds the state at the start of the tick, the extrapolated state at its
/// end, and the collision bookkeeping for the tick. Entities without this
/// component are scenery.
#[derive(Debug, Clone, Default)]
pub struct Motion {
    /// Tick this motion was last begun for. Stale motions are neither
    /// swept, resolved nor committed.
    pub tick: Option<u64>,
    pub previous: RigidState,
    pub next: RigidState,
    /// Length of the current tick in seconds.
    pub step: f32,
    /// Fraction of the tick at which a resolved collision happened.
    pub impact: Option<f32>,
    pub hitpoints: HitpointTracker,
    /// Earliest collision found for this tick.
    pub crash: Option<Crash>,
}

/// Pilot input, written by an external controller (player or AI) each frame.
///
/// Every axis is expected in `[-1, 1]`, throttle in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub throttle: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Turns [`Controls`] into accelerations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightModel {
    /// Thrust force at full throttle (newtons).
    pub max_thrust: f32,
    /// Linear drag coefficient per second.
    pub drag: f32,
    /// Angular drag coefficient per second.
    pub angular_drag: f32,
    /// Angular acceleration at full deflection around local (X, Y, Z): pitch, yaw, roll.
    pub turn_rates: Vec3,
}

impl Default for FlightModel {
    fn default() -> Self {
        Self {
            max_thrust: 2000.0,
            drag: 0.2,
            angular_drag: 1.5,
            turn_rates: Vec3::new(2.0, 1.0, 3.0),
        }
    }
}
