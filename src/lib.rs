//! hullcast
//!
//! Swept-hull collision detection and rigid-body collision response for
//! fast-moving craft, built on hecs.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **math** - Poses and rotation helpers on top of glam
//! 2. **physics** - Convex hulls, swept hitpoint tests, collision response and the tick driver
//! 3. **ecs** - Components that carry hulls, mass and kinematic state on hecs entities

pub mod ecs;
pub mod math;
pub mod physics;

pub use ecs::prelude::*;

pub use math::Pose;

pub use physics::collision::{Collision, Crash, Extreme};
pub use physics::interpolation::{HistoryError, StateHistory};
pub use physics::resolver::{ResolveError, ResponseMode};
pub use physics::rigid_body::RigidBody;
pub use physics::shape::{GeometryError, Plane, Shape};
pub use physics::touchable::{Placed, StaticBody, Touchable};
pub use physics::{CollisionConfig, CollisionWorld, CrashEvent};

// Re-export glam and hecs for convenience
pub use glam;
pub use hecs;
