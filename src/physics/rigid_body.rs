//! Physical snapshot of one side of a contact, and the impulse algorithms
//! that resolve it.

use glam::{Mat3, Quat, Vec3};

use crate::ecs::components::physics::{Motion, PhysicalBody, RigidState};
use crate::math::{reflect, world_inverse_inertia};

use super::motion::CollisionReceiver;
use super::resolver::ResolveError;

/// Rotation speed kept after a simple reflection.
pub const ROTATION_DAMPING: f32 = 0.75;

/// Where and when a body was touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Fraction of the tick at which contact happened.
    pub time_scalar: f32,
    /// World-space contact position.
    pub hit_position: Vec3,
    /// Unit direction in which the contact pushes this body.
    pub normal: Vec3,
}

/// A velocity change computed from a contact, not yet applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub velocity: Vec3,
    pub rotation_speed: Vec3,
}

/// One side of a contact at the moment of collision.
///
/// Built fresh for every confirmed collision, handed to the resolver once,
/// then applied back to its source and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Fraction of the tick at which contact happened, 1.0 is the end of the tick.
    pub time_scalar: f32,
    pub mass_center_position: Vec3,
    pub hit_position: Option<Vec3>,
    pub contact_normal: Option<Vec3>,
    pub rotation_speed_vector: Vec3,
    pub rotation: Quat,
    /// `f32::INFINITY` for bodies that do not move under collision response.
    pub mass: f32,
    pub velocity: Vec3,
    inverse_inertia: Mat3,
    /// Entity the snapshot was taken from. Not owned: the entity may be gone
    /// by the time the snapshot is applied.
    pub source: Option<hecs::Entity>,
}

impl RigidBody {
    /// Immovable placeholder without a contact.
    pub fn unmovable() -> Self {
        Self {
            time_scalar: 1.0,
            mass_center_position: Vec3::ZERO,
            hit_position: None,
            contact_normal: None,
            rotation_speed_vector: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            mass: f32::INFINITY,
            velocity: Vec3::ZERO,
            inverse_inertia: Mat3::ZERO,
            source: None,
        }
    }

    /// Immovable body that still knows where it was touched.
    pub fn static_contact(contact: Contact) -> Self {
        Self {
            time_scalar: contact.time_scalar,
            hit_position: Some(contact.hit_position),
            contact_normal: Some(contact.normal),
            ..Self::unmovable()
        }
    }

    /// Snapshot of a body in `state` (taken at the moment of contact).
    pub fn dynamic(body: &PhysicalBody, state: &RigidState, contact: Contact) -> Self {
        if body.is_static() {
            return Self::static_contact(contact);
        }
        Self {
            time_scalar: contact.time_scalar,
            mass_center_position: state.position,
            hit_position: Some(contact.hit_position),
            contact_normal: Some(contact.normal),
            rotation_speed_vector: state.rotation_speed,
            rotation: state.rotation,
            mass: body.mass,
            velocity: state.velocity,
            inverse_inertia: world_inverse_inertia(body.inertia, state.rotation),
            source: None,
        }
    }

    pub fn with_source(mut self, source: hecs::Entity) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_static(&self) -> bool {
        self.mass.is_infinite()
    }

    pub fn inverse_mass(&self) -> f32 {
        if self.is_static() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Inverse inertia tensor in world orientation.
    pub fn inverse_inertia(&self) -> Mat3 {
        self.inverse_inertia
    }

    /// Contact position relative to the center of mass.
    pub fn contact_offset(&self) -> Vec3 {
        self.hit_position
            .map_or(Vec3::ZERO, |hit| hit - self.mass_center_position)
    }

    /// Reflect the velocity about the contact normal and add a damped spin.
    ///
    /// No mass balancing: each body is handled on its own.
    pub fn simple_reflection(&mut self) {
        if self.is_static() {
            return;
        }
        let Some(normal) = self.contact_normal else {
            return;
        };

        self.velocity = reflect(self.velocity, normal);
        let spin = self.inverse_inertia * normal.cross(self.contact_offset());
        self.rotation_speed_vector = (self.rotation_speed_vector + spin) * ROTATION_DAMPING;
    }

    /// Impulse that bounces this body elastically off an immovable object.
    ///
    /// `None` when the body is itself immovable or has no contact.
    pub fn static_impulse(&self) -> Result<Option<Impulse>, ResolveError> {
        if self.is_static() {
            return Ok(None);
        }
        let Some(normal) = self.contact_normal else {
            return Ok(None);
        };

        let offset = self.contact_offset();
        let upper = -2.0 * self.velocity.dot(normal);
        let d_omega = self.inverse_inertia * offset.cross(normal);
        let rotation_term = d_omega.cross(offset).dot(normal);
        let denominator = self.inverse_mass() + rotation_term;
        let j = checked_ratio(upper, denominator)?;

        Ok(Some(Impulse {
            velocity: normal * (j * self.inverse_mass()),
            rotation_speed: d_omega * j,
        }))
    }

    /// Resolve a contact with an immovable object in place.
    pub fn collision_with_static_response(&mut self) -> Result<(), ResolveError> {
        if let Some(impulse) = self.static_impulse()? {
            self.apply_impulse(impulse);
        }
        Ok(())
    }

    /// Impulses for two finite-mass bodies pushing each other apart.
    ///
    /// `a`'s contact normal points from `b` towards `a`; when `a` has none the
    /// negated normal of `b` is used. Returns `None` when neither has one.
    pub fn two_body_impulses(
        a: &RigidBody,
        b: &RigidBody,
    ) -> Result<Option<(Impulse, Impulse)>, ResolveError> {
        let Some(normal) = a.contact_normal.or(b.contact_normal.map(|n| -n)) else {
            return Ok(None);
        };

        let offset_a = a.contact_offset();
        let offset_b = b.contact_offset();
        let upper = -2.0 * (a.velocity - b.velocity).dot(normal);
        let d_omega_a = a.inverse_inertia * offset_a.cross(normal);
        let d_omega_b = b.inverse_inertia * offset_b.cross(normal);
        let rot_fall_off = (d_omega_a.cross(offset_a) + d_omega_b.cross(offset_b)).dot(normal);
        let denominator = a.inverse_mass() + b.inverse_mass() + rot_fall_off;
        let j = checked_ratio(upper, denominator)?;

        let impulse = normal * j;
        Ok(Some((
            Impulse {
                velocity: impulse * a.inverse_mass(),
                rotation_speed: d_omega_a * j,
            },
            Impulse {
                velocity: -impulse * b.inverse_mass(),
                rotation_speed: -d_omega_b * j,
            },
        )))
    }

    /// Resolve a contact between two finite-mass bodies in place.
    pub fn two_body_response(a: &mut RigidBody, b: &mut RigidBody) -> Result<(), ResolveError> {
        if let Some((impulse_a, impulse_b)) = Self::two_body_impulses(a, b)? {
            a.apply_impulse(impulse_a);
            b.apply_impulse(impulse_b);
        }
        Ok(())
    }

    pub fn apply_impulse(&mut self, impulse: Impulse) {
        if self.is_static() {
            return;
        }
        self.velocity += impulse.velocity;
        self.rotation_speed_vector += impulse.rotation_speed;
    }

    /// Hand the corrected velocities to the owning entity. Immovable bodies
    /// have nothing to hand over.
    pub fn apply(&self, receiver: &mut impl CollisionReceiver) {
        if self.is_static() {
            return;
        }
        receiver.apply_collision(self.velocity, self.rotation_speed_vector, self.time_scalar);
    }

    /// [`apply`](Self::apply) to the source entity's [`Motion`].
    ///
    /// Returns `false` if there is no source or it no longer has a `Motion`.
    pub fn apply_to_world(&self, world: &hecs::World) -> bool {
        if self.is_static() {
            return false;
        }
        let Some(source) = self.source else {
            return false;
        };
        match world.get::<&mut Motion>(source) {
            Ok(mut motion) => {
                self.apply(&mut *motion);
                true
            }
            Err(_) => false,
        }
    }
}

/// `upper / denominator`, rejecting zero or non-finite denominators.
fn checked_ratio(upper: f32, denominator: f32) -> Result<f32, ResolveError> {
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(ResolveError::NumericDegeneracy { denominator });
    }
    let ratio = upper / denominator;
    if !ratio.is_finite() {
        return Err(ResolveError::NumericDegeneracy { denominator });
    }
    Ok(ratio)
}
