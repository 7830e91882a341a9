//! Small math helpers on top of glam.
//!
//! glam supplies the vector, quaternion and matrix types; this module adds the
//! few operations the collision code needs that glam does not name directly.

use glam::{Mat3, Quat, Vec3};

/// Angular speeds below this are treated as no rotation.
const MIN_ROTATION_SPEED: f32 = 1e-10;

/// Local-to-world placement of an entity (translation and rotation, no scale).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a pose from a position with no rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Map a local-space point to world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.position
    }

    /// Map a world-space point into local space.
    #[inline]
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Rotate a local-space direction into world space.
    #[inline]
    pub fn rotate(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// Pose a fraction `t` of the way to `other`.
    pub fn lerp(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t).normalize(),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Reflect `v` about the plane with unit normal `n`: `v - 2(v·n)n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - n * (2.0 * v.dot(n))
}

/// Rotate `rotation` by a world-space angular velocity over `dt` seconds.
pub fn integrate_rotation(rotation: Quat, rotation_speed: Vec3, dt: f32) -> Quat {
    let angle = rotation_speed * dt;
    if angle.length_squared() < MIN_ROTATION_SPEED {
        return rotation;
    }
    (Quat::from_scaled_axis(angle) * rotation).normalize()
}

/// Inverse of a local inertia tensor once rotated into world orientation.
///
/// Returns the zero matrix when the tensor cannot be inverted (static bodies).
pub fn world_inverse_inertia(local_inertia: Mat3, rotation: Quat) -> Mat3 {
    let r = Mat3::from_quat(rotation);
    let world = r * local_inertia * r.transpose();
    let det = world.determinant();
    if det.abs() <= f32::EPSILON || !det.is_finite() {
        return Mat3::ZERO;
    }
    world.inverse()
}
