//! Collision response dispatch.
//!
//! One [`ResponseMode`] is active per tick. [`process`] picks the algorithm
//! for a pair of [`RigidBody`] snapshots and mutates the finite-mass sides.

use thiserror::Error;

use super::rigid_body::RigidBody;

/// Recoverable failures while resolving one pair. Velocities are left untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ResolveError {
    #[error("both bodies of the pair have infinite mass")]
    Degenerate,
    #[error("impulse denominator {denominator} is zero or not finite")]
    NumericDegeneracy { denominator: f32 },
}

/// Collision response algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Reflect each body's velocity about its contact normal and damp its spin.
    Simple,
    /// Treat the other side of every contact as immovable.
    StaticContact,
    /// Coupled impulse between two finite-mass bodies.
    #[default]
    TwoBody,
}

type ResponseFn = fn(&mut RigidBody, &mut RigidBody) -> Result<(), ResolveError>;

const RESPONSES: [ResponseFn; 3] = [simple_response, static_contact_response, two_body_response];

impl ResponseMode {
    pub const ALL: [ResponseMode; 3] = [
        ResponseMode::Simple,
        ResponseMode::StaticContact,
        ResponseMode::TwoBody,
    ];

    /// Numeric setting as exposed to game options (0, 1 or 2).
    pub fn index(self) -> usize {
        match self {
            ResponseMode::Simple => 0,
            ResponseMode::StaticContact => 1,
            ResponseMode::TwoBody => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn response(self) -> ResponseFn {
        RESPONSES[self.index()]
    }
}

/// Resolve one contact between `a` and `b` with the given mode.
///
/// Returns [`ResolveError::Degenerate`] without touching either body when both
/// have infinite mass. The snapshots are not marked in any way, so processing
/// fresh copies of the same snapshots always yields the same result.
pub fn process(
    mode: ResponseMode,
    a: &mut RigidBody,
    b: &mut RigidBody,
) -> Result<(), ResolveError> {
    if a.is_static() && b.is_static() {
        return Err(ResolveError::Degenerate);
    }
    (mode.response())(a, b)
}

fn simple_response(a: &mut RigidBody, b: &mut RigidBody) -> Result<(), ResolveError> {
    a.simple_reflection();
    b.simple_reflection();
    Ok(())
}

fn static_contact_response(a: &mut RigidBody, b: &mut RigidBody) -> Result<(), ResolveError> {
    // Both impulses are computed before either is applied so a failure on one
    // side leaves the pair untouched.
    let impulse_a = a.static_impulse()?;
    let impulse_b = b.static_impulse()?;
    if let Some(impulse) = impulse_a {
        a.apply_impulse(impulse);
    }
    if let Some(impulse) = impulse_b {
        b.apply_impulse(impulse);
    }
    Ok(())
}

fn two_body_response(a: &mut RigidBody, b: &mut RigidBody) -> Result<(), ResolveError> {
    if a.is_static() || b.is_static() {
        return static_contact_response(a, b);
    }
    RigidBody::two_body_response(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::physics::{PhysicalBody, RigidState};
    use crate::physics::rigid_body::Contact;
    use glam::Vec3;

    fn jet(mass: f32, velocity: Vec3, normal: Vec3) -> RigidBody {
        RigidBody::dynamic(
            &PhysicalBody::new_dynamic(mass),
            &RigidState::default().with_velocity(velocity),
            Contact {
                time_scalar: 0.5,
                hit_position: Vec3::ZERO,
                normal,
            },
        )
    }

    fn wall(normal: Vec3) -> RigidBody {
        RigidBody::static_contact(Contact {
            time_scalar: 0.5,
            hit_position: Vec3::ZERO,
            normal,
        })
    }

    #[test]
    fn test_mode_indices() {
        for mode in ResponseMode::ALL {
            assert_eq!(ResponseMode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(ResponseMode::from_index(3), None);
        assert_eq!(ResponseMode::default(), ResponseMode::TwoBody);
    }

    #[test]
    fn test_two_static_bodies_are_degenerate() {
        for mode in ResponseMode::ALL {
            let mut a = RigidBody::unmovable();
            let mut b = wall(Vec3::X);
            let (before_a, before_b) = (a.clone(), b.clone());
            assert_eq!(process(mode, &mut a, &mut b), Err(ResolveError::Degenerate));
            assert_eq!(a, before_a);
            assert_eq!(b, before_b);
        }
    }

    #[test]
    fn test_static_wall_bounce_in_every_mode() {
        for mode in ResponseMode::ALL {
            let mut a = jet(5.0, Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_X);
            let mut b = wall(Vec3::X);
            process(mode, &mut a, &mut b).unwrap();
            assert!(
                (a.velocity - Vec3::new(-10.0, 0.0, 0.0)).length() < 1e-5,
                "{mode:?}: {:?}",
                a.velocity
            );
            assert_eq!(b.velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn test_two_body_mode_exchanges_velocities() {
        let mut a = jet(4.0, Vec3::new(2.0, 0.0, 0.0), Vec3::NEG_X);
        let mut b = jet(4.0, Vec3::new(-2.0, 0.0, 0.0), Vec3::X);
        process(ResponseMode::TwoBody, &mut a, &mut b).unwrap();
        assert!((a.velocity - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((b.velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_static_contact_mode_bounces_each_side_alone() {
        let mut a = jet(1.0, Vec3::new(2.0, 0.0, 0.0), Vec3::NEG_X);
        let mut b = jet(100.0, Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        process(ResponseMode::StaticContact, &mut a, &mut b).unwrap();
        assert!((a.velocity - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((b.velocity - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_process_is_repeatable_on_fresh_copies() {
        let a = jet(2.0, Vec3::new(1.0, 3.0, 0.0), Vec3::NEG_X);
        let b = jet(7.0, Vec3::new(-1.0, 0.0, 0.0), Vec3::X);

        let (mut a1, mut b1) = (a.clone(), b.clone());
        let (mut a2, mut b2) = (a.clone(), b.clone());
        process(ResponseMode::TwoBody, &mut a1, &mut b1).unwrap();
        process(ResponseMode::TwoBody, &mut a2, &mut b2).unwrap();
        assert_eq!(a1.velocity - a.velocity, a2.velocity - a.velocity);
        assert_eq!(b1.velocity - b.velocity, b2.velocity - b.velocity);
    }

    #[test]
    fn test_numeric_failure_leaves_both_sides() {
        let mut a = jet(1.0, Vec3::X, Vec3::NEG_X);
        let mut b = jet(1.0, Vec3::NEG_X, Vec3::X);
        b.mass = 0.0;
        let (before_a, before_b) = (a.clone(), b.clone());
        let result = process(ResponseMode::StaticContact, &mut a, &mut b);
        assert!(matches!(result, Err(ResolveError::NumericDegeneracy { .. })));
        assert_eq!(a, before_a);
        assert_eq!(b, before_b);
    }
}
