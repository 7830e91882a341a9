//! Anything with a shape and a placement that moving hitpoints can strike.

use std::sync::Arc;

use glam::Vec3;

use crate::math::Pose;

use super::collision::{Collision, Extreme};
use super::shape::Shape;

/// A shape placed in the world over one tick.
///
/// `pose` is the placement at the start of the tick and `next_pose` the
/// extrapolated placement at its end. Static objects keep the default
/// `next_pose`, which is `pose`.
pub trait Touchable {
    fn shape(&self) -> &Shape;

    fn pose(&self) -> Pose;

    fn next_pose(&self) -> Pose {
        self.pose()
    }

    /// Placement a fraction `t` through the tick.
    fn pose_at(&self, t: f32) -> Pose {
        self.pose().lerp(&self.next_pose(), t)
    }

    /// Earliest collision of any swept hitpoint with this object's shape.
    ///
    /// Each pair is `(previous, next)` in world space. Previous endpoints are
    /// taken into local space with `pose`, next endpoints with `next_pose`, so
    /// the object's own motion is part of the segment. The result is in world
    /// space.
    fn test_hitpoints(&self, hitpoints: &[(Vec3, Vec3)]) -> Option<Collision> {
        let from = self.pose();
        let to = self.next_pose();
        let shape = self.shape();

        let mut earliest = Extreme::new();
        for &(previous, next) in hitpoints {
            let start = from.to_local(previous);
            let end = to.to_local(next);
            earliest.offer_opt(shape.maximum_movement(start, end - start));
        }

        earliest.into_inner().map(|local: Collision| {
            let at = self.pose_at(local.time_to_impact);
            Collision::new(
                local.time_to_impact,
                at.rotate(local.normal),
                at.to_world(local.hit_pos),
            )
        })
    }
}

/// Immovable scenery.
#[derive(Debug, Clone)]
pub struct StaticBody {
    pub shape: Arc<Shape>,
    pub pose: Pose,
}

impl StaticBody {
    pub fn new(shape: Arc<Shape>, pose: Pose) -> Self {
        Self { shape, pose }
    }
}

impl Touchable for StaticBody {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn pose(&self) -> Pose {
        self.pose
    }
}

/// A borrowed shape moving from one pose to another during a tick.
#[derive(Debug, Clone, Copy)]
pub struct Placed<'a> {
    pub shape: &'a Shape,
    pub from: Pose,
    pub to: Pose,
}

impl<'a> Placed<'a> {
    pub fn new(shape: &'a Shape, from: Pose, to: Pose) -> Self {
        Self { shape, from, to }
    }

    /// A placement that does not move during the tick.
    pub fn fixed(shape: &'a Shape, pose: Pose) -> Self {
        Self {
            shape,
            from: pose,
            to: pose,
        }
    }
}

impl Touchable for Placed<'_> {
    fn shape(&self) -> &Shape {
        self.shape
    }

    fn pose(&self) -> Pose {
        self.from
    }

    fn next_pose(&self) -> Pose {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_static_body_reports_world_hit() {
        // Wall at world x = 10.5, built at local x = 0.5.
        let shape = Arc::new(Shape::square(Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_X, 5.0).unwrap());
        let wall = StaticBody::new(shape, Pose::from_position(Vec3::new(10.0, 0.0, 0.0)));

        let hit = wall
            .test_hitpoints(&[(Vec3::new(10.0, 1.0, 0.0), Vec3::new(11.0, 1.0, 0.0))])
            .unwrap();
        assert!((hit.time_to_impact - 0.5).abs() < 1e-5);
        assert!((hit.hit_pos - Vec3::new(10.5, 1.0, 0.0)).length() < 1e-5);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_rotated_body_rotates_normal() {
        let shape = Shape::square(Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_X, 5.0).unwrap();
        // Quarter turn about Y maps local -X onto world -Z.
        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2));
        let placed = Placed::fixed(&shape, pose);
        let wall_center = pose.to_world(Vec3::new(0.5, 0.0, 0.0));
        let normal = pose.rotate(Vec3::NEG_X);

        let start = wall_center + normal;
        let hit = placed.test_hitpoints(&[(start, start - normal * 2.0)]).unwrap();
        assert!((hit.time_to_impact - 0.5).abs() < 1e-5);
        assert!((hit.normal - normal).length() < 1e-5);
        assert!((hit.hit_pos - wall_center).length() < 1e-4);
    }

    #[test]
    fn test_earliest_hitpoint_wins() {
        let shape = Shape::square(Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_X, 5.0).unwrap();
        let placed = Placed::fixed(&shape, Pose::IDENTITY);
        let hit = placed
            .test_hitpoints(&[
                (Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
                (Vec3::new(0.3, 1.0, 0.0), Vec3::new(1.3, 1.0, 0.0)),
                (Vec3::new(-2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
            ])
            .unwrap();
        assert!((hit.time_to_impact - 0.2).abs() < 1e-5);
        assert!((hit.hit_pos - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_moving_target_sweeps_into_still_point() {
        // The point never moves, the wall slides over it.
        let shape = Shape::square(Vec3::ZERO, Vec3::NEG_X, 5.0).unwrap();
        let placed = Placed::new(
            &shape,
            Pose::from_position(Vec3::new(1.0, 0.0, 0.0)),
            Pose::from_position(Vec3::new(-1.0, 0.0, 0.0)),
        );
        let hit = placed.test_hitpoints(&[(Vec3::ZERO, Vec3::ZERO)]).unwrap();
        assert!((hit.time_to_impact - 0.5).abs() < 1e-5);
        assert!(hit.hit_pos.length() < 1e-5);
    }

    #[test]
    fn test_no_hitpoints_no_collision() {
        let shape = Shape::cuboid(Vec3::ONE).unwrap();
        assert!(Placed::fixed(&shape, Pose::IDENTITY).test_hitpoints(&[]).is_none());
    }
}
