//! Collision records and the running-minimum accumulator used to pick the
//! earliest one.

use std::cmp::Ordering;

use glam::Vec3;

/// One candidate or confirmed contact found by a swept test.
///
/// Collisions compare and order by `time_to_impact` alone, so the earliest
/// collision is always the smallest.
#[derive(Debug, Clone, Copy)]
pub struct Collision {
    /// Fraction of the step at which contact happens, in `(0, 1]`.
    pub time_to_impact: f32,
    /// Unit normal of the struck surface.
    pub normal: Vec3,
    /// Contact position. Local to the struck shape when produced by
    /// [`Shape::maximum_movement`](super::shape::Shape::maximum_movement),
    /// world space once a touchable has mapped it back.
    pub hit_pos: Vec3,
}

impl Collision {
    pub fn new(time_to_impact: f32, normal: Vec3, hit_pos: Vec3) -> Self {
        Self {
            time_to_impact,
            normal,
            hit_pos,
        }
    }

    /// Whether this collision happens strictly before `other`.
    pub fn is_before(&self, other: &Collision) -> bool {
        self < other
    }
}

impl PartialEq for Collision {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Collision {}

impl PartialOrd for Collision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Collision {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time_to_impact.total_cmp(&other.time_to_impact)
    }
}

/// The confirmed earliest collision of an entity for one tick.
#[derive(Debug, Clone, Copy)]
pub struct Crash {
    /// The entity that was struck.
    pub other: hecs::Entity,
    pub collision: Collision,
}

impl PartialEq for Crash {
    fn eq(&self, other: &Self) -> bool {
        self.collision == other.collision
    }
}

impl Eq for Crash {}

impl PartialOrd for Crash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Crash {
    fn cmp(&self, other: &Self) -> Ordering {
        self.collision.cmp(&other.collision)
    }
}

/// Keeps only the smallest value offered so far.
///
/// Ties keep the value that arrived first.
#[derive(Debug, Clone)]
pub struct Extreme<T> {
    current: Option<T>,
}

impl<T> Default for Extreme<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T: Ord> Extreme<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate. Returns `true` if it became the new minimum.
    pub fn offer(&mut self, candidate: T) -> bool {
        match &self.current {
            Some(best) if *best <= candidate => false,
            _ => {
                self.current = Some(candidate);
                true
            }
        }
    }

    /// Offer an optional candidate; `None` never replaces a present value.
    pub fn offer_opt(&mut self, candidate: Option<T>) -> bool {
        candidate.is_some_and(|c| self.offer(c))
    }

    pub fn get(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn take(&mut self) -> Option<T> {
        self.current.take()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn into_inner(self) -> Option<T> {
        self.current
    }
}

impl<T: Ord> Extend<T> for Extreme<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.offer(item);
        }
    }
}

impl<T: Ord> FromIterator<T> for Extreme<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut extreme = Self::new();
        extreme.extend(iter);
        extreme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(t: f32) -> Collision {
        Collision::new(t, Vec3::X, Vec3::ZERO)
    }

    #[test]
    fn test_earliest_of_three() {
        let extreme: Extreme<Collision> = [0.9, 0.3, 0.6].into_iter().map(at).collect();
        assert!((extreme.get().unwrap().time_to_impact - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_absent_is_later_than_present() {
        let mut extreme = Extreme::new();
        assert!(extreme.offer_opt(Some(at(0.8))));
        assert!(!extreme.offer_opt(None));
        assert!((extreme.get().unwrap().time_to_impact - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ties_keep_first() {
        let mut extreme = Extreme::new();
        extreme.offer(Collision::new(0.5, Vec3::X, Vec3::ONE));
        assert!(!extreme.offer(Collision::new(0.5, Vec3::Y, Vec3::ZERO)));
        assert_eq!(extreme.get().unwrap().normal, Vec3::X);
    }

    #[test]
    fn test_take_and_clear() {
        let mut extreme: Extreme<Collision> = [at(0.4)].into_iter().collect();
        assert!(extreme.take().is_some());
        assert!(extreme.is_empty());
        extreme.offer(at(0.1));
        extreme.clear();
        assert!(extreme.into_inner().is_none());
    }

    #[test]
    fn test_ordering() {
        assert!(at(0.2).is_before(&at(0.7)));
        assert!(!at(0.7).is_before(&at(0.7)));
        assert_eq!(at(0.7).cmp(&at(0.2)), Ordering::Greater);
    }
}
