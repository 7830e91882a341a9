//! Per-tick cache of swept hitpoints for a moving entity.

use glam::Vec3;

use crate::math::Pose;

use super::shape::Shape;

/// World-space `(previous, next)` positions of every shape vertex for one tick.
///
/// The pairs are computed lazily on first request for a tick and reused until
/// [`begin_tick`](Self::begin_tick) moves the tracker to a new tick.
#[derive(Debug, Clone, Default)]
pub struct HitpointTracker {
    tick: Option<u64>,
    cached: Option<u64>,
    pairs: Vec<(Vec3, Vec3)>,
}

impl HitpointTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new tick, dropping any pairs cached for an earlier one.
    pub fn begin_tick(&mut self, tick: u64) {
        if self.tick != Some(tick) {
            self.tick = Some(tick);
            self.invalidate();
        }
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
        self.pairs.clear();
    }

    /// Swept hitpoints of `shape` moving from `from` to `to` during `tick`.
    pub fn hitpoints(&mut self, tick: u64, shape: &Shape, from: Pose, to: Pose) -> &[(Vec3, Vec3)] {
        self.begin_tick(tick);
        if self.cached != Some(tick) {
            self.pairs.extend(
                shape
                    .points()
                    .iter()
                    .map(|&p| (from.to_world(p), to.to_world(p))),
            );
            self.cached = Some(tick);
        }
        &self.pairs
    }

    /// Pairs computed for `tick`, if any.
    pub fn cached(&self, tick: u64) -> Option<&[(Vec3, Vec3)]> {
        (self.cached == Some(tick)).then_some(self.pairs.as_slice())
    }
}
