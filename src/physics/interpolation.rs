//! Time-indexed pose history for drawing between simulation ticks.

use std::collections::VecDeque;

use thiserror::Error;

use crate::math::Pose;

/// Default number of samples kept per entity.
pub const DEFAULT_HISTORY_LEN: usize = 8;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum HistoryError {
    #[error("no samples recorded yet")]
    Empty,
    #[error("query time {requested} is not finite")]
    NonFinite { requested: f64 },
    #[error("query at {requested} is earlier than the previous query at {last}")]
    NonMonotonic { requested: f64, last: f64 },
}

/// Bounded history of `(time, pose)` samples, oldest first.
///
/// Queries must never go back in time: once `sample(t)` has been asked, any
/// later query earlier than `t` is rejected.
#[derive(Debug, Clone)]
pub struct StateHistory {
    samples: VecDeque<(f64, Pose)>,
    capacity: usize,
    last_query: Option<f64>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LEN)
    }
}

impl StateHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            last_query: None,
        }
    }

    /// Record the pose at `time`. Samples older than the newest one, or at a
    /// non-finite time, are ignored.
    pub fn record(&mut self, time: f64, pose: Pose) {
        if !time.is_finite() {
            return;
        }
        if let Some(&(newest, _)) = self.samples.back() {
            if time < newest {
                return;
            }
            if time == newest {
                self.samples.pop_back();
            }
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((time, pose));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<Pose> {
        self.samples.back().map(|&(_, pose)| pose)
    }

    /// Pose at `time`, interpolated between the bracketing samples and clamped
    /// to the recorded range.
    pub fn sample(&mut self, time: f64) -> Result<Pose, HistoryError> {
        if !time.is_finite() {
            return Err(HistoryError::NonFinite { requested: time });
        }
        if let Some(last) = self.last_query {
            if time < last {
                return Err(HistoryError::NonMonotonic {
                    requested: time,
                    last,
                });
            }
        }

        let (&(first_time, first), &(last_time, last)) =
            match (self.samples.front(), self.samples.back()) {
                (Some(front), Some(back)) => (front, back),
                _ => return Err(HistoryError::Empty),
            };
        self.last_query = Some(time);

        if time <= first_time {
            return Ok(first);
        }
        if time >= last_time {
            return Ok(last);
        }

        let upper = self.samples.partition_point(|&(t, _)| t <= time);
        let (t0, p0) = self.samples[upper - 1];
        let (t1, p1) = self.samples[upper];
        let span = t1 - t0;
        if span <= 0.0 {
            return Ok(p1);
        }
        Ok(p0.lerp(&p1, ((time - t0) / span) as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn at(x: f32) -> Pose {
        Pose::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_interpolates_between_samples() {
        let mut history = StateHistory::default();
        history.record(0.0, at(0.0));
        history.record(1.0, at(10.0));
        history.record(2.0, at(30.0));

        let pose = history.sample(0.5).unwrap();
        assert!((pose.position.x - 5.0).abs() < 1e-5);
        let pose = history.sample(1.5).unwrap();
        assert!((pose.position.x - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamps_outside_range() {
        let mut history = StateHistory::default();
        history.record(1.0, at(1.0));
        history.record(2.0, at(2.0));
        assert_eq!(history.sample(0.0).unwrap(), at(1.0));
        assert_eq!(history.sample(9.0).unwrap(), at(2.0));
    }

    #[test]
    fn test_rejects_going_back_in_time() {
        let mut history = StateHistory::default();
        history.record(0.0, at(0.0));
        history.record(1.0, at(1.0));
        history.sample(0.8).unwrap();
        assert_eq!(
            history.sample(0.4),
            Err(HistoryError::NonMonotonic {
                requested: 0.4,
                last: 0.8
            })
        );
        assert!(history.sample(0.8).is_ok());
    }

    #[test]
    fn test_rejects_non_finite_time() {
        let mut history = StateHistory::default();
        history.record(0.0, at(0.0));
        history.record(1.0, at(1.0));
        history.record(f64::NAN, at(9.0));
        assert_eq!(history.len(), 2);

        history.sample(0.9).unwrap();
        assert!(matches!(
            history.sample(f64::NAN),
            Err(HistoryError::NonFinite { .. })
        ));
        assert_eq!(
            history.sample(f64::INFINITY),
            Err(HistoryError::NonFinite {
                requested: f64::INFINITY
            })
        );
        // The rejected queries do not reset the monotonic guard.
        assert_eq!(
            history.sample(0.1),
            Err(HistoryError::NonMonotonic {
                requested: 0.1,
                last: 0.9
            })
        );
    }

    #[test]
    fn test_empty_history() {
        let mut history = StateHistory::default();
        assert_eq!(history.sample(0.0), Err(HistoryError::Empty));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = StateHistory::with_capacity(3);
        for i in 0..5 {
            history.record(i as f64, at(i as f32));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.sample(0.0).unwrap(), at(2.0));
        assert_eq!(history.latest(), Some(at(4.0)));
    }
}
