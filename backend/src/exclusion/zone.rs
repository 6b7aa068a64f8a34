//! Exclusion zone
//!
//! Union of closed latitude intervals, kept merged so no two stored
//! intervals overlap or touch.

use crate::exclusion::schedule::{ExclusionError, HalfWidthSchedule};
use serde::{Deserialize, Serialize};

/// Closed interval `[lower, upper]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn contains(&self, point: f64) -> bool {
        point >= self.lower && point <= self.upper
    }
}

/// Latitude exclusion tracker
///
/// # Example
/// ```
/// use orbit_deconflict_core_rs::{ExclusionZone, HalfWidthSchedule};
///
/// let schedule = HalfWidthSchedule::uniform(10.0).unwrap();
/// let mut zone = ExclusionZone::new(schedule);
/// zone.add(0.0, 100).unwrap();
/// zone.add(15.0, 100).unwrap();
///
/// // [-10, 10] and [5, 25] merge into one interval
/// assert_eq!(zone.len(), 1);
/// assert!(zone.contains(25.0));
/// assert!(!zone.contains(25.5));
/// ```
#[derive(Debug, Clone)]
pub struct ExclusionZone {
    schedule: HalfWidthSchedule,
    intervals: Vec<Interval>,
}

impl ExclusionZone {
    pub fn new(schedule: HalfWidthSchedule) -> Self {
        Self {
            schedule,
            intervals: Vec::new(),
        }
    }

    /// Exclude `[point − hw, point + hw]` where `hw` comes from the
    /// schedule tier of `priority`
    pub fn add(&mut self, point: f64, priority: i64) -> Result<(), ExclusionError> {
        let half_width = self.schedule.half_width(priority)?;
        self.intervals.push(Interval {
            lower: point - half_width,
            upper: point + half_width,
        });
        self.merge();
        Ok(())
    }

    /// Inclusive membership test
    pub fn contains(&self, point: f64) -> bool {
        self.intervals.iter().any(|interval| interval.contains(point))
    }

    pub fn schedule(&self) -> &HalfWidthSchedule {
        &self.schedule
    }

    /// Merged intervals, ascending
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Sweep-line merge
    fn merge(&mut self) {
        self.intervals.sort_by(|a, b| a.lower.total_cmp(&b.lower));

        let mut merged: Vec<Interval> = Vec::with_capacity(self.intervals.len());
        for interval in self.intervals.drain(..) {
            match merged.last_mut() {
                // sorted, so last.lower <= interval.lower
                Some(last) if interval.lower <= last.upper => {
                    last.upper = last.upper.max(interval.upper);
                }
                _ => merged.push(interval),
            }
        }
        self.intervals = merged;
    }
}
