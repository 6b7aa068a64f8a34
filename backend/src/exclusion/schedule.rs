//! Half-width schedule
//!
//! Piecewise step function from priority to exclusion half-width.
//! Tiers are kept sorted by descending threshold and the last tier is
//! always threshold 0, so every non-negative priority maps to exactly one
//! tier.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building or querying a schedule
#[derive(Debug, Error, PartialEq)]
pub enum ExclusionError {
    #[error("Half-width schedule is empty")]
    EmptySchedule,

    #[error("Priority {priority} is below the lowest schedule threshold {lowest}")]
    PriorityOutOfRange { priority: i64, lowest: i64 },

    #[error("Schedule threshold must be non-negative, got {0}")]
    NegativeThreshold(i64),

    #[error("Half-width for threshold {threshold} must be finite and non-negative, got {half_width}")]
    InvalidHalfWidth { threshold: i64, half_width: f64 },

    #[error("Schedule threshold {0} appears more than once")]
    DuplicateThreshold(i64),
}

/// One step of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Lowest priority (inclusive) that falls in this tier
    pub threshold: i64,

    /// Latitude half-width in degrees
    pub half_width: f64,
}

/// Ordered priority → half-width table
///
/// # Example
/// ```
/// use orbit_deconflict_core_rs::HalfWidthSchedule;
///
/// let schedule = HalfWidthSchedule::new(vec![(10_000, 40.0), (5_000, 20.0)]).unwrap();
/// assert_eq!(schedule.half_width(16_500).unwrap(), 40.0);
/// assert_eq!(schedule.half_width(7_000).unwrap(), 20.0);
/// assert_eq!(schedule.half_width(100).unwrap(), 0.0);
/// assert!(schedule.half_width(-1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(i64, f64)>", into = "Vec<(i64, f64)>")]
pub struct HalfWidthSchedule {
    /// Descending by threshold, last threshold is 0
    tiers: Vec<Tier>,
}

impl HalfWidthSchedule {
    /// Build a schedule from `(threshold, half_width)` pairs in any order
    ///
    /// A `(0, 0.0)` floor is appended when no pair has threshold 0.
    pub fn new(pairs: Vec<(i64, f64)>) -> Result<Self, ExclusionError> {
        let mut tiers = Vec::with_capacity(pairs.len() + 1);
        for (threshold, half_width) in pairs {
            if threshold < 0 {
                return Err(ExclusionError::NegativeThreshold(threshold));
            }
            if !half_width.is_finite() || half_width < 0.0 {
                return Err(ExclusionError::InvalidHalfWidth {
                    threshold,
                    half_width,
                });
            }
            tiers.push(Tier {
                threshold,
                half_width,
            });
        }

        tiers.sort_by(|a, b| b.threshold.cmp(&a.threshold));
        if let Some(pair) = tiers.windows(2).find(|w| w[0].threshold == w[1].threshold) {
            return Err(ExclusionError::DuplicateThreshold(pair[0].threshold));
        }
        if tiers.last().map_or(true, |tier| tier.threshold != 0) {
            tiers.push(Tier {
                threshold: 0,
                half_width: 0.0,
            });
        }

        Ok(Self { tiers })
    }

    /// Same half-width for every non-negative priority
    pub fn uniform(half_width: f64) -> Result<Self, ExclusionError> {
        Self::new(vec![(0, half_width)])
    }

    /// Schedule that excludes only the exact point
    pub fn point() -> Self {
        Self {
            tiers: vec![Tier {
                threshold: 0,
                half_width: 0.0,
            }],
        }
    }

    /// Tiers, highest threshold first
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Half-width for a priority
    ///
    /// Scans from the highest tier down and returns the first tier whose
    /// threshold the priority reaches.
    pub fn half_width(&self, priority: i64) -> Result<f64, ExclusionError> {
        let lowest = self.tiers.last().ok_or(ExclusionError::EmptySchedule)?;
        self.tiers
            .iter()
            .find(|tier| tier.threshold <= priority)
            .map(|tier| tier.half_width)
            .ok_or(ExclusionError::PriorityOutOfRange {
                priority,
                lowest: lowest.threshold,
            })
    }
}

impl Default for HalfWidthSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![Tier {
                threshold: 0,
                half_width: 40.0,
            }],
        }
    }
}

impl TryFrom<Vec<(i64, f64)>> for HalfWidthSchedule {
    type Error = ExclusionError;

    fn try_from(pairs: Vec<(i64, f64)>) -> Result<Self, Self::Error> {
        Self::new(pairs)
    }
}

impl From<HalfWidthSchedule> for Vec<(i64, f64)> {
    fn from(schedule: HalfWidthSchedule) -> Self {
        schedule
            .tiers
            .into_iter()
            .map(|tier| (tier.threshold, tier.half_width))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_tier_is_appended_and_order_is_descending() {
        let schedule = HalfWidthSchedule::new(vec![(100, 5.0), (1_000, 10.0)]).unwrap();
        let thresholds: Vec<i64> = schedule.tiers().iter().map(|t| t.threshold).collect();
        assert_eq!(thresholds, vec![1_000, 100, 0]);
        assert_eq!(schedule.tiers()[2].half_width, 0.0);
    }

    #[test]
    fn explicit_zero_tier_keeps_its_width() {
        let schedule = HalfWidthSchedule::new(vec![(0, 40.0)]).unwrap();
        assert_eq!(schedule.tiers().len(), 1);
        assert_eq!(schedule.half_width(0).unwrap(), 40.0);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let schedule = HalfWidthSchedule::new(vec![(100, 5.0)]).unwrap();
        assert_eq!(schedule.half_width(100).unwrap(), 5.0);
        assert_eq!(schedule.half_width(99).unwrap(), 0.0);
    }

    #[test]
    fn empty_schedule_lookup_fails() {
        let schedule = HalfWidthSchedule { tiers: Vec::new() };
        assert_eq!(schedule.half_width(10), Err(ExclusionError::EmptySchedule));
    }

    #[test]
    fn bad_tiers_are_rejected() {
        assert_eq!(
            HalfWidthSchedule::new(vec![(-5, 1.0)]),
            Err(ExclusionError::NegativeThreshold(-5))
        );
        assert!(matches!(
            HalfWidthSchedule::new(vec![(5, -1.0)]),
            Err(ExclusionError::InvalidHalfWidth { .. })
        ));
        assert_eq!(
            HalfWidthSchedule::new(vec![(5, 1.0), (5, 2.0)]),
            Err(ExclusionError::DuplicateThreshold(5))
        );
    }
}
