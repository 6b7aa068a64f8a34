//! High-Altitude Override
//!
//! Keeps polar requests that have plenty of other chances to run.
//!
//! # Behavior
//!
//! - |latitude| must exceed 65°
//! - the request must list more than 3 alternate cycles
//! - the kept request gets the configured literal priority
//!
//! Kept requests neither count against the cap nor exclude later
//! requests.

use super::{CycleContext, OverrideDecision, OverridePolicy, OverrideReason};
use crate::exclusion::ExclusionError;
use crate::models::request::Request;
use tracing::info;

/// Latitude magnitude above which the override applies (degrees)
pub const HIGH_ALTITUDE_LATITUDE: f64 = 65.0;

/// Alternate cycles a request must exceed to qualify
pub const MIN_ALTERNATES: usize = 3;

/// High-altitude override
///
/// # Example
///
/// ```
/// use orbit_deconflict_core_rs::policy::{CycleContext, HighAltitudePolicy, OverridePolicy};
/// use orbit_deconflict_core_rs::{CycleId, Request};
///
/// let mut policy = HighAltitudePolicy::new(1);
/// let context = CycleContext { cycle: CycleId(7), accepted: &[] };
///
/// let polar = Request::new("polar", CycleId(7), 500, 70.0).with_alternate_count(5);
/// let decision = policy.evaluate(&polar, 500, &context).unwrap().unwrap();
/// assert_eq!(decision.priority, 1);
///
/// let temperate = Request::new("temperate", CycleId(7), 500, 40.0).with_alternate_count(5);
/// assert!(policy.evaluate(&temperate, 500, &context).unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct HighAltitudePolicy {
    /// Priority given to overridden requests
    override_priority: i64,
}

impl HighAltitudePolicy {
    pub fn new(override_priority: i64) -> Self {
        Self { override_priority }
    }

    /// Whether a request qualifies, independent of the cycle
    pub fn qualifies(request: &Request) -> bool {
        request.latitude().abs() > HIGH_ALTITUDE_LATITUDE && request.alternate_count() > MIN_ALTERNATES
    }
}

impl OverridePolicy for HighAltitudePolicy {
    fn name(&self) -> &'static str {
        "high_altitude"
    }

    fn evaluate(
        &mut self,
        candidate: &Request,
        rank: i64,
        context: &CycleContext<'_>,
    ) -> Result<Option<OverrideDecision>, ExclusionError> {
        if !Self::qualifies(candidate) {
            return Ok(None);
        }

        info!(
            cycle = %context.cycle,
            request_id = candidate.id(),
            latitude = candidate.latitude(),
            alternates = candidate.alternate_count(),
            rank,
            priority = self.override_priority,
            "High-altitude override: keeping request outside the cycle cap"
        );

        Ok(Some(OverrideDecision {
            priority: self.override_priority,
            reason: OverrideReason::HighAltitude,
        }))
    }
}
