//! High-Roll Override
//!
//! A steeply rolled accepted observation leaves room for a near-nadir
//! observation at about the same latitude.
//!
//! # Behavior
//!
//! - candidate |roll| must be below 5°
//! - scan accepted requests in ascending input order for one within 5°
//!   of latitude whose |roll| exceeds the threshold
//! - each neighbour can enable at most one override; its latitude is
//!   flagged in a separate override tracker
//! - the kept request keeps its tie-broken rank

use super::{AcceptedRequest, CycleContext, OverrideDecision, OverridePolicy, OverrideReason};
use crate::exclusion::{ExclusionError, ExclusionZone, HalfWidthSchedule};
use crate::models::request::Request;
use tracing::info;

/// Candidate |roll| must be below this (degrees)
pub const LOW_ROLL_LIMIT: f64 = 5.0;

/// Maximum latitude distance to the enabling neighbour (degrees)
pub const NEIGHBOR_LATITUDE_WINDOW: f64 = 5.0;

/// High-roll override
#[derive(Debug, Clone)]
pub struct HighRollPolicy {
    /// Neighbour |roll| must exceed this (degrees)
    roll_threshold: f64,

    /// Latitudes of neighbours that already enabled an override
    flagged: ExclusionZone,
}

impl HighRollPolicy {
    pub fn new(roll_threshold: f64) -> Self {
        Self {
            roll_threshold,
            flagged: ExclusionZone::new(HalfWidthSchedule::point()),
        }
    }

    fn is_enabling_neighbor(&self, neighbor: &AcceptedRequest, candidate: &Request) -> bool {
        (neighbor.latitude - candidate.latitude()).abs() <= NEIGHBOR_LATITUDE_WINDOW
            && neighbor.roll_angle.abs() > self.roll_threshold
            && !self.flagged.contains(neighbor.latitude)
    }
}

impl OverridePolicy for HighRollPolicy {
    fn name(&self) -> &'static str {
        "high_roll"
    }

    fn evaluate(
        &mut self,
        candidate: &Request,
        rank: i64,
        context: &CycleContext<'_>,
    ) -> Result<Option<OverrideDecision>, ExclusionError> {
        if candidate.roll_angle().abs() >= LOW_ROLL_LIMIT {
            return Ok(None);
        }

        let mut neighbors: Vec<&AcceptedRequest> = context.accepted.iter().collect();
        neighbors.sort_by_key(|neighbor| neighbor.position);

        let Some(neighbor) = neighbors
            .into_iter()
            .find(|neighbor| self.is_enabling_neighbor(neighbor, candidate))
        else {
            return Ok(None);
        };

        self.flagged.add(neighbor.latitude, 0)?;

        info!(
            cycle = %context.cycle,
            request_id = candidate.id(),
            neighbor_id = %neighbor.id,
            neighbor_roll = neighbor.roll_angle,
            rank,
            "High-roll override: keeping request beside a high-roll neighbour"
        );

        Ok(Some(OverrideDecision {
            priority: rank,
            reason: OverrideReason::HighRoll {
                neighbor_id: neighbor.id.clone(),
            },
        }))
    }
}
