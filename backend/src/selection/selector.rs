//! Cycle Selector
//!
//! Greedy, priority-ordered selection of the requests in one cycle.
//!
//! # Selection Flow
//!
//! ```text
//! requests ──┬─ priority < 0 ──────────────────────────────► passed through
//!            └─ priority ≥ 0 ─► group by priority
//!                               └─ tie-break groups of size > 1
//!                                  └─ walk by descending rank
//!                                     ├─ under cap and not excluded ─► accept
//!                                     ├─ override policy keeps it ───► keep
//!                                     └─ otherwise ──────────────────► reject
//!                                                                      └─ linked? ─► conflict
//! ```
//!
//! This is a heuristic, not an optimal assignment: the highest-ranked
//! request always takes its slot even when skipping it would let more
//! requests fit.
//!
//! # Critical Invariants
//!
//! - **Cap**: at most `per_cycle_cap` requests are accepted under the base
//!   rule; overridden requests are not counted
//! - **Pass-through**: requests that arrive negative leave unchanged
//! - **Conflict is not an error**: a rejected linked request ends the
//!   cycle with `CycleOutcome::Conflict`

use crate::exclusion::{ExclusionError, ExclusionZone, HalfWidthSchedule};
use crate::models::event::{DeconflictEvent, EventLog};
use crate::models::request::{CycleId, Request};
use crate::policy::{
    AcceptedRequest, CycleContext, HighAltitudePolicy, HighRollPolicy, OverrideDecision,
    OverridePolicy, OverrideReason,
};
use crate::tiebreak::{rewrite_group, TieBreak};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Per-cycle selection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum requests accepted per cycle under the base rule
    pub per_cycle_cap: usize,

    /// Priority tier → exclusion half-width
    pub half_width_schedule: HalfWidthSchedule,

    /// Literal priority given by the high-altitude override (None = disabled)
    pub high_altitude_override: Option<i64>,

    /// Neighbour |roll| threshold for the high-roll override (None = disabled)
    pub high_roll_threshold: Option<f64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            per_cycle_cap: 4,
            half_width_schedule: HalfWidthSchedule::default(),
            high_altitude_override: None,
            high_roll_threshold: None,
        }
    }
}

impl SelectionConfig {
    /// Enabled override policies, in the order they are consulted
    pub fn override_policies(&self) -> Vec<Box<dyn OverridePolicy>> {
        let mut policies: Vec<Box<dyn OverridePolicy>> = Vec::new();
        if let Some(priority) = self.high_altitude_override {
            policies.push(Box::new(HighAltitudePolicy::new(priority)));
        }
        if let Some(threshold) = self.high_roll_threshold {
            policies.push(Box::new(HighRollPolicy::new(threshold)));
        }
        policies
    }
}

/// A rejected request that is half of a linked pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConflict {
    pub cycle: CycleId,
    pub rejected_id: String,
    pub pair_id: String,
    pub partner_id: String,
}

/// Fully selected cycle
#[derive(Debug, Clone)]
pub struct CycleResolution {
    pub cycle: CycleId,

    /// Every request of the cycle, ordered by final priority (descending)
    pub requests: Vec<Request>,

    /// Requests accepted under the base rule
    pub accepted_count: usize,

    /// Requests kept by an override policy
    pub overridden_count: usize,

    pub events: EventLog,
}

/// Result of selecting one cycle
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Resolved(CycleResolution),

    /// A linked request was rejected; the whole pass must restart
    Conflict(LinkConflict),
}

/// Give every candidate a rank
///
/// Candidates are grouped by priority; each group of more than one is
/// tie-broken against the next distinct candidate priority. The result
/// is ordered by descending rank, and tied requests keep the rewriter's
/// order.
fn rank_candidates(cycle: CycleId, candidates: Vec<Request>, events: &mut EventLog) -> Vec<Request> {
    let mut groups: BTreeMap<i64, Vec<Request>> = BTreeMap::new();
    for request in candidates {
        groups.entry(request.priority()).or_default().push(request);
    }
    let priorities: Vec<i64> = groups.keys().copied().collect();

    let mut ranked = Vec::new();
    for (index, (priority, group)) in groups.into_iter().enumerate() {
        if group.len() == 1 {
            ranked.extend(group);
            continue;
        }

        let next = priorities.get(index + 1).copied();
        let rewrite = rewrite_group(group, priority, next);
        if let TieBreak::LeftTied { base, count, next } = rewrite.outcome {
            events.log(DeconflictEvent::TieLeft {
                cycle,
                priority: base,
                count,
                next,
            });
        }
        ranked.extend(rewrite.requests);
    }

    // stable: tied requests keep the rewriter's order
    ranked.sort_by(|a, b| b.priority().cmp(&a.priority()));
    ranked
}

/// Select the requests of one cycle
///
/// # Arguments
///
/// * `cycle` - Cycle being selected (all `requests` belong to it)
/// * `requests` - Every request of the cycle, any order
/// * `config` - Cap, half-width schedule and override settings
///
/// # Returns
///
/// - `Ok(CycleOutcome::Resolved)` with every request annotated
/// - `Ok(CycleOutcome::Conflict)` as soon as a linked request is rejected
/// - `Err(ExclusionError)` if a rank has no half-width tier
///
/// # Example
///
/// ```rust
/// use orbit_deconflict_core_rs::{select_cycle, CycleId, CycleOutcome, Request, SelectionConfig};
///
/// let config = SelectionConfig { per_cycle_cap: 1, ..Default::default() };
/// let requests = vec![
///     Request::new("north", CycleId(3), 900, 60.0),
///     Request::new("south", CycleId(3), 800, -60.0),
/// ];
///
/// let CycleOutcome::Resolved(resolution) = select_cycle(CycleId(3), requests, &config).unwrap() else {
///     panic!("no linked requests, no conflict");
/// };
/// assert_eq!(resolution.requests[0].priority(), 900);
/// assert_eq!(resolution.requests[1].priority(), -800);
/// ```
pub fn select_cycle(
    cycle: CycleId,
    requests: Vec<Request>,
    config: &SelectionConfig,
) -> Result<CycleOutcome, ExclusionError> {
    let mut events = EventLog::new();

    let (resolved, candidates): (Vec<Request>, Vec<Request>) =
        requests.into_iter().partition(Request::is_rejected);
    let ranked = rank_candidates(cycle, candidates, &mut events);

    let mut zone = ExclusionZone::new(config.half_width_schedule.clone());
    let mut policies = config.override_policies();
    let mut accepted: Vec<AcceptedRequest> = Vec::new();
    let mut overridden_count = 0;
    let mut output = Vec::with_capacity(ranked.len() + resolved.len());

    for mut request in ranked {
        let rank = request.priority();

        if accepted.len() < config.per_cycle_cap && !zone.contains(request.latitude()) {
            zone.add(request.latitude(), rank)?;
            accepted.push(AcceptedRequest::from_request(&request, rank));
            debug!(%cycle, request_id = request.id(), rank, "Accepted");
            events.log(DeconflictEvent::Accepted {
                cycle,
                request_id: request.id().to_string(),
                rank,
            });
            output.push(request);
            continue;
        }

        let context = CycleContext {
            cycle,
            accepted: &accepted,
        };
        let mut decision: Option<OverrideDecision> = None;
        for policy in policies.iter_mut() {
            if let Some(kept) = policy.evaluate(&request, rank, &context)? {
                decision = Some(kept);
                break;
            }
        }

        if let Some(decision) = decision {
            request.set_priority(decision.priority);
            overridden_count += 1;
            events.log(match decision.reason {
                OverrideReason::HighAltitude => DeconflictEvent::HighAltitudeOverride {
                    cycle,
                    request_id: request.id().to_string(),
                    priority: decision.priority,
                },
                OverrideReason::HighRoll { neighbor_id } => DeconflictEvent::HighRollOverride {
                    cycle,
                    request_id: request.id().to_string(),
                    neighbor_id,
                    rank,
                },
            });
            output.push(request);
            continue;
        }

        request.set_priority(-rank);
        debug!(%cycle, request_id = request.id(), rank, "Rejected");
        events.log(DeconflictEvent::Rejected {
            cycle,
            request_id: request.id().to_string(),
            rank,
        });

        if let Some(tag) = request.link_tag() {
            return Ok(CycleOutcome::Conflict(LinkConflict {
                cycle,
                rejected_id: request.id().to_string(),
                pair_id: tag.pair_id.clone(),
                partner_id: tag.partner_id.clone(),
            }));
        }
        output.push(request);
    }

    output.extend(resolved);
    output.sort_by(|a, b| b.priority().cmp(&a.priority()));

    Ok(CycleOutcome::Resolved(CycleResolution {
        cycle,
        requests: output,
        accepted_count: accepted.len(),
        overridden_count,
        events,
    }))
}
