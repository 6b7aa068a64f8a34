//! Tie-break rewriter
//!
//! Requests sharing one priority are spread over consecutive values,
//! ordered by distance from the equator: the request farthest from the
//! equator keeps the base value and the most equatorial one gets the
//! highest, so equatorial requests win ties.
//!
//! When the group does not fit below the next distinct priority the
//! group is left tied. That is a soft failure: it is logged and callers
//! must keep treating the requests as tied.

use crate::models::request::Request;
use crate::tiebreak::reset::{ResetMap, TieBreakError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// How a group was handled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Group received `base, base + 1, ...`
    Rewritten { base: i64, count: usize },

    /// Not enough room below `next` (`i64::MAX` for the top group); priorities untouched
    LeftTied { base: i64, count: usize, next: i64 },
}

/// Result of rewriting one group
#[derive(Debug, Clone)]
pub struct GroupRewrite {
    /// Requests in rewrite order (descending |latitude|)
    pub requests: Vec<Request>,

    pub outcome: TieBreak,
}

/// Whether `count` consecutive values starting at `base` fit below `next`
///
/// Without a next priority the values only have to fit in an `i64`.
pub fn has_room(base: i64, next: Option<i64>, count: usize) -> bool {
    let limit = next.map_or(i64::MAX as i128 + 1, i128::from);
    (count as i128) <= limit - (base as i128)
}

/// Assign distinct priorities to a group that shares one priority
///
/// # Arguments
///
/// * `group` - Requests sharing one priority value
/// * `base` - First value to hand out (normally the shared priority)
/// * `next_priority` - Next distinct priority above the group, if any
///
/// # Example
///
/// ```rust
/// use orbit_deconflict_core_rs::{rewrite_group, CycleId, Request, TieBreak};
///
/// let group = vec![
///     Request::new("equator", CycleId(1), 800, 2.0),
///     Request::new("polar", CycleId(1), 800, -75.0),
/// ];
/// let rewrite = rewrite_group(group, 800, Some(900));
///
/// assert_eq!(rewrite.outcome, TieBreak::Rewritten { base: 800, count: 2 });
/// assert_eq!(rewrite.requests[0].id(), "polar");
/// assert_eq!(rewrite.requests[0].priority(), 800);
/// assert_eq!(rewrite.requests[1].priority(), 801);
/// ```
pub fn rewrite_group(mut group: Vec<Request>, base: i64, next_priority: Option<i64>) -> GroupRewrite {
    group.sort_by(|a, b| b.latitude().abs().total_cmp(&a.latitude().abs()));
    let count = group.len();

    if !has_room(base, next_priority, count) {
        let next = next_priority.unwrap_or(i64::MAX);
        warn!(
            base,
            count,
            next,
            "Starting at {base} we need {count} spots, but the next priority is {next}; leaving the group tied"
        );
        return GroupRewrite {
            requests: group,
            outcome: TieBreak::LeftTied { base, count, next },
        };
    }

    for (offset, request) in group.iter_mut().enumerate() {
        request.set_priority(base + offset as i64);
    }

    GroupRewrite {
        requests: group,
        outcome: TieBreak::Rewritten { base, count },
    }
}

/// Rewrite every duplicated priority in a request list
///
/// Groups are visited in ascending priority order; each one is rewritten
/// against the next distinct priority (after applying `reset`). Groups at
/// or below zero are dropped from the output unless `keep_zero` is set.
///
/// # Errors
///
/// Returns `TieBreakError` if the reset table collides with an existing
/// priority group.
pub fn rewrite_priorities(
    requests: Vec<Request>,
    reset: &ResetMap,
    keep_zero: bool,
) -> Result<Vec<Request>, TieBreakError> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for request in &requests {
        *counts.entry(request.priority()).or_insert(0) += 1;
    }
    reset.validate(|priority| counts.contains_key(&priority))?;

    let mut groups: BTreeMap<i64, Vec<Request>> = BTreeMap::new();
    for request in requests {
        let base = reset.target(request.priority()).unwrap_or(request.priority());
        groups.entry(base).or_default().push(request);
    }

    let ordered: Vec<(i64, Vec<Request>)> = groups
        .into_iter()
        .filter(|(base, _)| keep_zero || *base > 0)
        .collect();
    let bases: Vec<i64> = ordered.iter().map(|(base, _)| *base).collect();

    let mut rewritten = Vec::new();
    for (index, (base, group)) in ordered.into_iter().enumerate() {
        let next = bases.get(index + 1).copied();
        rewritten.extend(rewrite_group(group, base, next).requests);
    }
    Ok(rewritten)
}
