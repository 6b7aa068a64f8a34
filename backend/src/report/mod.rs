//! Orbit count report
//!
//! Per-orbit tally of kept versus rejected requests, used to review a
//! deconflicted file: how many orbits carry how many observations, and
//! which orbits in the covered range carry none at all.

use crate::models::request::{CycleId, Request};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kept / rejected counts for one orbit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbitTally {
    pub orbit: CycleId,

    /// Requests with priority > 0
    pub positive: usize,

    /// Requests with priority <= 0
    pub negative: usize,
}

/// Tally requests per orbit, ascending by orbit
pub fn orbit_count(requests: &[Request]) -> Vec<OrbitTally> {
    let mut tallies: BTreeMap<CycleId, OrbitTally> = BTreeMap::new();
    for request in requests {
        let tally = tallies.entry(request.cycle()).or_insert(OrbitTally {
            orbit: request.cycle(),
            positive: 0,
            negative: 0,
        });
        if request.is_kept() {
            tally.positive += 1;
        } else {
            tally.negative += 1;
        }
    }
    tallies.into_values().collect()
}

/// Orbits between the first and last tallied orbit that have no requests
pub fn find_empty_orbits(tallies: &[OrbitTally]) -> Vec<CycleId> {
    let (Some(first), Some(last)) = (tallies.first(), tallies.last()) else {
        return Vec::new();
    };
    let present: BTreeSet<u64> = tallies.iter().map(|t| t.orbit.number()).collect();
    (first.orbit.number()..last.orbit.number())
        .filter(|orbit| !present.contains(orbit))
        .map(CycleId)
        .collect()
}

fn blank_if_zero(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

/// Render the report as lines of text
///
/// Layout: a table of orbit / kept / rejected counts (zeros left blank),
/// a `total = kept + rejected` summary, a histogram of how many orbits
/// carry each number of kept observations, and the empty orbits.
pub fn format_report(tallies: &[OrbitTally]) -> Vec<String> {
    let orbit_header = format!("Orbit ({})", tallies.len());
    let pos_header = "# obs";
    let neg_header = "# negative obs";
    let o_width = orbit_header.len();
    let p_width = pos_header.len();
    let n_width = neg_header.len();

    let rule = |width: usize| "-".repeat(width);
    let row = |orbit: &str, pos: &str, neg: &str| {
        format!("{orbit:<o_width$} {pos:^p_width$} {neg:<n_width$}")
    };

    let mut lines = vec![
        row(&orbit_header, pos_header, neg_header),
        row(&rule(o_width), &rule(p_width), &rule(n_width)),
    ];

    // kept observations per orbit → number of orbits
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    let mut neg_count = 0;
    for tally in tallies {
        *histogram.entry(tally.positive).or_insert(0) += 1;
        neg_count += tally.negative;
        lines.push(row(
            &tally.orbit.to_string(),
            &blank_if_zero(tally.positive),
            &blank_if_zero(tally.negative),
        ));
    }

    lines.push(format!(
        "{:-^o_width$} {} {}",
        "Counts",
        rule(p_width),
        rule(n_width)
    ));
    let pos_count: usize = histogram.iter().map(|(obs, orbits)| obs * orbits).sum();
    lines.push(format!(
        "{:^o_width$}={:^p_width$}+ {:<n_width$}",
        pos_count + neg_count,
        pos_count,
        neg_count
    ));
    lines.push(String::new());

    let mut num_of_obs = Vec::new();
    let mut num_of_orbs = Vec::new();
    for (obs, orbits) in histogram.iter().rev() {
        let width = orbits.to_string().len().max(3);
        num_of_obs.push(format!("{obs:^width$}"));
        num_of_orbs.push(format!("{orbits:^width$}"));
    }
    lines.push(format!("# of Observations: {}", num_of_obs.join(" ")));
    lines.push(format!("# of Orbits      : {}", num_of_orbs.join(" ")));
    lines.push(String::new());

    lines.push("Empty Orbits".to_string());
    lines.push("------------".to_string());
    lines.extend(find_empty_orbits(tallies).iter().map(CycleId::to_string));
    lines
}
