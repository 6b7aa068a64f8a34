//! Special-target priorities
//!
//! Targets on a special list (copied from a wiki table as
//! `id,priority,...` lines) get boosted when they sit at the base
//! priority: a special priority `sp` in 1..=10 turns `base` into
//! `base + 300 + 10 * sp`, so with the usual base of 11000 a 10 becomes
//! 11400 and a 2 becomes 11320.

use crate::models::request::Request;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

/// Base priority the special list applies to by default
pub const DEFAULT_BASE_PRIORITY: i64 = 11_000;

/// Offset added on top of the base for any special target
pub const SPECIAL_OFFSET: i64 = 300;

/// Priority step per special-priority point
pub const SPECIAL_STEP: i64 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum SpecialPriorityError {
    #[error("Line {line}: expected '<id>,<priority>', got '{text}'")]
    MalformedLine { line: usize, text: String },

    #[error("Unreadable special-target list: {0}")]
    Csv(String),

    #[error("The special priority for {id} ({priority}) is not an integer between 1 and 10, inclusive")]
    OutOfRange { id: String, priority: i64 },
}

/// Parse a special-target list
///
/// Lines are read as CSV, so quoted fields may contain commas. Blank
/// lines are skipped. The first field is the target id, the second an
/// integer priority; any further fields are ignored. Later lines win for
/// repeated ids.
///
/// # Example
/// ```
/// use orbit_deconflict_core_rs::special::parse_special_priorities;
///
/// let specials = parse_special_priorities("164320,6,Oxia Planum\n\n118256,10\n").unwrap();
/// assert_eq!(specials.get("164320"), Some(&6));
/// assert_eq!(specials.get("118256"), Some(&10));
/// ```
pub fn parse_special_priorities(text: &str) -> Result<BTreeMap<String, i64>, SpecialPriorityError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut specials = BTreeMap::new();
    for result in reader.records() {
        let row = result.map_err(|e| SpecialPriorityError::Csv(e.to_string()))?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let malformed = || SpecialPriorityError::MalformedLine {
            line: row.position().map_or(0, |p| p.line() as usize),
            text: row.iter().collect::<Vec<_>>().join(","),
        };
        let id = row.get(0).filter(|id| !id.is_empty()).ok_or_else(malformed)?;
        let priority = row
            .get(1)
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        specials.insert(id.to_string(), priority);
    }
    Ok(specials)
}

/// Boost special targets that sit at `base_priority`
///
/// Special targets at any other priority are left alone and only
/// reported.
pub fn apply_special_priorities(
    requests: Vec<Request>,
    base_priority: i64,
    specials: &BTreeMap<String, i64>,
) -> Result<Vec<Request>, SpecialPriorityError> {
    let mut updated = Vec::with_capacity(requests.len());
    for mut request in requests {
        if let Some(&special) = specials.get(request.id()) {
            let original = request.priority();
            if original == base_priority {
                if !(1..=10).contains(&special) {
                    return Err(SpecialPriorityError::OutOfRange {
                        id: request.id().to_string(),
                        priority: special,
                    });
                }
                request.set_priority(original + SPECIAL_OFFSET + special * SPECIAL_STEP);
                info!(
                    request_id = request.id(),
                    from = original,
                    to = request.priority(),
                    "Special target boosted"
                );
            } else {
                warn!(
                    request_id = request.id(),
                    priority = original,
                    "Special target is not at the base priority, left unchanged"
                );
            }
        }
        updated.push(request);
    }
    Ok(updated)
}
