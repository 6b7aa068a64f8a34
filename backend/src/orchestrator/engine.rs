//! Orchestrator Engine
//!
//! Runs the cycle selector over every cycle and drives the linked-pair
//! convergence loop.
//!
//! # Architecture
//!
//! ```text
//! parse records once ─► original
//! for pass in 1..=max_passes:
//!     1. Clone the original request list (fresh snapshot)
//!     2. Group by cycle number, ascending
//!     3. Select each cycle
//!     4. Conflict? ─► reject both pair members in the original, restart
//!     5. Otherwise ─► done; output is in ascending cycle order
//! ```
//!
//! The original list is the only state that survives between passes,
//! and it only ever changes by rejecting linked-pair members.
//!
//! # Example
//!
//! ```rust
//! use orbit_deconflict_core_rs::{Deconflictor, DeconflictConfig, Request, CycleId};
//!
//! let deconflictor = Deconflictor::new(DeconflictConfig::default()).unwrap();
//! let requests = vec![
//!     Request::new("a", CycleId(59659), 16500, 18.2),
//!     Request::new("b", CycleId(59659), 16300, 18.4),
//! ];
//!
//! let outcome = deconflictor.run_requests(requests).unwrap();
//! assert_eq!(outcome.passes, 1);
//! // b sits inside a's 40° exclusion zone
//! assert_eq!(outcome.requests[1].priority(), -16300);
//! ```

use crate::exclusion::ExclusionError;
use crate::models::event::{DeconflictEvent, EventLog};
use crate::models::record::{FieldNames, Record};
use crate::models::request::{parse_requests, CycleId, Request, RequestError};
use crate::selection::{select_cycle, CycleOutcome, LinkConflict, SelectionConfig};
use crate::tiebreak::TieBreakError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete deconfliction configuration
///
/// Every field has a default, so `{}` is a valid JSON configuration.
///
/// # Fields
///
/// * `selection` - Cap, half-width schedule and overrides (flattened)
/// * `max_passes` - Ceiling on convergence-loop passes
/// * `fields` - Column names to read from each record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeconflictConfig {
    /// Per-cycle selection parameters
    #[serde(flatten)]
    pub selection: SelectionConfig,

    /// Maximum number of full passes before giving up
    pub max_passes: usize,

    /// Column names
    pub fields: FieldNames,
}

impl Default for DeconflictConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            max_passes: 100,
            fields: FieldNames::default(),
        }
    }
}

impl DeconflictConfig {
    /// Load a configuration from JSON
    ///
    /// # Example
    ///
    /// ```rust
    /// use orbit_deconflict_core_rs::DeconflictConfig;
    ///
    /// let config = DeconflictConfig::from_json_str(
    ///     r#"{"per_cycle_cap": 2, "half_width_schedule": [[10000, 40.0], [5000, 20.0]]}"#,
    /// ).unwrap();
    /// assert_eq!(config.selection.per_cycle_cap, 2);
    /// assert_eq!(config.max_passes, 100);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, DeconflictError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DeconflictError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the types alone cannot express
    pub fn validate(&self) -> Result<(), DeconflictError> {
        if self.selection.per_cycle_cap == 0 {
            return Err(DeconflictError::InvalidConfig(
                "per_cycle_cap must be positive".to_string(),
            ));
        }
        if self.max_passes == 0 {
            return Err(DeconflictError::InvalidConfig(
                "max_passes must be positive".to_string(),
            ));
        }
        if let Some(priority) = self.selection.high_altitude_override {
            if priority < 0 {
                return Err(DeconflictError::InvalidConfig(format!(
                    "high_altitude_override must be non-negative, got {}",
                    priority
                )));
            }
        }
        if let Some(threshold) = self.selection.high_roll_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(DeconflictError::InvalidConfig(format!(
                    "high_roll_threshold must be a non-negative number, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Errors and Results
// ============================================================================

/// Fatal deconfliction errors
///
/// Linked-pair conflicts are not errors; they only surface here when the
/// convergence loop cannot make progress.
#[derive(Debug, Error, PartialEq)]
pub enum DeconflictError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Exclusion error: {0}")]
    Exclusion(#[from] ExclusionError),

    #[error("Tie-break error: {0}")]
    TieBreak(#[from] TieBreakError),

    #[error("No convergence after {passes} passes (last conflict on linked pair '{pair_id}')")]
    PassLimitExceeded { passes: usize, pair_id: String },

    #[error(
        "Linked pair '{pair_id}' conflicts again ({rejected_id} rejected, partner {partner_id}) with no member left to reject"
    )]
    UnresolvableConflict {
        pair_id: String,
        rejected_id: String,
        partner_id: String,
    },
}

/// Result of a converged run
#[derive(Debug, Clone, Serialize)]
pub struct DeconflictOutcome {
    /// Identifier of this run (also on the convergence log line)
    pub run_id: Uuid,

    /// Passes needed, including the final converged one
    pub passes: usize,

    /// Every request, ascending by cycle
    pub requests: Vec<Request>,

    /// Decisions of the converged pass, preceded by the conflicts and
    /// forced rejections of earlier passes
    pub events: EventLog,
}

impl DeconflictOutcome {
    /// Requests left with a positive priority
    pub fn kept_count(&self) -> usize {
        self.requests.iter().filter(|r| r.is_kept()).count()
    }

    /// Requests left with a non-positive priority
    pub fn rejected_count(&self) -> usize {
        self.requests.len() - self.kept_count()
    }

    /// Records with rewritten priorities, ascending by cycle
    pub fn into_records(self, fields: &FieldNames) -> Vec<Record> {
        self.requests
            .into_iter()
            .map(|request| request.into_record(fields))
            .collect()
    }
}

enum PassOutcome {
    Converged { requests: Vec<Request>, events: EventLog },
    Conflict(LinkConflict),
}

// ============================================================================
// Deconflictor
// ============================================================================

/// Convergence-loop driver
#[derive(Debug, Clone)]
pub struct Deconflictor {
    config: DeconflictConfig,
}

impl Deconflictor {
    /// Create a deconflictor
    ///
    /// # Errors
    ///
    /// Returns `DeconflictError::InvalidConfig` if the configuration is out
    /// of range.
    pub fn new(config: DeconflictConfig) -> Result<Self, DeconflictError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DeconflictConfig {
        &self.config
    }

    /// Deconflict raw records
    ///
    /// Records are parsed with the configured column names; any record
    /// that cannot be parsed aborts the run.
    pub fn run(&self, records: Vec<Record>) -> Result<DeconflictOutcome, DeconflictError> {
        let requests = parse_requests(records, &self.config.fields)?;
        self.run_requests(requests)
    }

    /// Deconflict already-parsed requests
    pub fn run_requests(&self, requests: Vec<Request>) -> Result<DeconflictOutcome, DeconflictError> {
        let run_id = Uuid::new_v4();

        let mut original = requests;
        let mut events = EventLog::new();
        let mut last_pair = String::new();

        for pass in 1..=self.config.max_passes {
            match self.run_pass(original.clone())? {
                PassOutcome::Converged {
                    requests,
                    events: pass_events,
                } => {
                    events.extend(pass_events);
                    info!(
                        %run_id,
                        passes = pass,
                        requests = requests.len(),
                        "Deconfliction converged"
                    );
                    return Ok(DeconflictOutcome {
                        run_id,
                        passes: pass,
                        requests,
                        events,
                    });
                }
                PassOutcome::Conflict(conflict) => {
                    events.log(DeconflictEvent::LinkConflict {
                        pass,
                        cycle: conflict.cycle,
                        rejected_id: conflict.rejected_id.clone(),
                        pair_id: conflict.pair_id.clone(),
                        partner_id: conflict.partner_id.clone(),
                    });

                    if force_reject(&mut original, &conflict, pass, &mut events) == 0 {
                        return Err(DeconflictError::UnresolvableConflict {
                            pair_id: conflict.pair_id,
                            rejected_id: conflict.rejected_id,
                            partner_id: conflict.partner_id,
                        });
                    }
                    last_pair = conflict.pair_id;
                }
            }
        }

        Err(DeconflictError::PassLimitExceeded {
            passes: self.config.max_passes,
            pair_id: last_pair,
        })
    }

    /// One full pass over every cycle, on a private snapshot
    fn run_pass(&self, snapshot: Vec<Request>) -> Result<PassOutcome, DeconflictError> {
        let mut by_cycle: BTreeMap<CycleId, Vec<Request>> = BTreeMap::new();
        for request in snapshot {
            by_cycle.entry(request.cycle()).or_default().push(request);
        }

        let mut requests = Vec::new();
        let mut events = EventLog::new();
        for (cycle, cycle_requests) in by_cycle {
            match select_cycle(cycle, cycle_requests, &self.config.selection)? {
                CycleOutcome::Resolved(resolution) => {
                    requests.extend(resolution.requests);
                    events.extend(resolution.events);
                }
                CycleOutcome::Conflict(conflict) => return Ok(PassOutcome::Conflict(conflict)),
            }
        }

        Ok(PassOutcome::Converged { requests, events })
    }
}

/// Reject both members of a conflicting pair in the original list
///
/// Returns how many requests changed.
fn force_reject(
    original: &mut [Request],
    conflict: &LinkConflict,
    pass: usize,
    events: &mut EventLog,
) -> usize {
    let mut changed = 0;
    for member in [&conflict.rejected_id, &conflict.partner_id] {
        for request in original.iter_mut().filter(|r| r.id() == member.as_str()) {
            let previous_priority = request.priority();
            if request.reject() {
                warn!(
                    pass,
                    request_id = request.id(),
                    pair_id = %conflict.pair_id,
                    previous_priority,
                    "Linked pair conflict: rejecting pair member and restarting"
                );
                events.log(DeconflictEvent::ForcedRejection {
                    pass,
                    request_id: request.id().to_string(),
                    pair_id: conflict.pair_id.clone(),
                    previous_priority,
                });
                changed += 1;
            }
        }
    }
    changed
}
