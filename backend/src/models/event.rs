//! Event logging for deconfliction review.
//!
//! The selection is a greedy heuristic and its output is meant to be
//! reviewed by a human. Every decision that is not a plain "accepted" or
//! "rejected" is recorded here so a reviewer can see why a request ended
//! up where it did.
//!
//! # Event Types
//!
//! - **Selection**: accept / reject decisions inside one cycle
//! - **Tie-break**: groups that could not be spread out
//! - **Override**: requests kept despite cap or exclusion
//! - **Linked pairs**: conflicts and the forced rejections they caused
//!
//! # Example
//!
//! ```rust
//! use orbit_deconflict_core_rs::{CycleId, DeconflictEvent};
//!
//! let event = DeconflictEvent::HighAltitudeOverride {
//!     cycle: CycleId(59659),
//!     request_id: "164320".to_string(),
//!     priority: 1,
//! };
//!
//! assert_eq!(event.event_type(), "HighAltitudeOverride");
//! assert_eq!(event.request_id(), Some("164320"));
//! ```

use crate::models::request::CycleId;
use serde::{Deserialize, Serialize};

/// One recorded deconfliction decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeconflictEvent {
    /// Request kept under the cap and outside every exclusion zone
    Accepted {
        cycle: CycleId,
        request_id: String,
        rank: i64,
    },

    /// Request rejected by cap or exclusion
    Rejected {
        cycle: CycleId,
        request_id: String,
        rank: i64,
    },

    /// Tied group could not be spread below the next priority
    TieLeft {
        cycle: CycleId,
        priority: i64,
        count: usize,
        next: i64,
    },

    /// High-latitude request with many alternates kept outside the cap
    HighAltitudeOverride {
        cycle: CycleId,
        request_id: String,
        priority: i64,
    },

    /// Low-roll request kept next to a high-roll accepted neighbour
    HighRollOverride {
        cycle: CycleId,
        request_id: String,
        neighbor_id: String,
        rank: i64,
    },

    /// Half of a linked pair was rejected; the pass was abandoned
    LinkConflict {
        pass: usize,
        cycle: CycleId,
        rejected_id: String,
        pair_id: String,
        partner_id: String,
    },

    /// A linked-pair member was rejected in the original input
    ForcedRejection {
        pass: usize,
        request_id: String,
        pair_id: String,
        previous_priority: i64,
    },
}

impl DeconflictEvent {
    /// Variant name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "Accepted",
            Self::Rejected { .. } => "Rejected",
            Self::TieLeft { .. } => "TieLeft",
            Self::HighAltitudeOverride { .. } => "HighAltitudeOverride",
            Self::HighRollOverride { .. } => "HighRollOverride",
            Self::LinkConflict { .. } => "LinkConflict",
            Self::ForcedRejection { .. } => "ForcedRejection",
        }
    }

    /// Request the event is about, if it concerns a single request
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Accepted { request_id, .. }
            | Self::Rejected { request_id, .. }
            | Self::HighAltitudeOverride { request_id, .. }
            | Self::HighRollOverride { request_id, .. }
            | Self::ForcedRejection { request_id, .. } => Some(request_id),
            Self::LinkConflict { rejected_id, .. } => Some(rejected_id),
            Self::TieLeft { .. } => None,
        }
    }

    /// Cycle the event happened in, if any
    pub fn cycle(&self) -> Option<CycleId> {
        match self {
            Self::Accepted { cycle, .. }
            | Self::Rejected { cycle, .. }
            | Self::TieLeft { cycle, .. }
            | Self::HighAltitudeOverride { cycle, .. }
            | Self::HighRollOverride { cycle, .. }
            | Self::LinkConflict { cycle, .. } => Some(*cycle),
            Self::ForcedRejection { .. } => None,
        }
    }
}

/// Ordered log of deconfliction events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<DeconflictEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: DeconflictEvent) {
        self.events.push(event);
    }

    /// Append every event from another log
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[DeconflictEvent] {
        &self.events
    }

    /// Events of one variant
    pub fn events_of_type(&self, event_type: &str) -> Vec<&DeconflictEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events about one request
    pub fn events_for_request(&self, request_id: &str) -> Vec<&DeconflictEvent> {
        self.events
            .iter()
            .filter(|e| e.request_id() == Some(request_id))
            .collect()
    }
}
