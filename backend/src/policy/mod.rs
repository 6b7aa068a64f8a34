//! Override Policy Module
//!
//! Override policies let a request stay positive after the base rule
//! (cap + exclusion) has turned it down.
//!
//! # Overview
//!
//! The cycle selector walks requests in rank order. A request that would
//! be rejected is offered to each enabled override policy in turn; the
//! first policy that returns a decision keeps the request. Overridden
//! requests never count against the cap and never register an exclusion
//! interval of their own.
//!
//! # Policy Interface
//!
//! All policies implement the `OverridePolicy` trait:
//! ```rust
//! use orbit_deconflict_core_rs::policy::{CycleContext, OverrideDecision, OverridePolicy};
//! use orbit_deconflict_core_rs::{ExclusionError, Request};
//!
//! struct NeverOverride;
//!
//! impl OverridePolicy for NeverOverride {
//!     fn name(&self) -> &'static str {
//!         "never"
//!     }
//!
//!     fn evaluate(
//!         &mut self,
//!         candidate: &Request,
//!         rank: i64,
//!         context: &CycleContext<'_>,
//!     ) -> Result<Option<OverrideDecision>, ExclusionError> {
//!         Ok(None)
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **HighAltitude**: polar requests with plenty of alternates
//! 2. **HighRoll**: low-roll requests sharing latitude with a high-roll accepted neighbour

use crate::exclusion::ExclusionError;
use crate::models::request::{CycleId, Request};

pub mod high_altitude;
pub mod high_roll;

pub use high_altitude::HighAltitudePolicy;
pub use high_roll::HighRollPolicy;

/// Snapshot of a request accepted under the base rule
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedRequest {
    pub id: String,
    pub latitude: f64,
    pub roll_angle: f64,
    /// Position in the input list
    pub position: usize,
    pub rank: i64,
}

impl AcceptedRequest {
    pub fn from_request(request: &Request, rank: i64) -> Self {
        Self {
            id: request.id().to_string(),
            latitude: request.latitude(),
            roll_angle: request.roll_angle(),
            position: request.position(),
            rank,
        }
    }
}

/// What an override policy can see about the cycle being selected
#[derive(Debug, Clone, Copy)]
pub struct CycleContext<'a> {
    pub cycle: CycleId,

    /// Requests accepted so far, in acceptance order
    pub accepted: &'a [AcceptedRequest],
}

/// Why a request was kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideReason {
    HighAltitude,

    /// Enabled by the named accepted neighbour
    HighRoll { neighbor_id: String },
}

/// Outcome of a successful override
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideDecision {
    /// Priority the overridden request ends up with
    pub priority: i64,

    pub reason: OverrideReason,
}

/// A rule that can keep an otherwise rejected request
///
/// Policies are built fresh for every cycle, so state held in `self`
/// (such as an override tracker) is scoped to one cycle.
pub trait OverridePolicy {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Decide whether to keep `candidate`, which the base rule rejected
    ///
    /// # Arguments
    ///
    /// * `candidate` - Request about to be rejected
    /// * `rank` - Its tie-broken rank in this cycle
    /// * `context` - Cycle id and the requests accepted so far
    fn evaluate(
        &mut self,
        candidate: &Request,
        rank: i64,
        context: &CycleContext<'_>,
    ) -> Result<Option<OverrideDecision>, ExclusionError>;
}
