//! Exclusion Module
//!
//! Latitude exclusion tracking for the cycle selector:
//! - `schedule`: priority tier → exclusion half-width
//! - `zone`: merged set of excluded latitude intervals
//!
//! # Critical Invariants
//!
//! 1. **Tier coverage**: every non-negative priority resolves to exactly one tier
//! 2. **Disjointness**: stored intervals never overlap or touch
//! 3. **Union preservation**: `contains` agrees with the union of every interval ever added

pub mod schedule;
pub mod zone;

pub use schedule::{ExclusionError, HalfWidthSchedule, Tier};
pub use zone::{ExclusionZone, Interval};
