//! Orbit Deconflict Core - Rust Engine
//!
//! Deterministic deconfliction of observation requests competing for a
//! capped number of slots per orbit.
//!
//! # Architecture
//!
//! - **models**: Domain types (Record, Request, CycleId, events)
//! - **exclusion**: Half-width schedule and merged latitude exclusion zones
//! - **tiebreak**: Distinct ranks for requests sharing a priority
//! - **policy**: Override policies (high altitude, high roll)
//! - **selection**: Per-cycle greedy selection
//! - **orchestrator**: Convergence loop over every cycle
//! - **report**: Per-orbit counting report
//! - **special**: Special-target priority boosts
//!
//! # Critical Invariants
//!
//! 1. Within a cycle at most `per_cycle_cap` requests stay positive, plus
//!    those kept by an override
//! 2. Tie-breaking never changes the number of requests
//! 3. Every convergence pass works on a fresh copy of the original input
//! 4. The output is a heuristic and must be reviewed by a human

// Module declarations
pub mod exclusion;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod report;
pub mod selection;
pub mod special;
pub mod tiebreak;

// Re-exports for convenience
pub use exclusion::{ExclusionError, ExclusionZone, HalfWidthSchedule, Interval};
pub use models::{
    event::{DeconflictEvent, EventLog},
    record::{Document, FieldNames, Record},
    request::{parse_requests, CycleId, LinkTag, Request, RequestError},
};
pub use orchestrator::{DeconflictConfig, DeconflictError, DeconflictOutcome, Deconflictor};
pub use report::{find_empty_orbits, format_report, orbit_count, OrbitTally};
pub use selection::{select_cycle, CycleOutcome, CycleResolution, LinkConflict, SelectionConfig};
pub use tiebreak::{rewrite_group, rewrite_priorities, ResetMap, TieBreak, TieBreakError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn orbit_deconflict_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::deconflict::deconflict, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::deconflict::rewrite_priorities, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::deconflict::orbit_count, m)?)?;
    Ok(())
}
