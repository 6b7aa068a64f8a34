//! Orchestrator - convergence loop over every cycle
//!
//! See `engine.rs` for full implementation.

pub mod engine;

// Re-export main types for convenience
pub use engine::{DeconflictConfig, DeconflictError, DeconflictOutcome, Deconflictor};
