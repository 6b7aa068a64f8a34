//! Selection Module
//!
//! Per-cycle greedy selection with latitude exclusion and override
//! policies. See `selector.rs`.

pub mod selector;

pub use selector::{
    select_cycle, CycleOutcome, CycleResolution, LinkConflict, SelectionConfig,
};
