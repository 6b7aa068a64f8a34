//! Tie-break Module
//!
//! Turns groups of requests that share a priority into distinct ranks.
//!
//! - `rewriter`: per-group rewrite and whole-list rewrite
//! - `reset`: operator table that moves a group to a new base value

pub mod reset;
pub mod rewriter;

pub use reset::{ResetMap, TieBreakError};
pub use rewriter::{has_room, rewrite_group, rewrite_priorities, GroupRewrite, TieBreak};
