//! Python bindings (PyO3)
//!
//! Records cross the boundary as `list[dict[str, str]]`, the same shape
//! the Python loaders already produce.

pub mod deconflict;
pub mod types;
