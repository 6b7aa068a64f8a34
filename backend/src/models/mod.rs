//! Domain models for the deconfliction engine

pub mod event;
pub mod record;
pub mod request;

// Re-exports
pub use event::{DeconflictEvent, EventLog};
pub use record::{Document, FieldNames, Record};
pub use request::{parse_requests, CycleId, LinkTag, Request, RequestError};
