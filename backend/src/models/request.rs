//! Request model
//!
//! Typed view of a record: the handful of columns the deconfliction
//! engine reasons about, plus the original record so the untouched
//! columns survive the round trip.
//!
//! Sign convention for priorities:
//! - positive: still a candidate (or kept)
//! - negative: already deconflicted / rejected
//!
//! The magnitude is the priority tier used to look up the exclusion
//! half-width.

use crate::models::record::{lookup, resolve_key, FieldNames, Record};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while turning a record into a request
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("Record {position} is missing required field '{field}'")]
    MissingField { position: usize, field: String },

    #[error("Record {position}: field '{field}' is not an integer: '{value}'")]
    InvalidInteger {
        position: usize,
        field: String,
        value: String,
    },

    #[error("Record {position}: field '{field}' is not a number: '{value}'")]
    InvalidNumber {
        position: usize,
        field: String,
        value: String,
    },

    #[error("Invalid cycle number: '{0}'")]
    InvalidCycle(String),
}

/// Numeric cycle (orbit) identifier
///
/// Cycle columns carry an optional trailing marker letter
/// (`"59659a"`); grouping and ordering only ever use the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(pub u64);

impl CycleId {
    /// Parse a cycle column, ignoring any trailing alphabetic marker
    ///
    /// # Example
    /// ```
    /// use orbit_deconflict_core_rs::CycleId;
    ///
    /// assert_eq!(CycleId::parse("59659a").unwrap(), CycleId(59659));
    /// assert_eq!(CycleId::parse("59725").unwrap(), CycleId(59725));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let digits = raw.trim().trim_end_matches(|c: char| c.is_ascii_alphabetic());
        digits
            .parse::<u64>()
            .map(CycleId)
            .map_err(|_| RequestError::InvalidCycle(raw.to_string()))
    }

    /// The bare cycle number
    pub fn number(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Linked-pair tag
///
/// Marks a request as one half of a pair that must be rejected together.
/// The column holds `<pair-id>:<partner-id>` as its first token; anything
/// after the first whitespace is free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTag {
    /// Identifier shared by both halves of the pair
    pub pair_id: String,

    /// Request id of the other half
    pub partner_id: String,
}

impl LinkTag {
    /// Parse a link column; `None` when it does not describe a pair
    ///
    /// # Example
    /// ```
    /// use orbit_deconflict_core_rs::LinkTag;
    ///
    /// let tag = LinkTag::parse("stereo7:169940 second half").unwrap();
    /// assert_eq!(tag.pair_id, "stereo7");
    /// assert_eq!(tag.partner_id, "169940");
    ///
    /// assert!(LinkTag::parse("C").is_none());
    /// assert!(LinkTag::parse("").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.split_whitespace().next()?;
        let (pair_id, partner_id) = token.split_once(':')?;
        if pair_id.is_empty() || partner_id.is_empty() {
            return None;
        }
        Some(Self {
            pair_id: pair_id.to_string(),
            partner_id: partner_id.to_string(),
        })
    }
}

/// One schedulable observation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Stable identifier
    id: String,

    /// Cycle the request is scheduled in
    cycle: CycleId,

    /// Signed priority (mutable; see module docs for the sign convention)
    priority: i64,

    /// Latitude in degrees
    latitude: f64,

    /// Roll angle in degrees (0.0 when absent)
    roll_angle: f64,

    /// Number of alternate cycles this request could run in
    alternate_count: usize,

    /// Linked-pair tag, if this request is half of a pair
    link_tag: Option<LinkTag>,

    /// Zero-based position in the input list
    position: usize,

    /// Source record, rewritten on the way out
    record: Record,
}

impl Request {
    /// Build a request from a record
    ///
    /// `id`, cycle, priority and latitude are required. Roll angle and
    /// alternates default to 0 when missing or blank; an unparseable link
    /// tag simply means "not linked".
    pub fn from_record(
        record: Record,
        fields: &FieldNames,
        position: usize,
    ) -> Result<Self, RequestError> {
        let required = |field: &str| -> Result<String, RequestError> {
            lookup(&record, field)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RequestError::MissingField {
                    position,
                    field: field.to_string(),
                })
        };

        let id = required(&fields.id)?;
        let cycle = CycleId::parse(&required(&fields.cycle)?)?;

        let raw_priority = required(&fields.priority)?;
        let priority = parse_priority(&raw_priority).ok_or_else(|| RequestError::InvalidInteger {
            position,
            field: fields.priority.clone(),
            value: raw_priority.clone(),
        })?;

        let raw_latitude = required(&fields.latitude)?;
        let latitude = parse_number(&raw_latitude).ok_or_else(|| RequestError::InvalidNumber {
            position,
            field: fields.latitude.clone(),
            value: raw_latitude.clone(),
        })?;

        let roll_angle = match lookup(&record, &fields.roll_angle).map(str::trim) {
            None | Some("") => 0.0,
            Some(raw) => parse_number(raw).ok_or_else(|| RequestError::InvalidNumber {
                position,
                field: fields.roll_angle.clone(),
                value: raw.to_string(),
            })?,
        };

        let alternate_count = lookup(&record, &fields.alternates)
            .map(|raw| raw.split_whitespace().count())
            .unwrap_or(0);

        let link_tag = lookup(&record, &fields.link_tag).and_then(LinkTag::parse);

        Ok(Self {
            id,
            cycle,
            priority,
            latitude,
            roll_angle,
            alternate_count,
            link_tag,
            position,
            record,
        })
    }

    /// Build a request directly from its typed fields
    ///
    /// The backing record holds the default column names, so
    /// [`Request::into_record`] with `FieldNames::default()` yields a
    /// complete row.
    ///
    /// # Example
    /// ```
    /// use orbit_deconflict_core_rs::{CycleId, Request};
    ///
    /// let request = Request::new("164320", CycleId(59659), 16500, 18.169)
    ///     .with_roll_angle(-4.2)
    ///     .with_alternate_count(2);
    /// assert_eq!(request.priority(), 16500);
    /// ```
    pub fn new(id: &str, cycle: CycleId, priority: i64, latitude: f64) -> Self {
        let fields = FieldNames::default();
        let mut record = Record::new();
        record.insert(fields.id, id.to_string());
        record.insert(fields.cycle, cycle.to_string());
        record.insert(fields.priority, priority.to_string());
        record.insert(fields.latitude, latitude.to_string());

        Self {
            id: id.to_string(),
            cycle,
            priority,
            latitude,
            roll_angle: 0.0,
            alternate_count: 0,
            link_tag: None,
            position: 0,
            record,
        }
    }

    /// Set roll angle (builder)
    pub fn with_roll_angle(mut self, roll_angle: f64) -> Self {
        self.roll_angle = roll_angle;
        self
    }

    /// Set alternate count (builder)
    pub fn with_alternate_count(mut self, alternate_count: usize) -> Self {
        self.alternate_count = alternate_count;
        self
    }

    /// Set link tag (builder)
    pub fn with_link_tag(mut self, pair_id: &str, partner_id: &str) -> Self {
        self.link_tag = Some(LinkTag {
            pair_id: pair_id.to_string(),
            partner_id: partner_id.to_string(),
        });
        self
    }

    /// Set input position (builder)
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn roll_angle(&self) -> f64 {
        self.roll_angle
    }

    pub fn alternate_count(&self) -> usize {
        self.alternate_count
    }

    pub fn link_tag(&self) -> Option<&LinkTag> {
        self.link_tag.as_ref()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Whether this request has already been deconflicted away
    pub fn is_rejected(&self) -> bool {
        self.priority < 0
    }

    /// Whether this request currently holds a kept (positive) priority
    pub fn is_kept(&self) -> bool {
        self.priority > 0
    }

    /// Overwrite the priority
    pub fn set_priority(&mut self, priority: i64) {
        self.priority = priority;
    }

    /// Flip a positive priority negative; no-op otherwise
    ///
    /// Returns true if the priority changed.
    pub fn reject(&mut self) -> bool {
        if self.priority > 0 {
            self.priority = -self.priority;
            true
        } else {
            false
        }
    }

    /// Write the current priority back into the record and return it
    pub fn into_record(self, fields: &FieldNames) -> Record {
        let mut record = self.record;
        let key = resolve_key(&record, &fields.priority);
        record.insert(key, self.priority.to_string());
        record
    }
}

/// Parse an integer priority, tolerating a redundant `.0`
///
/// Floats outside the `i64` range are rejected rather than saturated.
fn parse_priority(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    if value.is_finite() && value.fract() == 0.0 && in_range {
        Some(value as i64)
    } else {
        None
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a whole record list
pub fn parse_requests(records: Vec<Record>, fields: &FieldNames) -> Result<Vec<Request>, RequestError> {
    records
        .into_iter()
        .enumerate()
        .map(|(position, record)| Request::from_record(record, fields, position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parse_accepts_integral_floats_only() {
        assert_eq!(parse_priority("16500"), Some(16500));
        assert_eq!(parse_priority("-3"), Some(-3));
        assert_eq!(parse_priority("800.0"), Some(800));
        assert_eq!(parse_priority("800.5"), None);
        assert_eq!(parse_priority("high"), None);
        assert_eq!(parse_priority("1e30"), None);
        assert_eq!(parse_priority("-1e30"), None);
        assert_eq!(parse_priority("1e3"), Some(1000));
    }

    #[test]
    fn reject_only_flips_positive_priorities() {
        let mut request = Request::new("A", CycleId(1), 10, 0.0);
        assert!(request.reject());
        assert_eq!(request.priority(), -10);
        assert!(!request.reject());
        assert_eq!(request.priority(), -10);

        let mut zero = Request::new("Z", CycleId(1), 0, 0.0);
        assert!(!zero.reject());
        assert_eq!(zero.priority(), 0);
    }
}
