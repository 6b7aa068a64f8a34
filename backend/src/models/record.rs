//! Record model
//!
//! A record is one row of a target file as handed over by the loader:
//! a mapping from column name to the raw string value. The engine only
//! ever rewrites the priority column; every other column round-trips
//! untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a target file (column name → raw value)
pub type Record = BTreeMap<String, String>;

/// Look up a column, falling back to an ASCII case-insensitive match
///
/// Target files in the wild spell the same column both
/// `Request Priority` and `Request priority`.
pub fn lookup<'a>(record: &'a Record, column: &str) -> Option<&'a str> {
    if let Some(value) = record.get(column) {
        return Some(value.as_str());
    }
    record
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(column))
        .map(|(_, value)| value.as_str())
}

/// Resolve the key actually present in the record for a column
///
/// Returns the configured name when no variant exists, so writes to a
/// record that lacks the column add it under the configured spelling.
pub fn resolve_key(record: &Record, column: &str) -> String {
    if record.contains_key(column) {
        return column.to_string();
    }
    record
        .keys()
        .find(|key| key.eq_ignore_ascii_case(column))
        .cloned()
        .unwrap_or_else(|| column.to_string())
}

/// Column names the engine reads
///
/// Defaults match the column headers of a HiRISE target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Stable request identifier
    pub id: String,

    /// Cycle (orbit) number, optionally suffixed with a marker letter
    pub cycle: String,

    /// Signed request priority
    pub priority: String,

    /// Latitude in degrees
    pub latitude: String,

    /// Spacecraft roll angle in degrees
    pub roll_angle: String,

    /// Space-separated list of alternate cycles
    pub alternates: String,

    /// Linked-pair tag (`<pair-id>:<partner-id>`)
    pub link_tag: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            id: "Team Database ID".to_string(),
            cycle: "Orbit Number".to_string(),
            priority: "Request Priority".to_string(),
            latitude: "Latitude".to_string(),
            roll_angle: "Roll Angle".to_string(),
            alternates: "Orbit Alternatives".to_string(),
            link_tag: "Coordinated Track History".to_string(),
        }
    }
}

/// A full document: opaque header blob plus its records
///
/// The header is whatever metadata the loader extracted (for a PTF, the
/// keyword dictionary and column order). The engine never looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque header/metadata, carried through unchanged
    #[serde(default)]
    pub header: serde_json::Value,

    /// Column order as first seen on input
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,

    /// Records in file order
    pub records: Vec<Record>,
}

impl Document {
    /// Replace the records, keeping the header and column order
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            header: self.header.clone(),
            columns: self.columns.clone(),
            records,
        }
    }

    /// Fields of `record` in column order; keys not in `columns` follow
    /// alphabetically.
    pub fn ordered_fields<'a>(&'a self, record: &'a Record) -> Vec<(&'a str, &'a str)> {
        let mut fields: Vec<(&str, &str)> = self
            .columns
            .iter()
            .filter_map(|column| record.get_key_value(column))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.extend(
            record
                .iter()
                .filter(|(k, _)| !self.columns.contains(k))
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        fields
    }
}
