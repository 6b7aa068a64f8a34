//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList, etc.)

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::models::record::Record;
use crate::orchestrator::DeconflictConfig;
use crate::selection::SelectionConfig;
use crate::HalfWidthSchedule;

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract an optional field from a Python dict.
///
/// # Returns
/// `Some(value)` if field exists and is not None, `None` otherwise
///
/// # Errors
/// Returns error only if type conversion fails (not if field is missing)
fn extract_optional<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    for<'py> T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Extract a field with a default value if missing.
///
/// # Example
/// ```ignore
/// let cap: usize = extract_with_default(&py_dict, "per_cycle_cap", 4)?;
/// ```
fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    for<'py> T: FromPyObject<'py>,
{
    Ok(extract_optional(dict, key)?.unwrap_or(default))
}

fn value_error(message: impl Into<String>) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(message.into())
}

// ========================================================================
// Configuration Parsers
// ========================================================================

/// Convert an optional Python dict to DeconflictConfig
///
/// Missing keys take their defaults.
///
/// # Errors
///
/// Returns PyValueError if:
/// - Type conversions fail
/// - The half-width schedule is invalid
/// - Values out of valid range
pub fn parse_deconflict_config(py_config: Option<&Bound<'_, PyDict>>) -> PyResult<DeconflictConfig> {
    let Some(py_config) = py_config else {
        return Ok(DeconflictConfig::default());
    };
    let defaults = DeconflictConfig::default();

    let half_width_schedule = match extract_optional::<Vec<(i64, f64)>>(py_config, "half_width_schedule")? {
        Some(pairs) => HalfWidthSchedule::new(pairs).map_err(|e| value_error(e.to_string()))?,
        None => defaults.selection.half_width_schedule.clone(),
    };

    let config = DeconflictConfig {
        selection: SelectionConfig {
            per_cycle_cap: extract_with_default(py_config, "per_cycle_cap", defaults.selection.per_cycle_cap)?,
            half_width_schedule,
            high_altitude_override: extract_optional(py_config, "high_altitude_override")?,
            high_roll_threshold: extract_optional(py_config, "high_roll_threshold")?,
        },
        max_passes: extract_with_default(py_config, "max_passes", defaults.max_passes)?,
        fields: defaults.fields,
    };

    config.validate().map_err(|e| value_error(e.to_string()))?;
    Ok(config)
}

// ========================================================================
// Record Conversion
// ========================================================================

/// Convert a Python list of dicts to records
///
/// Non-string values are stored via `str()`.
pub fn parse_records(py_records: &Bound<'_, PyList>) -> PyResult<Vec<Record>> {
    let mut records = Vec::with_capacity(py_records.len());
    for item in py_records.iter() {
        let dict: Bound<'_, PyDict> = item.downcast_into()?;
        let mut record = Record::new();
        for (key, value) in dict.iter() {
            record.insert(key.extract::<String>()?, value.to_string());
        }
        records.push(record);
    }
    Ok(records)
}

/// Convert records to a Python list of dicts
pub fn records_to_py<'py>(py: Python<'py>, records: &[Record]) -> PyResult<Bound<'py, PyList>> {
    let list = PyList::empty_bound(py);
    for record in records {
        let dict = PyDict::new_bound(py);
        for (key, value) in record {
            dict.set_item(key, value)?;
        }
        list.append(dict)?;
    }
    Ok(list)
}
