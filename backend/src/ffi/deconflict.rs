//! PyO3 functions for deconfliction
//!
//! # Example (from Python)
//!
//! ```python
//! from orbit_deconflict_core_rs import deconflict, orbit_count
//!
//! records = [
//!     {"Team Database ID": "164320", "Orbit Number": "59659a",
//!      "Request Priority": "16500", "Latitude": "18.169"},
//!     {"Team Database ID": "169940", "Orbit Number": "59659a",
//!      "Request Priority": "16300", "Latitude": "18.415"},
//! ]
//! out = deconflict(records, {"per_cycle_cap": 4})
//! print(orbit_count(out))
//! ```

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{parse_deconflict_config, parse_records, records_to_py};
use crate::models::record::FieldNames;
use crate::models::request::parse_requests;
use crate::orchestrator::Deconflictor;
use crate::tiebreak::ResetMap;

fn runtime_error(message: String) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(message)
}

fn value_error(message: String) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(message)
}

/// Deconflict records by orbit
///
/// # Errors
///
/// Raises ValueError for bad configuration or unparseable records,
/// RuntimeError when the linked-pair loop does not converge.
#[pyfunction]
#[pyo3(signature = (records, config=None))]
pub fn deconflict<'py>(
    py: Python<'py>,
    records: &Bound<'py, PyList>,
    config: Option<&Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyList>> {
    let config = parse_deconflict_config(config)?;
    let fields = config.fields.clone();
    let deconflictor = Deconflictor::new(config).map_err(|e| value_error(e.to_string()))?;

    let outcome = deconflictor
        .run(parse_records(records)?)
        .map_err(|e| runtime_error(format!("Deconfliction failed: {}", e)))?;

    records_to_py(py, &outcome.into_records(&fields))
}

/// Rewrite duplicated priorities across the whole record list
#[pyfunction]
#[pyo3(signature = (records, reset=None, keep_zero=false))]
pub fn rewrite_priorities<'py>(
    py: Python<'py>,
    records: &Bound<'py, PyList>,
    reset: Option<&str>,
    keep_zero: bool,
) -> PyResult<Bound<'py, PyList>> {
    let fields = FieldNames::default();
    let reset = match reset {
        Some(spec) => ResetMap::parse(spec).map_err(|e| value_error(e.to_string()))?,
        None => ResetMap::new(),
    };
    let requests = parse_requests(parse_records(records)?, &fields).map_err(|e| value_error(e.to_string()))?;
    let rewritten = crate::tiebreak::rewrite_priorities(requests, &reset, keep_zero)
        .map_err(|e| value_error(e.to_string()))?;

    let out: Vec<_> = rewritten.into_iter().map(|r| r.into_record(&fields)).collect();
    records_to_py(py, &out)
}

/// Per-orbit `(orbit, positive, negative)` counts
#[pyfunction]
pub fn orbit_count(records: &Bound<'_, PyList>) -> PyResult<Vec<(u64, usize, usize)>> {
    let requests = parse_requests(parse_records(records)?, &FieldNames::default())
        .map_err(|e| value_error(e.to_string()))?;
    Ok(crate::report::orbit_count(&requests)
        .into_iter()
        .map(|t| (t.orbit.number(), t.positive, t.negative))
        .collect())
}
