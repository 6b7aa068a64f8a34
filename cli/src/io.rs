//! Document input/output for the CLI.
//!
//! Documents are JSON: either `{"header": ..., "records": [...]}` or a
//! bare array of records. The header is carried through untouched apart
//! from the `USERNAME` / `CREATION_DATE` stamp applied on write. Record
//! columns are written back in the order they were read.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use orbit_deconflict_core_rs::{Document, Record};
use serde_json::{Map, Value};

/// Read a document from a JSON file
pub fn read_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_document(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Parse a document from JSON text
pub fn parse_document(text: &str) -> Result<Document> {
    let value: Value = serde_json::from_str(text)?;
    let columns = column_order(&value);
    let mut document: Document = if value.is_array() {
        Document {
            records: serde_json::from_value(value)?,
            ..Default::default()
        }
    } else {
        serde_json::from_value(value)?
    };
    if document.columns.is_empty() {
        document.columns = columns;
    }
    Ok(document)
}

/// Record keys in the order they first appear
fn column_order(value: &Value) -> Vec<String> {
    let records = match value {
        Value::Array(records) => records,
        Value::Object(map) => match map.get("records") {
            Some(Value::Array(records)) => records,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let mut columns: Vec<String> = Vec::new();
    for key in records.iter().filter_map(Value::as_object).flat_map(Map::keys) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }
    columns
}

/// Serialize a document with each record's fields in column order
pub fn document_to_value(document: &Document) -> Value {
    let records = document
        .records
        .iter()
        .map(|record| ordered_record(document, record))
        .collect();

    let mut out = Map::new();
    out.insert("header".to_string(), document.header.clone());
    if !document.columns.is_empty() {
        out.insert(
            "columns".to_string(),
            Value::Array(document.columns.iter().cloned().map(Value::String).collect()),
        );
    }
    out.insert("records".to_string(), Value::Array(records));
    Value::Object(out)
}

fn ordered_record(document: &Document, record: &Record) -> Value {
    Value::Object(
        document
            .ordered_fields(record)
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect(),
    )
}

/// Stamp the writer's user name and the creation time into an object header
pub fn stamp_header(header: &mut Value, username: &str, created: &str) {
    if let Value::Object(map) = header {
        map.insert("USERNAME".to_string(), Value::String(username.to_string()));
        map.insert("CREATION_DATE".to_string(), Value::String(created.to_string()));
    }
}

/// Write a document to a file, or stdout when no path is given
pub fn write_document(document: &Document, output: Option<&Path>) -> Result<()> {
    let mut document = document.clone();
    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    let created = Utc::now().format("%Y-%jT%H:%M:%S").to_string();
    stamp_header(&mut document.header, &username, &created);

    let text = serde_json::to_string_pretty(&document_to_value(&document))?;
    match output {
        Some(path) => fs::write(path, text).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", text),
    }
    Ok(())
}
