use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single table column as sent by the client. `label` drives semantic
/// classification and canonical ordering, `key` drives row-data lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub label: String,
    /// Optional layout hint in millimeters. Must be positive when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

/// One cell of row data: JSON string, number or null. Keys absent from a row
/// are treated identically to null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Number(serde_json::Number),
    Text(String),
}

pub type Row = HashMap<String, CellValue>;

/// The `POST /pdf/table` request body. Wire field names are camelCase to
/// match the frontend payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRequest {
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "printedAtISO",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub printed_at_iso: Option<String>,
    #[serde(default)]
    pub rtl: bool,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl TableRequest {
    /// Shape validation run by the HTTP layer before the renderer is invoked.
    /// Collects every problem instead of stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if self.store_name.trim().is_empty() {
            problems.push("storeName must not be empty".to_string());
        }

        if self.columns.is_empty() {
            problems.push("columns must not be empty".to_string());
        }

        let mut seen_keys = HashSet::new();
        for column in &self.columns {
            if column.key.is_empty() {
                problems.push("column key must not be empty".to_string());
            }
            if column.label.is_empty() {
                problems.push(format!("column '{}' label must not be empty", column.key));
            }
            if !seen_keys.insert(column.key.as_str()) {
                problems.push(format!("duplicate column key '{}'", column.key));
            }
            if let Some(width) = column.width {
                if width <= 0.0 {
                    problems.push(format!("column '{}' width must be positive", column.key));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}
