//! Input table model
//!
//! The rectangular table handed to the attribution engine: named columns and
//! one JSON object per row, in the `{columns, data}` records shape.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One input row, keyed by column name
pub type Row = Map<String, Value>;

/// Rectangular table of touchpoint events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTable {
    /// Column names in declaration order
    pub columns: Vec<String>,

    /// Rows as column -> cell value
    #[serde(rename = "data")]
    pub rows: Vec<Row>,
}

/// Accepted on-disk shapes: records with an optional column list, or a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum TablePayload {
    Records {
        columns: Option<Vec<String>>,
        data: Vec<Row>,
    },
    Bare(Vec<Row>),
}

impl InputTable {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from row objects; columns are the union of keys in first-seen order
    pub fn from_records(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Parse a table from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let payload: TablePayload = serde_json::from_str(text)?;
        Ok(match payload {
            TablePayload::Records {
                columns: Some(columns),
                data,
            } => Self::new(columns, data),
            TablePayload::Records {
                columns: None,
                data,
            } => Self::from_records(data),
            TablePayload::Bare(rows) => Self::from_records(rows),
        })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
