//! Record model: one row of untyped data keyed by column name

use crate::{RecordId, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static EMPTY: Value = Value::Empty;

/// A single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub data: HashMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            data: HashMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, column_name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(column_name.into(), value.into());
        self
    }

    /// Read a cell by column name. Absent keys read as `Value::Empty`.
    pub fn get(&self, column_name: &str) -> &Value {
        self.data.get(column_name).unwrap_or(&EMPTY)
    }

    /// Build a record from the JSON object the record backend returns.
    /// Anything other than an object yields a record with no data.
    pub fn from_json(id: impl Into<RecordId>, data: serde_json::Value) -> Self {
        let data = match data {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
            _ => HashMap::new(),
        };
        Self {
            id: id.into(),
            data,
        }
    }
}
