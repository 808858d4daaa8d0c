//! Schema model: user-defined typed columns
//!
//! Columns are owned by the external record backend; this crate only reads
//! them. `name` is the join key into `Record::data`, `order` only affects
//! display.

use crate::{legal_aggregations, legal_operators, AggregationType, ColumnId, ColumnType, FilterOperator};
use serde::{Deserialize, Serialize};

/// A user-defined column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: i32,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type,
            required: false,
            order: 0,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Operators a filter on this column may use.
    pub fn legal_operators(&self) -> &'static [FilterOperator] {
        legal_operators(self.column_type)
    }

    /// Aggregations a card on this column may use.
    pub fn legal_aggregations(&self) -> &'static [AggregationType] {
        legal_aggregations(self.column_type)
    }
}

/// Look up a column by id.
pub fn find_column<'a>(columns: &'a [Column], id: &ColumnId) -> Option<&'a Column> {
    columns.iter().find(|c| &c.id == id)
}

/// Columns sorted by their display order. Ties keep their input order.
pub fn display_order(columns: &[Column]) -> Vec<&Column> {
    let mut sorted: Vec<&Column> = columns.iter().collect();
    sorted.sort_by_key(|c| c.order);
    sorted
}
