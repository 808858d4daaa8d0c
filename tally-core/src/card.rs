//! Card and group definitions

use crate::{find_column, AggregationType, CardId, Column, ColumnId, FilterCondition, GroupId};
use serde::{Deserialize, Serialize};

/// A saved metric: one aggregation over one column, optionally filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CardConfig {
    pub id: CardId,
    pub title: String,
    pub column_id: ColumnId,
    pub aggregation: AggregationType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Title was synthesized rather than typed by the user
    #[serde(default)]
    pub auto_title: bool,
}

impl CardConfig {
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }
}

/// A named cluster of at least two cards rendered together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GroupConfig {
    pub id: GroupId,
    pub name: String,
    pub card_ids: Vec<CardId>,
}

impl GroupConfig {
    pub fn contains(&self, card_id: CardId) -> bool {
        self.card_ids.contains(&card_id)
    }
}

/// Input for creating a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub column_id: ColumnId,
    pub aggregation: AggregationType,
    pub filters: Vec<FilterCondition>,
    /// Explicit title; synthesized when `None`
    pub title: Option<String>,
}

impl NewCard {
    pub fn new(column_id: impl Into<ColumnId>, aggregation: AggregationType) -> Self {
        Self {
            column_id: column_id.into(),
            aggregation,
            filters: Vec::new(),
            title: None,
        }
    }

    pub fn with_filters(mut self, filters: Vec<FilterCondition>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Edits to an existing card. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardUpdate {
    pub title: Option<String>,
    /// Drop the explicit title and go back to a synthesized one
    pub reset_title: bool,
    pub column_id: Option<ColumnId>,
    pub aggregation: Option<AggregationType>,
    pub filters: Option<Vec<FilterCondition>>,
}

/// Synthesize `"{Aggregation} {Column}"`, followed by the filtered column
/// names in parentheses when filters are present, e.g. `Sum Amount (Status, Paid)`.
/// Each filtered column is listed once, in first-use order; duplicate names
/// and filters on deleted columns are dropped.
pub fn default_title(
    aggregation: AggregationType,
    column: &Column,
    filters: &[FilterCondition],
    columns: &[Column],
) -> String {
    let base = format!("{} {}", aggregation.label(), column.name);
    let mut names: Vec<&str> = Vec::new();
    for filter in filters {
        if let Some(c) = find_column(columns, &filter.column_id) {
            if !names.contains(&c.name.as_str()) {
                names.push(&c.name);
            }
        }
    }
    if names.is_empty() {
        base
    } else {
        format!("{} ({})", base, names.join(", "))
    }
}
