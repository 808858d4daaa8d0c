//! Enum types for Tally columns, filters and aggregations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// COLUMN TYPE
// ============================================================================

/// Declared type of a user-defined column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Boolean,
    /// Any type string this version does not know about
    #[serde(other)]
    Other,
}

impl ColumnType {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Number => "NUMBER",
            ColumnType::Date => "DATE",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Other => "OTHER",
        }
    }

    /// Parse from wire representation. Unknown strings map to `Other`.
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => ColumnType::Text,
            "NUMBER" => ColumnType::Number,
            "DATE" => ColumnType::Date,
            "BOOLEAN" => ColumnType::Boolean,
            _ => ColumnType::Other,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// FILTER OPERATOR
// ============================================================================

/// Comparison operator of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    IsTrue,
    IsFalse,
    IsEmpty,
    IsNotEmpty,
    /// Operator read from storage that this version does not know; always passes.
    /// The original name is not kept, so a re-save writes `UNSUPPORTED`.
    #[serde(other)]
    Unsupported,
}

impl FilterOperator {
    /// All known operators, in declaration order.
    pub const ALL: [FilterOperator; 11] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Contains,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThanOrEqual,
        FilterOperator::IsTrue,
        FilterOperator::IsFalse,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "EQUALS",
            FilterOperator::NotEquals => "NOT_EQUALS",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FilterOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FilterOperator::IsTrue => "IS_TRUE",
            FilterOperator::IsFalse => "IS_FALSE",
            FilterOperator::IsEmpty => "IS_EMPTY",
            FilterOperator::IsNotEmpty => "IS_NOT_EMPTY",
            FilterOperator::Unsupported => "UNSUPPORTED",
        }
    }

    /// Short label shown in filter summaries.
    pub fn label(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::NotEquals => "≠",
            FilterOperator::Contains => "contains",
            FilterOperator::GreaterThan => ">",
            FilterOperator::LessThan => "<",
            FilterOperator::GreaterThanOrEqual => "≥",
            FilterOperator::LessThanOrEqual => "≤",
            FilterOperator::IsTrue => "is true",
            FilterOperator::IsFalse => "is false",
            FilterOperator::IsEmpty => "is empty",
            FilterOperator::IsNotEmpty => "is not empty",
            FilterOperator::Unsupported => "?",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == upper)
            .ok_or_else(|| ParseEnumError::new("filter operator", s))
    }
}

// ============================================================================
// AGGREGATION TYPE
// ============================================================================

/// Reduction applied to a card's column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    Count,
    Sum,
    Average,
    Min,
    Max,
    CountTrue,
    CountFalse,
    /// Aggregation read from storage that this version does not know; computes 0.
    /// The original name is not kept, so a re-save writes `UNSUPPORTED`.
    #[serde(other)]
    Unsupported,
}

impl AggregationType {
    /// All known aggregations, in declaration order.
    pub const ALL: [AggregationType; 7] = [
        AggregationType::Count,
        AggregationType::Sum,
        AggregationType::Average,
        AggregationType::Min,
        AggregationType::Max,
        AggregationType::CountTrue,
        AggregationType::CountFalse,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Count => "COUNT",
            AggregationType::Sum => "SUM",
            AggregationType::Average => "AVERAGE",
            AggregationType::Min => "MIN",
            AggregationType::Max => "MAX",
            AggregationType::CountTrue => "COUNT_TRUE",
            AggregationType::CountFalse => "COUNT_FALSE",
            AggregationType::Unsupported => "UNSUPPORTED",
        }
    }

    /// Human label used in card titles.
    pub fn label(&self) -> &'static str {
        match self {
            AggregationType::Count => "Count",
            AggregationType::Sum => "Sum",
            AggregationType::Average => "Average",
            AggregationType::Min => "Min",
            AggregationType::Max => "Max",
            AggregationType::CountTrue => "Count True",
            AggregationType::CountFalse => "Count False",
            AggregationType::Unsupported => "Unknown",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|agg| agg.as_str() == upper)
            .ok_or_else(|| ParseEnumError::new("aggregation", s))
    }
}

// ============================================================================
// PARSE ERROR
// ============================================================================

/// Error when parsing an invalid enum string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

// =============================================================================
// TESTS
// =============================================================================
