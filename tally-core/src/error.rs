//! Error types for Tally operations
//!
//! Only contract violations at the API boundary and storage failures are
//! errors. The filter evaluator and aggregation calculator never fail; they
//! degrade dangling references and bad values locally.

use crate::{AggregationType, CardId, ColumnId, ColumnType, FilterOperator, GroupId};
use thiserror::Error;

/// Caller contract violations. Returned before any state is mutated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Card not found: {card_id}")]
    UnknownCard { card_id: CardId },

    #[error("Group not found: {group_id}")]
    UnknownGroup { group_id: GroupId },

    #[error("Column not found: {column_id}")]
    UnknownColumn { column_id: ColumnId },

    #[error("Aggregation {aggregation} is not available for {column_type} columns")]
    IllegalAggregation {
        aggregation: AggregationType,
        column_type: ColumnType,
    },

    #[error("Operator {operator} is not available for {column_type} columns")]
    IllegalOperator {
        operator: FilterOperator,
        column_type: ColumnType,
    },

    #[error("Operator {operator} on column {column_id} requires a comparison value")]
    MissingFilterValue {
        column_id: ColumnId,
        operator: FilterOperator,
    },

    #[error("A group needs at least 2 cards, got {count}")]
    GroupTooSmall { count: usize },

    #[error("Card {card_id} listed more than once")]
    DuplicateGroupMember { card_id: CardId },

    #[error("Card {card_id} already belongs to group {group_id}")]
    AlreadyGrouped { card_id: CardId, group_id: GroupId },

    #[error("{field} must not be blank")]
    BlankName { field: String },

    #[error("Duplicate id in configuration: {id}")]
    DuplicateId { id: String },

    #[error("Inconsistent group membership for card {card_id}")]
    InconsistentMembership { card_id: CardId },
}

/// Persistence adapter errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage backend failed: {reason}")]
    Backend { reason: String },

    #[error("Stored data for {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Tally errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TallyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Tally operations.
pub type TallyResult<T> = Result<T, TallyError>;

// =============================================================================
// TESTS
// =============================================================================
