//! Tally Core - Dashboard Types, Filtering and Aggregation
//!
//! Pure, synchronous logic for summary dashboards over a user-defined
//! collection: the schema and record model, filter evaluation, type-aware
//! aggregation, the card/group configuration and its rendering. Persistence
//! lives in tally-storage.

pub mod aggregation;
pub mod card;
pub mod config;
pub mod configuration;
pub mod enums;
pub mod error;
pub mod filter;
pub mod identity;
pub mod record;
pub mod schema;
pub mod value;
pub mod view;

pub use aggregation::{
    compute, default_aggregation, is_legal_aggregation, legal_aggregations, reconcile_aggregation,
    reduce, AggregateValue, AGGREGATION_TABLE,
};
pub use card::{default_title, CardConfig, CardUpdate, GroupConfig, NewCard};
pub use config::StoreConfig;
pub use configuration::{Configuration, MIN_GROUP_SIZE};
pub use enums::{AggregationType, ColumnType, FilterOperator, ParseEnumError};
pub use error::{ConfigError, StorageError, TallyError, TallyResult, ValidationError};
pub use filter::{
    default_operator, evaluate, filter_records, legal_operators, matches_all,
    operator_requires_value, validate_conditions, FilterCondition, OPERATOR_TABLE,
};
pub use identity::{CardId, CollectionId, ColumnId, GroupId, RecordId};
pub use record::Record;
pub use schema::{display_order, find_column, Column};
pub use value::{format_number, parse_number, Value, DATE_FORMAT};
pub use view::{render, render_card, CardView, DashboardEntry, GroupView};
