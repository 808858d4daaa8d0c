//! Tally Test Utilities
//!
//! Shared test infrastructure for the Tally workspace:
//! - Proptest generators for values, records, schemas and configurations
//! - Fixtures for the common dashboard scenarios
//! - Assertions for Tally error variants

// Re-export core types for convenience
pub use tally_core::{
    AggregationType, CardId, CollectionId, Column, ColumnId, ColumnType, Configuration,
    FilterCondition, FilterOperator, GroupId, NewCard, Record, StorageError, TallyError,
    TallyResult, ValidationError, Value,
};

use chrono::NaiveDate;

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Tally types.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_column_type() -> impl Strategy<Value = ColumnType> {
        prop_oneof![
            Just(ColumnType::Text),
            Just(ColumnType::Number),
            Just(ColumnType::Date),
            Just(ColumnType::Boolean),
            Just(ColumnType::Other),
        ]
    }

    pub fn arb_filter_operator() -> impl Strategy<Value = FilterOperator> {
        prop::sample::select(FilterOperator::ALL.to_vec())
    }

    pub fn arb_aggregation_type() -> impl Strategy<Value = AggregationType> {
        prop::sample::select(AggregationType::ALL.to_vec())
    }

    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (1990i32..2040, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
    }

    /// Any cell value, including the blank forms and non-numeric text.
    pub fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Empty),
            Just(Value::Text(String::new())),
            (-1000i64..1000).prop_map(|n| Value::Number(n as f64)),
            (-1.0e6f64..1.0e6).prop_map(Value::Number),
            any::<bool>().prop_map(Value::Boolean),
            "[a-z]{1,6}".prop_map(Value::Text),
            (-100i32..100).prop_map(|n| Value::Text(n.to_string())),
            arb_date().prop_map(Value::Date),
        ]
    }

    /// A record with an arbitrary value under each of `column_names`.
    pub fn arb_record(column_names: Vec<String>) -> impl Strategy<Value = Record> {
        let n = column_names.len();
        ("[a-z0-9]{8}", prop::collection::vec(arb_value(), n)).prop_map(move |(id, values)| {
            column_names
                .iter()
                .zip(values)
                .fold(Record::new(id), |record, (name, value)| record.with(name.clone(), value))
        })
    }

    pub fn arb_records(columns: &[Column], max: usize) -> impl Strategy<Value = Vec<Record>> {
        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        prop::collection::vec(arb_record(names), 0..max)
    }

    /// A condition on one of `columns`, or on a column that does not exist.
    pub fn arb_condition(columns: Vec<Column>) -> impl Strategy<Value = FilterCondition> {
        let mut ids: Vec<ColumnId> = columns.into_iter().map(|c| c.id).collect();
        ids.push(ColumnId::from("deleted-column"));
        (
            prop::sample::select(ids),
            arb_filter_operator(),
            prop::option::of("[a-z0-9]{0,4}"),
        )
            .prop_map(|(column_id, operator, value)| FilterCondition {
                column_id,
                operator,
                value,
            })
    }

    /// A configuration built through the public operations, so it always
    /// satisfies the structural invariants.
    pub fn arb_configuration(columns: Vec<Column>) -> impl Strategy<Value = Configuration> {
        let index_pair = || (any::<prop::sample::Index>(), any::<prop::sample::Index>());
        let specs = prop::collection::vec(index_pair(), 0..8);
        let pairs = prop::collection::vec(index_pair(), 0..3);
        (specs, pairs).prop_map(move |(specs, pairs)| {
            let mut config = Configuration::new();
            for (column_index, aggregation_index) in specs {
                let column = column_index.get(&columns);
                let aggregation = *aggregation_index.get(column.legal_aggregations());
                config
                    .add_card(NewCard::new(column.id.clone(), aggregation), &columns)
                    .expect("generated card is legal");
            }
            if config.cards.len() >= 2 {
                for (a, b) in pairs {
                    let first = a.get(&config.cards).id;
                    let second = b.get(&config.cards).id;
                    // Overlapping or degenerate pairs are rejected and skipped
                    let _ = config.create_group("Group", &[first, second]);
                }
            }
            config
        })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built schemas and records for common scenarios.

    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
    }

    /// A job-tracking schema with one column of each supported type.
    pub fn jobs_columns() -> Vec<Column> {
        vec![
            Column::new("col-title", "Title", ColumnType::Text)
                .with_required(true)
                .with_order(0),
            Column::new("col-hours", "Hours", ColumnType::Number).with_order(1),
            Column::new("col-billable", "Billable", ColumnType::Boolean).with_order(2),
            Column::new("col-due", "Due", ColumnType::Date).with_order(3),
            Column::new("col-status", "Status", ColumnType::Text).with_order(4),
        ]
    }

    /// Records for `jobs_columns`, including blank and non-numeric cells.
    pub fn jobs_records() -> Vec<Record> {
        vec![
            Record::new("job-1")
                .with("Title", "Rewire kitchen")
                .with("Hours", 5)
                .with("Billable", true)
                .with("Due", date(2024, 3, 1))
                .with("Status", "Open"),
            Record::new("job-2")
                .with("Title", "Fix gate")
                .with("Hours", 10)
                .with("Billable", false)
                .with("Status", "Done"),
            Record::new("job-3")
                .with("Title", "Quote")
                .with("Hours", "")
                .with("Billable", true)
                .with("Status", "open"),
            Record::new("job-4")
                .with("Title", "Inspect roof")
                .with("Hours", "tbd")
                .with("Due", date(2024, 1, 15)),
        ]
    }

    /// A single NUMBER column named `n`.
    pub fn number_column() -> Column {
        Column::new("n", "n", ColumnType::Number)
    }

    /// `[{n:5},{n:10},{n:""}]`
    pub fn number_records() -> Vec<Record> {
        vec![
            Record::new("r1").with("n", 5),
            Record::new("r2").with("n", 10),
            Record::new("r3").with("n", ""),
        ]
    }

    /// A BOOLEAN column named `done`.
    pub fn boolean_column() -> Column {
        Column::new("done", "done", ColumnType::Boolean)
    }

    /// `[{done:true},{done:false},{done:true}]`
    pub fn boolean_records() -> Vec<Record> {
        vec![
            Record::new("b1").with("done", true),
            Record::new("b2").with("done", false),
            Record::new("b3").with("done", true),
        ]
    }

    /// Records as they arrive from the record backend's JSON.
    pub fn jobs_records_json() -> Vec<Record> {
        vec![
            Record::from_json(
                "json-1",
                serde_json::json!({"Title": "Paint", "Hours": 3.5, "Billable": true}),
            ),
            Record::from_json(
                "json-2",
                serde_json::json!({"Title": "Sand", "Hours": null, "Billable": "false"}),
            ),
        ]
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for Tally results.

    use super::*;

    /// Assert that a TallyResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &TallyResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a TallyResult is Err.
    #[track_caller]
    pub fn assert_err<T: std::fmt::Debug>(result: &TallyResult<T>) {
        assert!(result.is_err(), "Expected Err, got Ok: {:?}", result);
    }

    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &TallyResult<T>) {
        match result {
            Err(TallyError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &TallyResult<T>) {
        match result {
            Err(TallyError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    /// Assert that every structural invariant of a configuration holds.
    #[track_caller]
    pub fn assert_consistent(configuration: &Configuration) {
        if let Err(e) = configuration.validate() {
            panic!("Configuration is inconsistent: {}", e);
        }
    }
}
