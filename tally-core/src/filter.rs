//! Type-aware filter conditions
//!
//! A card's filter set is a conjunction of conditions, each naming a column,
//! an operator and the raw comparison text the user typed. Evaluation never
//! fails: a condition whose column no longer exists passes every record.

use crate::{find_column, parse_number, Column, ColumnId, ColumnType, FilterOperator, Record, ValidationError};
use serde::{Deserialize, Serialize};

// ============================================================================
// OPERATOR TABLE
// ============================================================================

use FilterOperator::*;

const NUMBER_OPERATORS: &[FilterOperator] = &[
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    IsEmpty,
    IsNotEmpty,
];
const BOOLEAN_OPERATORS: &[FilterOperator] = &[IsTrue, IsFalse];
const TEXT_OPERATORS: &[FilterOperator] = &[Equals, NotEquals, Contains, IsEmpty, IsNotEmpty];
const DATE_OPERATORS: &[FilterOperator] =
    &[Equals, NotEquals, GreaterThan, LessThan, IsEmpty, IsNotEmpty];
const FALLBACK_OPERATORS: &[FilterOperator] = &[Equals, NotEquals];

/// Legal operators per column type. The first entry is the default.
pub const OPERATOR_TABLE: &[(ColumnType, &[FilterOperator])] = &[
    (ColumnType::Number, NUMBER_OPERATORS),
    (ColumnType::Boolean, BOOLEAN_OPERATORS),
    (ColumnType::Text, TEXT_OPERATORS),
    (ColumnType::Date, DATE_OPERATORS),
];

/// Operators a condition on a column of this type may use, default first.
pub fn legal_operators(column_type: ColumnType) -> &'static [FilterOperator] {
    OPERATOR_TABLE
        .iter()
        .find(|(ty, _)| *ty == column_type)
        .map(|(_, ops)| *ops)
        .unwrap_or(FALLBACK_OPERATORS)
}

/// The operator preselected when a condition targets a column of this type.
pub fn default_operator(column_type: ColumnType) -> FilterOperator {
    legal_operators(column_type)[0]
}

/// Whether the operator compares against a user-supplied value.
pub fn operator_requires_value(operator: FilterOperator) -> bool {
    !matches!(operator, IsTrue | IsFalse | IsEmpty | IsNotEmpty)
}

// ============================================================================
// FILTER CONDITION
// ============================================================================

/// A single filter condition. `value` is raw user input, coerced at
/// evaluation time according to the target column's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FilterCondition {
    pub column_id: ColumnId,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FilterCondition {
    pub fn new(
        column_id: impl Into<ColumnId>,
        operator: FilterOperator,
        value: Option<&str>,
    ) -> Self {
        Self {
            column_id: column_id.into(),
            operator,
            value: value.map(str::to_string),
        }
    }

    /// A fresh condition on `column` with its default operator and no value.
    pub fn for_column(column: &Column) -> Self {
        Self {
            column_id: column.id.clone(),
            operator: default_operator(column.column_type),
            value: None,
        }
    }

    /// Point the condition at another column. Resets the operator to the
    /// column type's default and clears the comparison value.
    pub fn retarget(&mut self, column: &Column) {
        *self = Self::for_column(column);
    }

    /// Human summary such as `Status = done`, or `None` if the column is gone.
    pub fn describe(&self, columns: &[Column]) -> Option<String> {
        let column = find_column(columns, &self.column_id)?;
        let summary = match (&self.value, operator_requires_value(self.operator)) {
            (Some(value), true) => format!("{} {} {}", column.name, self.operator.label(), value),
            _ => format!("{} {}", column.name, self.operator.label()),
        };
        Some(summary)
    }

    /// Evaluate against one record.
    pub fn matches(&self, record: &Record, columns: &[Column]) -> bool {
        evaluate(record, self, columns)
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Evaluate one condition against one record.
///
/// Text operators compare case-insensitively against the stringified cell.
/// Ordering operators coerce both sides to numbers; a side without a numeric
/// reading is NaN, so every ordering comparison involving it is false.
pub fn evaluate(record: &Record, condition: &FilterCondition, columns: &[Column]) -> bool {
    let Some(column) = find_column(columns, &condition.column_id) else {
        return true;
    };
    let cell = record.get(&column.name);
    let target = condition.value.as_deref().unwrap_or("");

    match condition.operator {
        Equals => cell.to_display_string().to_lowercase() == target.to_lowercase(),
        NotEquals => cell.to_display_string().to_lowercase() != target.to_lowercase(),
        Contains => cell
            .to_display_string()
            .to_lowercase()
            .contains(&target.to_lowercase()),
        GreaterThan => cell.to_number() > parse_number(target),
        LessThan => cell.to_number() < parse_number(target),
        GreaterThanOrEqual => cell.to_number() >= parse_number(target),
        LessThanOrEqual => cell.to_number() <= parse_number(target),
        IsTrue => cell.is_bool(true),
        IsFalse => cell.is_bool(false),
        IsEmpty => cell.is_empty(),
        IsNotEmpty => !cell.is_empty(),
        Unsupported => true,
    }
}

/// Conjunction of all conditions. An empty list matches every record.
pub fn matches_all(record: &Record, conditions: &[FilterCondition], columns: &[Column]) -> bool {
    conditions.iter().all(|c| evaluate(record, c, columns))
}

/// Records passing every condition, in input order.
pub fn filter_records<'a>(
    records: &'a [Record],
    conditions: &[FilterCondition],
    columns: &[Column],
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| matches_all(r, conditions, columns))
        .collect()
}

/// Check a filter set at the API boundary.
///
/// Conditions on missing columns are accepted; they fail open when evaluated.
pub fn validate_conditions(
    conditions: &[FilterCondition],
    columns: &[Column],
) -> Result<(), ValidationError> {
    for condition in conditions {
        let Some(column) = find_column(columns, &condition.column_id) else {
            continue;
        };
        if !column.legal_operators().contains(&condition.operator) {
            return Err(ValidationError::IllegalOperator {
                operator: condition.operator,
                column_type: column.column_type,
            });
        }
        let blank = condition.value.as_deref().map_or(true, |v| v.trim().is_empty());
        if operator_requires_value(condition.operator) && blank {
            return Err(ValidationError::MissingFilterValue {
                column_id: column.id.clone(),
                operator: condition.operator,
            });
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("c-n", "n", ColumnType::Number),
            Column::new("c-name", "name", ColumnType::Text),
            Column::new("c-done", "done", ColumnType::Boolean),
            Column::new("c-due", "due", ColumnType::Date),
        ]
    }

    fn number_records() -> Vec<Record> {
        vec![
            Record::new("r1").with("n", 5),
            Record::new("r2").with("n", 10),
            Record::new("r3").with("n", ""),
        ]
    }

    #[test]
    fn test_legal_operator_table() {
        assert_eq!(legal_operators(ColumnType::Number), NUMBER_OPERATORS);
        assert_eq!(legal_operators(ColumnType::Boolean), &[IsTrue, IsFalse]);
        assert_eq!(
            legal_operators(ColumnType::Text),
            &[Equals, NotEquals, Contains, IsEmpty, IsNotEmpty]
        );
        assert_eq!(
            legal_operators(ColumnType::Date),
            &[Equals, NotEquals, GreaterThan, LessThan, IsEmpty, IsNotEmpty]
        );
        assert_eq!(legal_operators(ColumnType::Other), &[Equals, NotEquals]);
    }

    #[test]
    fn test_default_operator_is_first_entry() {
        assert_eq!(default_operator(ColumnType::Number), Equals);
        assert_eq!(default_operator(ColumnType::Boolean), IsTrue);
        assert_eq!(default_operator(ColumnType::Other), Equals);
    }

    #[test]
    fn test_operator_requires_value() {
        for op in FilterOperator::ALL {
            let expected = !matches!(op, IsTrue | IsFalse | IsEmpty | IsNotEmpty);
            assert_eq!(operator_requires_value(op), expected, "{op}");
        }
    }

    #[test]
    fn test_greater_than_keeps_only_larger_numbers() {
        let records = number_records();
        let condition = FilterCondition::new("c-n", GreaterThan, Some("6"));
        let kept = filter_records(&records, &[condition], &columns());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_str(), "r2");
    }

    #[test]
    fn test_ordering_against_non_numeric_is_false_both_ways() {
        let record = Record::new("r").with("n", "abc");
        let gt = FilterCondition::new("c-n", GreaterThan, Some("1"));
        let lt = FilterCondition::new("c-n", LessThan, Some("1"));
        assert!(!evaluate(&record, &gt, &columns()));
        assert!(!evaluate(&record, &lt, &columns()));

        let numeric = Record::new("r").with("n", 3);
        let bad_target = FilterCondition::new("c-n", GreaterThanOrEqual, Some("three"));
        assert!(!evaluate(&numeric, &bad_target, &columns()));
    }

    #[test]
    fn test_inclusive_bounds() {
        let record = Record::new("r").with("n", 5);
        assert!(evaluate(&record, &FilterCondition::new("c-n", GreaterThanOrEqual, Some("5")), &columns()));
        assert!(evaluate(&record, &FilterCondition::new("c-n", LessThanOrEqual, Some("5")), &columns()));
        assert!(!evaluate(&record, &FilterCondition::new("c-n", LessThan, Some("5")), &columns()));
    }

    #[test]
    fn test_text_operators_are_case_insensitive() {
        let record = Record::new("r").with("name", "Alice Smith");
        let cols = columns();
        assert!(evaluate(&record, &FilterCondition::new("c-name", Equals, Some("alice smith")), &cols));
        assert!(evaluate(&record, &FilterCondition::new("c-name", Contains, Some("SMITH")), &cols));
        assert!(evaluate(&record, &FilterCondition::new("c-name", NotEquals, Some("bob")), &cols));
        assert!(!evaluate(&record, &FilterCondition::new("c-name", NotEquals, Some("ALICE SMITH")), &cols));
    }

    #[test]
    fn test_equals_on_missing_cell_compares_empty_string() {
        let record = Record::new("r");
        let cols = columns();
        assert!(evaluate(&record, &FilterCondition::new("c-name", Equals, Some("")), &cols));
        assert!(evaluate(&record, &FilterCondition::new("c-name", Contains, Some("")), &cols));
        assert!(!evaluate(&record, &FilterCondition::new("c-name", Equals, Some("x")), &cols));
    }

    #[test]
    fn test_equals_on_numbers_uses_stringified_value() {
        let record = Record::new("r").with("n", 5);
        assert!(evaluate(&record, &FilterCondition::new("c-n", Equals, Some("5")), &columns()));
        assert!(!evaluate(&record, &FilterCondition::new("c-n", Equals, Some("5.0")), &columns()));
    }

    #[test]
    fn test_boolean_operators_are_strict() {
        let cols = columns();
        let is_true = FilterCondition::new("c-done", IsTrue, None);
        let is_false = FilterCondition::new("c-done", IsFalse, None);
        assert!(evaluate(&Record::new("r").with("done", true), &is_true, &cols));
        assert!(!evaluate(&Record::new("r").with("done", "true"), &is_true, &cols));
        assert!(evaluate(&Record::new("r").with("done", false), &is_false, &cols));
        assert!(!evaluate(&Record::new("r"), &is_false, &cols));
    }

    #[test]
    fn test_emptiness_operators() {
        let cols = columns();
        let is_empty = FilterCondition::new("c-name", IsEmpty, None);
        let is_not_empty = FilterCondition::new("c-name", IsNotEmpty, None);
        for record in [
            Record::new("a"),
            Record::new("b").with("name", Value::Empty),
            Record::new("c").with("name", ""),
        ] {
            assert!(evaluate(&record, &is_empty, &cols));
            assert!(!evaluate(&record, &is_not_empty, &cols));
        }
        let filled = Record::new("d").with("name", "x");
        assert!(!evaluate(&filled, &is_empty, &cols));
        assert!(evaluate(&filled, &is_not_empty, &cols));
    }

    #[test]
    fn test_date_ordering_uses_numeric_coercion() {
        let cols = columns();
        let due = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let record = Record::new("r").with("due", due);
        // A date literal has no numeric reading.
        let by_date = FilterCondition::new("c-due", GreaterThan, Some("2024-01-01"));
        assert!(!evaluate(&record, &by_date, &cols));
        let by_millis = FilterCondition::new("c-due", GreaterThan, Some("0"));
        assert!(evaluate(&record, &by_millis, &cols));
        let by_equality = FilterCondition::new("c-due", Equals, Some("2024-01-02"));
        assert!(evaluate(&record, &by_equality, &cols));
    }

    #[test]
    fn test_missing_column_fails_open() {
        let records = number_records();
        let dangling = FilterCondition::new("deleted", Equals, Some("nothing matches this"));
        let conditions = vec![dangling];
        for record in &records {
            assert!(matches_all(record, &conditions, &columns()));
        }
        assert_eq!(filter_records(&records, &conditions, &columns()).len(), records.len());
    }

    #[test]
    fn test_unsupported_operator_passes() {
        let record = Record::new("r").with("n", 1);
        let condition = FilterCondition::new("c-n", Unsupported, Some("x"));
        assert!(evaluate(&record, &condition, &columns()));
    }

    #[test]
    fn test_conjunction() {
        let cols = columns();
        let record = Record::new("r").with("n", 7).with("name", "Widget");
        let pass = FilterCondition::new("c-n", GreaterThan, Some("6"));
        let fail = FilterCondition::new("c-name", Contains, Some("gadget"));
        assert!(matches_all(&record, &[pass.clone()], &cols));
        assert!(!matches_all(&record, &[pass, fail], &cols));
        assert!(matches_all(&record, &[], &cols));
    }

    #[test]
    fn test_retarget_resets_operator_and_value() {
        let cols = columns();
        let mut condition = FilterCondition::new("c-n", GreaterThan, Some("3"));
        condition.retarget(&cols[2]);
        assert_eq!(condition.column_id, ColumnId::from("c-done"));
        assert_eq!(condition.operator, IsTrue);
        assert_eq!(condition.value, None);
    }

    #[test]
    fn test_describe() {
        let cols = columns();
        let with_value = FilterCondition::new("c-n", GreaterThan, Some("6"));
        assert_eq!(with_value.describe(&cols).as_deref(), Some("n > 6"));
        let without_value = FilterCondition::new("c-done", IsTrue, None);
        assert_eq!(without_value.describe(&cols).as_deref(), Some("done is true"));
        let dangling = FilterCondition::new("gone", Equals, Some("x"));
        assert_eq!(dangling.describe(&cols), None);
    }

    #[test]
    fn test_validate_conditions() {
        let cols = columns();
        assert!(validate_conditions(&[FilterCondition::new("c-n", GreaterThan, Some("1"))], &cols).is_ok());
        assert!(validate_conditions(&[FilterCondition::new("gone", Contains, None)], &cols).is_ok());

        let illegal = validate_conditions(&[FilterCondition::new("c-done", Equals, Some("x"))], &cols);
        assert_eq!(
            illegal,
            Err(ValidationError::IllegalOperator {
                operator: Equals,
                column_type: ColumnType::Boolean,
            })
        );

        let missing = validate_conditions(&[FilterCondition::new("c-name", Contains, Some("  "))], &cols);
        assert!(matches!(missing, Err(ValidationError::MissingFilterValue { .. })));

        assert!(validate_conditions(&[FilterCondition::new("c-name", IsEmpty, None)], &cols).is_ok());
    }

    #[test]
    fn test_condition_serialization_omits_missing_value() {
        let condition = FilterCondition::new("c-done", IsTrue, None);
        let json = serde_json::to_string(&condition).unwrap();
        assert_eq!(json, r#"{"column_id":"c-done","operator":"IS_TRUE"}"#);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::Value;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Empty),
            "[a-z0-9 ]{0,8}".prop_map(Value::Text),
            (-1000.0f64..1000.0).prop_map(Value::Number),
            any::<bool>().prop_map(Value::Boolean),
        ]
    }

    fn arb_records() -> impl Strategy<Value = Vec<Record>> {
        prop::collection::vec(arb_value(), 0..20).prop_map(|values| {
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| Record::new(format!("r{i}")).with("n", v))
                .collect()
        })
    }

    fn arb_condition() -> impl Strategy<Value = FilterCondition> {
        (
            prop::sample::select(FilterOperator::ALL.to_vec()),
            proptest::option::of("[a-z0-9]{0,4}"),
        )
            .prop_map(|(op, value)| FilterCondition {
                column_id: ColumnId::from("c-n"),
                operator: op,
                value,
            })
    }

    fn columns() -> Vec<Column> {
        vec![Column::new("c-n", "n", ColumnType::Number)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: an empty condition list is the identity filter
        #[test]
        fn prop_empty_conditions_keep_everything(records in arb_records()) {
            let kept = filter_records(&records, &[], &columns());
            prop_assert_eq!(kept.len(), records.len());
            for (a, b) in kept.iter().zip(records.iter()) {
                prop_assert_eq!(*a, b);
            }
        }

        /// Property: conditions on a missing column never reject a record
        #[test]
        fn prop_dangling_conditions_fail_open(
            records in arb_records(),
            mut condition in arb_condition(),
        ) {
            condition.column_id = ColumnId::from("deleted-column");
            let kept = filter_records(&records, &[condition], &columns());
            prop_assert_eq!(kept.len(), records.len());
        }

        /// Property: IS_EMPTY and IS_NOT_EMPTY partition every record set
        #[test]
        fn prop_emptiness_partitions(records in arb_records()) {
            let empty = FilterCondition::new("c-n", IsEmpty, None);
            let not_empty = FilterCondition::new("c-n", IsNotEmpty, None);
            let a = filter_records(&records, &[empty], &columns()).len();
            let b = filter_records(&records, &[not_empty], &columns()).len();
            prop_assert_eq!(a + b, records.len());
        }

        /// Property: adding a condition never grows the result
        #[test]
        fn prop_conjunction_is_monotone(
            records in arb_records(),
            first in arb_condition(),
            second in arb_condition(),
        ) {
            let one = filter_records(&records, &[first.clone()], &columns()).len();
            let two = filter_records(&records, &[first, second], &columns()).len();
            prop_assert!(two <= one);
        }
    }
}
