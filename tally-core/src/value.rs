//! Dynamically-typed cell values
//!
//! Records carry untyped data keyed by column name. `Value` is the closed set
//! of shapes a cell can take, and the single place that defines emptiness,
//! stringification and numeric coercion for both filtering and aggregation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for display and JSON output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// Absent or null
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl Value {
    /// Tri-state emptiness: absent, null and the empty string are all empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Stringified form used by the text comparison operators.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }

    /// Numeric coercion. Anything without a numeric reading becomes NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Empty => f64::NAN,
            Value::Text(s) => parse_number(s),
            Value::Number(n) => *n,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            Value::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis() as f64)
                .unwrap_or(f64::NAN),
        }
    }

    /// Strict boolean literal check; the string `"true"` is not `true`.
    pub fn is_bool(&self, expected: bool) -> bool {
        matches!(self, Value::Boolean(b) if *b == expected)
    }
}

/// Parse a decimal literal the way a user typed it.
///
/// Surrounding whitespace is ignored. Blank input and anything that is not a
/// plain decimal literal (digits, sign, point, exponent) yield NaN.
pub fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    let literal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !literal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Render a number without a trailing `.0` for whole values.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Empty,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Empty),
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Empty => serde_json::Value::Null,
            Value::Text(s) => serde_json::Value::String(s),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serde_json::Value::from(n as i64)
            }
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Date(d) => serde_json::Value::String(d.format(DATE_FORMAT).to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Empty)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emptiness_is_tri_state() {
        assert!(Value::Empty.is_empty());
        assert!(Value::Text(String::new()).is_empty());
        assert!(!Value::Text(" ".to_string()).is_empty());
        assert!(!Value::Number(0.0).is_empty());
        assert!(!Value::Boolean(false).is_empty());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("6"), 6.0);
        assert_eq!(parse_number(" 2.5 "), 2.5);
        assert_eq!(parse_number("-1e3"), -1000.0);
        assert!(parse_number("").is_nan());
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert!(parse_number("1.2.3").is_nan());
    }

    #[test]
    fn test_to_number_coercions() {
        assert_eq!(Value::from(true).to_number(), 1.0);
        assert_eq!(Value::from(false).to_number(), 0.0);
        assert_eq!(Value::from("42").to_number(), 42.0);
        assert!(Value::Empty.to_number().is_nan());
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(Value::from(date).to_number(), 86_400_000.0);
    }

    #[test]
    fn test_display_string() {
        assert_eq!(Value::from(5.0).to_display_string(), "5");
        assert_eq!(Value::from(7.5).to_display_string(), "7.5");
        assert_eq!(Value::from(true).to_display_string(), "true");
        assert_eq!(Value::Empty.to_display_string(), "");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::from(date).to_display_string(), "2024-03-09");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(-0.25), "-0.25");
    }

    #[test]
    fn test_json_interop() {
        assert_eq!(Value::from(json!(null)), Value::Empty);
        assert_eq!(Value::from(json!(3)), Value::Number(3.0));
        assert_eq!(Value::from(json!("x")), Value::Text("x".to_string()));
        assert_eq!(Value::from(json!(false)), Value::Boolean(false));
        assert_eq!(Value::from(json!([1, 2])), Value::Text("[1,2]".to_string()));

        assert_eq!(serde_json::to_string(&Value::Number(15.0)).unwrap(), "15");
        assert_eq!(serde_json::to_string(&Value::Number(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Value::Empty).unwrap(), "null");
    }

    #[test]
    fn test_bool_check_is_strict() {
        assert!(Value::from(true).is_bool(true));
        assert!(!Value::from("true").is_bool(true));
        assert!(!Value::from(1.0).is_bool(true));
        assert!(Value::from(false).is_bool(false));
        assert!(!Value::Empty.is_bool(false));
    }
}
