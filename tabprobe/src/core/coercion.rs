//! Column-type driven coercion of host values.
//!
//! Two directions are covered: values rendered for display in a table, and
//! values turned into condition operands for drill-down filters.

use serde::Serialize;
use std::fmt::{self, Write};

use super::column::{ColumnType, TextualPolicy};
use super::condition::ConditionOperand;
use super::geo::{geo_to_string, GeoPoint};
use super::temporal::{decode_date, decode_duration, format_duration_short};
use super::value::{format_number, numify, stringify, truthy, Value};

/// Formatting knobs for [`to_display_value_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// `chrono` format string for date-time cells (rendered in UTC)
    pub datetime_format: String,
    /// Text shown for date-time cells that cannot be decoded
    pub invalid_date_text: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            datetime_format: "%-m/%-d/%Y, %-I:%M:%S %p".to_string(),
            invalid_date_text: String::new(),
        }
    }
}

impl DisplayConfig {
    /// ISO-8601 rendering with millisecond precision.
    pub fn iso() -> Self {
        Self {
            datetime_format: "%Y-%m-%dT%H:%M:%S%.3fZ".to_string(),
            ..Self::default()
        }
    }

    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    pub fn with_invalid_date_text(mut self, text: impl Into<String>) -> Self {
        self.invalid_date_text = text.into();
        self
    }
}

/// A cell ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Number(f64),
    Text(String),
    /// The host value, passed through untouched
    Raw(Value),
}

impl DisplayValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DisplayValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            DisplayValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => f.write_str(&format_number(*n)),
            DisplayValue::Text(text) => f.write_str(text),
            DisplayValue::Raw(value) => f.write_str(&stringify(value)),
        }
    }
}

/// Renders a host value for display with the default [`DisplayConfig`].
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tabprobe::core::{to_display_value, ColumnType, DisplayValue};
///
/// assert_eq!(to_display_value(&json!("12"), &ColumnType::Integer), DisplayValue::Number(12.0));
/// assert_eq!(to_display_value(&json!(0), &ColumnType::Bool), DisplayValue::Text("false".into()));
/// assert_eq!(
///     to_display_value(&json!(1.5), &ColumnType::DateTime),
///     DisplayValue::Text("12/31/1899, 12:00:00 PM".into())
/// );
/// ```
pub fn to_display_value(value: &Value, column_type: &ColumnType) -> DisplayValue {
    to_display_value_with(&DisplayConfig::default(), value, column_type)
}

/// Renders a host value for display.
pub fn to_display_value_with(
    config: &DisplayConfig,
    value: &Value,
    column_type: &ColumnType,
) -> DisplayValue {
    match column_type {
        ColumnType::Integer | ColumnType::Numeric => DisplayValue::Number(numify(value)),
        ColumnType::Bool => DisplayValue::Text(truthy(value).to_string()),
        ColumnType::NumId | ColumnType::String | ColumnType::Text | ColumnType::Uuid => {
            DisplayValue::Text(stringify(value))
        }
        ColumnType::DateTime => {
            let mut text = String::new();
            let rendered = decode_date(numify(value), false)
                .is_some_and(|dt| write!(text, "{}", dt.format(&config.datetime_format)).is_ok());
            if !rendered {
                text = config.invalid_date_text.clone();
            }
            DisplayValue::Text(text)
        }
        ColumnType::Duration => {
            let duration = decode_duration(Some(numify(value)));
            DisplayValue::Text(format_duration_short(&duration))
        }
        ColumnType::Geo => match GeoPoint::from_value(value) {
            Some(point) => DisplayValue::Text(geo_to_string(&point)),
            None => DisplayValue::Raw(value.clone()),
        },
        ColumnType::Id | ColumnType::Other(_) => DisplayValue::Raw(value.clone()),
    }
}

/// Builds the condition operand for a value under the extended textual policy.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tabprobe::core::{to_condition_operand, ColumnType, ConditionOperand};
///
/// assert_eq!(
///     to_condition_operand(&json!(42), Some(&ColumnType::NumId)),
///     ConditionOperand::text("42")
/// );
/// assert_eq!(
///     to_condition_operand(&json!("42"), Some(&ColumnType::Integer)),
///     ConditionOperand::number(42.0)
/// );
/// ```
pub fn to_condition_operand(value: &Value, column_type: Option<&ColumnType>) -> ConditionOperand {
    to_condition_operand_with(TextualPolicy::Extended, value, column_type)
}

/// Builds the condition operand for a value: `val` for textual types,
/// `dVal` for everything else (including a missing type).
pub fn to_condition_operand_with(
    policy: TextualPolicy,
    value: &Value,
    column_type: Option<&ColumnType>,
) -> ConditionOperand {
    let textual = column_type.is_some_and(|ty| ty.is_textual_with(policy));
    if textual {
        ConditionOperand::text(stringify(value))
    } else {
        ConditionOperand::number(numify(value))
    }
}
