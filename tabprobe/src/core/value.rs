//! Universal conversions of opaque host values.
//!
//! Host cells arrive as [`Value`] (a `serde_json::Value`). These conversions
//! never fail; malformed input degrades to `NaN`, `false` or a best-effort
//! string.

pub use serde_json::Value;

/// Converts any value to its string form.
///
/// Whole numbers print without a fraction, arrays join their elements with
/// `,` (nulls become empty), objects print as compact JSON.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tabprobe::core::value::stringify;
///
/// assert_eq!(stringify(&json!(12.0)), "12");
/// assert_eq!(stringify(&json!([1, null, "a"])), "1,,a");
/// ```
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format_number(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Converts any value to a number; unconvertible input yields `NaN`.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tabprobe::core::value::numify;
///
/// assert_eq!(numify(&json!(" 42.5 ")), 42.5);
/// assert_eq!(numify(&json!(true)), 1.0);
/// assert!(numify(&json!("forty")).is_nan());
/// ```
pub fn numify(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Truthiness of a value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parses user-typed text the way [`numify`] treats a string value.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    // Rust accepts "inf"/"nan" spellings; only plain decimals are numbers here
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Formats a float in its shortest form, without a trailing `.0`.
///
/// Magnitudes from `1e-6` up to but excluding `1e21` print in plain decimal;
/// the rest use exponent form with an explicit sign (`1e+21`, `1.5e-7`), the
/// host's number-to-string layout. Negative zero prints as `0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exp = format!("{n:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        // f64's Display already drops the fraction of whole numbers
        n.to_string()
    }
}

/// Builds a number value, falling back to null for non-finite input.
pub fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stringify_scalars() {
        assert_eq!(stringify(&Value::Null), "null");
        assert_eq!(stringify(&json!(false)), "false");
        assert_eq!(stringify(&json!(7)), "7");
        assert_eq!(stringify(&json!(-7)), "-7");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!("plain")), "plain");
    }

    #[test]
    fn test_stringify_composites() {
        assert_eq!(stringify(&json!([])), "");
        assert_eq!(stringify(&json!([true, [1, 2]])), "true,1,2");
        assert_eq!(stringify(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_numify() {
        assert_eq!(numify(&Value::Null), 0.0);
        assert_eq!(numify(&json!(false)), 0.0);
        assert_eq!(numify(&json!(3)), 3.0);
        assert_eq!(numify(&json!("")), 0.0);
        assert_eq!(numify(&json!("  ")), 0.0);
        assert_eq!(numify(&json!("-1e3")), -1000.0);
        assert!(numify(&json!("inf")).is_nan());
        assert!(numify(&json!("12abc")).is_nan());
        assert!(numify(&json!([1])).is_nan());
        assert!(numify(&json!({})).is_nan());
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(0)));
        assert!(truthy(&json!(0.1)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("0")));
        assert!(truthy(&json!([])));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.25), "-0.25");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_format_number_exponent_range() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e22), "-1.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(2.5e-9), "2.5e-9");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(stringify(&json!(1e21)), "1e+21");
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(2.5), json!(2.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
    }
}
