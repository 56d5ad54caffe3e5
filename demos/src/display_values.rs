//! Shows how host cell values render for each column type, and which
//! condition operand each one becomes.
//!
//! Run with:
//! ```bash
//! cargo run --example display_values
//! ```

use serde_json::json;
use tabprobe::core::{
    decode_duration, geo_to_string_with, to_condition_operand_with, to_display_value_with,
    GeoPoint, GEO_NAN,
};
use tabprobe::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let samples = vec![
        (ColumnType::Integer, json!("42")),
        (ColumnType::Numeric, json!(3.25)),
        (ColumnType::Bool, json!(0)),
        (ColumnType::NumId, json!(9001)),
        (ColumnType::Uuid, json!("5f0c6f9e-6a3b-4c1e-9d8f-2b7a1c0e4d55")),
        (ColumnType::DateTime, json!(45000.25)),
        (ColumnType::DateTime, json!("yesterday")),
        (ColumnType::Duration, json!(3.09375)),
        (
            ColumnType::Geo,
            json!({"latitude": 59.91, "longitude": 10.75, "elevation": GEO_NAN}),
        ),
        (ColumnType::Other("Blob".to_string()), json!([1, null, 3])),
    ];

    let locale_like = DisplayConfig::default();
    let iso = DisplayConfig::iso().with_invalid_date_text("Invalid Date");

    println!(
        "{:<10} {:<40} {:<28} {:<28} {}",
        "type", "value", "display", "display (iso)", "operand"
    );
    for (column_type, value) in &samples {
        let display = to_display_value_with(&locale_like, value, column_type);
        let display_iso = to_display_value_with(&iso, value, column_type);
        let operand = to_condition_operand_with(TextualPolicy::Extended, value, Some(column_type));
        println!(
            "{:<10} {:<40} {:<28} {:<28} {}",
            column_type.to_string(),
            value.to_string(),
            display.to_string(),
            display_iso.to_string(),
            serde_json::to_string(&operand)?
        );
    }

    println!("\nDuration parts of 3.09375 days: {:?}", decode_duration(Some(3.09375)));

    let point = GeoPoint::new(Some(59.913_868), Some(10.752_245), None);
    println!(
        "Geo with two decimals: {}",
        geo_to_string_with(&point, |n| format!("{n:.2}"))
    );

    let selection = join_or(vec![
        ConditionTree::leaf("Field", ConditionOperand::text("Troll")),
        ConditionTree::leaf("Field", ConditionOperand::text("Oseberg")),
    ]);
    println!("OR selection: {}", serde_json::to_string(&selection)?);

    Ok(())
}
