//! Value coercion and condition building.
//!
//! Everything under `core` is pure and synchronous: it turns opaque host
//! values into display cells and condition operands, and joins per-column
//! conditions into drill-down trees.

pub mod coercion;
pub mod column;
pub mod condition;
pub mod geo;
pub mod temporal;
pub mod value;

pub use coercion::{
    to_condition_operand, to_condition_operand_with, to_display_value, to_display_value_with,
    DisplayConfig, DisplayValue,
};
pub use column::{is_geo_type, is_textual_type, ColumnInfo, ColumnType, TextualPolicy};
pub use condition::{
    join_and, join_conditions, join_or, ColumnOperation, ConditionLeaf, ConditionOperand,
    ConditionTree, DrillDown,
};
pub use geo::{geo_to_string, geo_to_string_with, GeoPoint, GEO_NAN};
pub use temporal::{decode_date, decode_duration, format_duration_short, DecodedDuration};
pub use value::Value;
