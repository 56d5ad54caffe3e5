//! Prelude for commonly used types and traits in tabprobe.

pub use crate::core::{
    join_and, join_conditions, join_or, to_condition_operand, to_display_value, ColumnInfo,
    ColumnOperation, ColumnType, ConditionOperand, ConditionTree, DisplayConfig, DisplayValue,
    DrillDown, TextualPolicy, Value,
};
pub use crate::error::{ErrorContext, ProbeError, Result};
pub use crate::logging::LogConfig;
pub use crate::requestor::{InMemoryRequestor, Requestor};
pub use crate::session::{DrillDownSink, ProbeSession, SessionConfig};
