//! Request and response records of the host dataset API.
//!
//! Field names follow the host's camelCase wire names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::{ColumnInfo, ColumnType, Value};

/// A response naming a dataset view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidResponse {
    pub wrapper_guid: String,
}

impl GuidResponse {
    pub fn new(wrapper_guid: impl Into<String>) -> Self {
        Self {
            wrapper_guid: wrapper_guid.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoRequest {
    pub wrapper_guid: String,
}

/// Shape of a dataset view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub columns: Vec<ColumnInfo>,
    pub row_count: usize,
    #[serde(default)]
    pub flags: HashMap<String, bool>,
}

impl DatasetInfo {
    pub fn column(&self, id: usize) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.id == id)
    }
}

/// Request for a window of rows.
///
/// When `row_ids` is set the rows are picked by id and `offset` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesRequest {
    pub wrapper_guid: String,
    pub offset: usize,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_indexes: Option<Vec<usize>>,
    #[serde(
        default,
        rename = "rowIDs",
        skip_serializing_if = "Option::is_none"
    )]
    pub row_ids: Option<Vec<u64>>,
}

impl ValuesRequest {
    pub fn window(wrapper_guid: impl Into<String>, offset: usize, row_count: usize) -> Self {
        Self {
            wrapper_guid: wrapper_guid.into(),
            offset,
            row_count,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValuesResponse {
    #[serde(rename = "rowIDs")]
    pub row_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<Vec<Value>>>,
}

/// Filter request. A textual column is matched through `str_value`, any
/// other column through `value` within `delta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub action: i32,
    pub column_id: usize,
    pub delta: f64,
    pub howsearch: i32,
    pub match_case: bool,
    pub str_value: String,
    #[serde(rename = "usePDL")]
    pub use_pdl: bool,
    pub use_reg_ex: bool,
    pub value: f64,
    pub wrapper_guid: String,
    pub column_name: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMethod {
    #[serde(rename = "SIMPLE")]
    Simple,
    #[serde(rename = "BY_PALONGVALUE")]
    ByPaLongValue,
}

/// Search request: finds the first matching row from `search_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub wrapper_guid: String,
    pub column_id: usize,
    pub column_name: String,
    pub column_type: ColumnType,
    pub int_value: String,
    pub double_value: f64,
    pub delta: f64,
    pub text: String,
    pub search_from: usize,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub search_how: SearchMethod,
    pub match_case: bool,
    pub search_up: bool,
    pub use_regex: bool,
    pub unique_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Row position in the searched view, `-1` when nothing matched
    pub found_position: i64,
}

impl SearchResponse {
    pub fn not_found() -> Self {
        Self { found_position: -1 }
    }

    pub fn found(&self) -> Option<usize> {
        usize::try_from(self.found_position).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSortParams {
    pub column_id: usize,
    pub column_name: String,
    pub column_type: ColumnType,
    pub descending: bool,
}

impl ColumnSortParams {
    pub fn for_column(column: &ColumnInfo, descending: bool) -> Self {
        Self {
            column_id: column.id,
            column_name: column.title.clone(),
            column_type: column.column_type.clone(),
            descending,
        }
    }
}

/// Sort request; an empty column list restores the unsorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRequest {
    pub wrapper_guid: String,
    pub columns: Vec<ColumnSortParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistinctRequest {
    pub wrapper_guid: String,
    pub column_id: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRequest {
    pub wrapper_guid: String,
    pub column_id: usize,
}

/// One named aggregate, e.g. `{"type": "Mean", "value": 4.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStatAggregation {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

impl BasicStatAggregation {
    pub fn new(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub basic_statistics: Vec<BasicStatAggregation>,
}
