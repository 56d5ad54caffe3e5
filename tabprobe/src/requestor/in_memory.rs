//! In-memory implementation of [`Requestor`] for testing and demos.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::core::value::{number_value, numify, stringify};
use crate::core::{ColumnInfo, ColumnType, TextualPolicy, Value};
use crate::error::{ProbeError, Result};

use super::types::*;
use super::Requestor;

/// Column titles of a distinct view.
pub const DISTINCT_VALUE_TITLE: &str = "Value";
pub const DISTINCT_COUNT_TITLE: &str = "Count";
pub const DISTINCT_PERCENT_TITLE: &str = "Percent";

#[derive(Debug)]
struct Table {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    fn position(&self, column_id: usize) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.id == column_id)
            .ok_or(ProbeError::ColumnNotFound { column_id })
    }

    fn cell(&self, row: usize, position: usize) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(position))
            .unwrap_or(&Value::Null)
    }
}

/// A view is an ordered selection of rows of one table. Row ids are the
/// rows' indices in that table.
#[derive(Debug, Clone)]
struct View {
    table: Arc<Table>,
    rows: Vec<usize>,
}

impl View {
    fn all(table: Arc<Table>) -> Self {
        let rows = (0..table.rows.len()).collect();
        Self { table, rows }
    }

    fn derive(&self, rows: Vec<usize>) -> Self {
        Self {
            table: Arc::clone(&self.table),
            rows,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    views: HashMap<String, View>,
}

impl State {
    fn view(&self, guid: &str) -> Result<&View> {
        self.views
            .get(guid)
            .ok_or_else(|| ProbeError::unknown_view(guid))
    }

    fn register(&mut self, view: View) -> String {
        let guid = Uuid::new_v4().to_string();
        self.views.insert(guid.clone(), view);
        guid
    }
}

/// How a textual cell is compared against the request's text.
enum TextMatcher {
    Equals { needle: String, match_case: bool },
    Contains { needle: String, match_case: bool },
    Pattern(Regex),
}

impl TextMatcher {
    fn new(text: &str, match_case: bool, use_regex: bool, whole: bool) -> Result<Self> {
        if use_regex {
            let regex = RegexBuilder::new(text)
                .case_insensitive(!match_case)
                .build()?;
            return Ok(TextMatcher::Pattern(regex));
        }
        let needle = if match_case {
            text.to_string()
        } else {
            text.to_lowercase()
        };
        Ok(if whole {
            TextMatcher::Equals { needle, match_case }
        } else {
            TextMatcher::Contains { needle, match_case }
        })
    }

    fn matches(&self, cell: &Value) -> bool {
        let text = stringify(cell);
        match self {
            TextMatcher::Pattern(regex) => regex.is_match(&text),
            TextMatcher::Equals { needle, match_case } => fold(&text, *match_case) == *needle,
            TextMatcher::Contains { needle, match_case } => {
                fold(&text, *match_case).contains(needle.as_str())
            }
        }
    }
}

fn fold(text: &str, match_case: bool) -> String {
    if match_case {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

fn numeric_match(cell: &Value, target: f64, delta: f64) -> bool {
    (numify(cell) - target).abs() <= delta.abs()
}

fn compare_cells(a: &Value, b: &Value, textual: bool) -> Ordering {
    if textual {
        stringify(a).cmp(&stringify(b))
    } else {
        numify(a).total_cmp(&numify(b))
    }
}

/// Reference requestor over a table held in memory.
///
/// Filter and sort views share the source table, so row ids stay stable across
/// them. Distinct views build a new three-column table.
///
/// Each filter, sort and distinct call registers a view that lives until
/// [`InMemoryRequestor::release`] drops it.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use tabprobe::core::{ColumnInfo, ColumnType};
/// use tabprobe::requestor::{InMemoryRequestor, InfoRequest, Requestor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> tabprobe::error::Result<()> {
/// let requestor = InMemoryRequestor::new(
///     vec![ColumnInfo::new(0, "City", ColumnType::String)],
///     vec![vec![json!("Oslo")], vec![json!("Bergen")]],
/// );
/// let root = requestor.wrapper_guid().await?;
/// let info = requestor.info(InfoRequest { wrapper_guid: root.wrapper_guid }).await?;
/// assert_eq!(info.row_count, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryRequestor {
    root: String,
    state: Arc<RwLock<State>>,
    statistics_enabled: bool,
    textual_policy: TextualPolicy,
}

impl InMemoryRequestor {
    /// Creates a requestor whose root view holds `rows` in order.
    ///
    /// Each row lists its cells in the order of `columns`.
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<Value>>) -> Self {
        let mut state = State::default();
        let root = state.register(View::all(Arc::new(Table { columns, rows })));
        Self {
            root,
            state: Arc::new(RwLock::new(state)),
            statistics_enabled: true,
            textual_policy: TextualPolicy::Extended,
        }
    }

    /// Disables the statistics operation, like a host without it.
    pub fn without_statistics(mut self) -> Self {
        self.statistics_enabled = false;
        self
    }

    /// Sets which column types are matched and sorted as text. Sessions
    /// talking to this requestor should use the same policy.
    pub fn with_textual_policy(mut self, policy: TextualPolicy) -> Self {
        self.textual_policy = policy;
        self
    }

    fn is_textual(&self, column_type: &ColumnType) -> bool {
        column_type.is_textual_with(self.textual_policy)
    }

    /// Guid of the root view.
    pub fn root_guid(&self) -> &str {
        &self.root
    }

    /// Drops a derived view. Returns false for the root and for unknown guids.
    pub async fn release(&self, guid: &str) -> bool {
        if guid == self.root {
            return false;
        }
        self.state.write().await.views.remove(guid).is_some()
    }

    /// Number of registered views, the root included.
    pub async fn view_count(&self) -> usize {
        self.state.read().await.views.len()
    }
}

#[async_trait]
impl Requestor for InMemoryRequestor {
    async fn wrapper_guid(&self) -> Result<GuidResponse> {
        Ok(GuidResponse::new(self.root.clone()))
    }

    #[instrument(skip(self, request), fields(wrapper_guid = %request.wrapper_guid, requestor = "in_memory"))]
    async fn info(&self, request: InfoRequest) -> Result<DatasetInfo> {
        let state = self.state.read().await;
        let view = state.view(&request.wrapper_guid)?;
        Ok(DatasetInfo {
            columns: view.table.columns.clone(),
            row_count: view.rows.len(),
            flags: HashMap::new(),
        })
    }

    #[instrument(skip(self, request), fields(wrapper_guid = %request.wrapper_guid, requestor = "in_memory"))]
    async fn values(&self, request: ValuesRequest) -> Result<ValuesResponse> {
        let state = self.state.read().await;
        let view = state.view(&request.wrapper_guid)?;

        let rows: Vec<usize> = match &request.row_ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| usize::try_from(*id).ok())
                .filter(|id| view.rows.contains(id))
                .collect(),
            None => view
                .rows
                .iter()
                .skip(request.offset)
                .take(request.row_count)
                .copied()
                .collect(),
        };

        let positions: Vec<usize> = match &request.column_indexes {
            Some(ids) => ids
                .iter()
                .map(|id| view.table.position(*id))
                .collect::<Result<_>>()?,
            None => (0..view.table.columns.len()).collect(),
        };

        let table = rows
            .iter()
            .map(|&row| {
                positions
                    .iter()
                    .map(|&pos| view.table.cell(row, pos).clone())
                    .collect()
            })
            .collect();

        debug!(rows = rows.len(), columns = positions.len(), "Read values");
        Ok(ValuesResponse {
            row_ids: rows.iter().map(ToString::to_string).collect(),
            table: Some(table),
        })
    }

    #[instrument(skip(self, request), fields(wrapper_guid = %request.wrapper_guid, column_id = request.column_id, requestor = "in_memory"))]
    async fn filter(&self, request: FilterRequest) -> Result<GuidResponse> {
        let mut state = self.state.write().await;
        let view = state.view(&request.wrapper_guid)?;
        let pos = view.table.position(request.column_id)?;

        let rows: Vec<usize> = if self.is_textual(&request.column_type) {
            let matcher = TextMatcher::new(
                &request.str_value,
                request.match_case,
                request.use_reg_ex,
                true,
            )?;
            view.rows
                .iter()
                .copied()
                .filter(|&row| matcher.matches(view.table.cell(row, pos)))
                .collect()
        } else {
            view.rows
                .iter()
                .copied()
                .filter(|&row| numeric_match(view.table.cell(row, pos), request.value, request.delta))
                .collect()
        };

        debug!(matched = rows.len(), "Filtered view");
        let derived = view.derive(rows);
        Ok(GuidResponse::new(state.register(derived)))
    }

    #[instrument(skip(self, request), fields(wrapper_guid = %request.wrapper_guid, column_id = request.column_id, requestor = "in_memory"))]
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let state = self.state.read().await;
        let view = state.view(&request.wrapper_guid)?;
        let pos = view.table.position(request.column_id)?;
        if request.search_from >= view.rows.len() {
            return Ok(SearchResponse::not_found());
        }

        let matcher = if self.is_textual(&request.column_type) {
            Some(TextMatcher::new(
                &request.text,
                request.match_case,
                request.use_regex,
                false,
            )?)
        } else {
            None
        };
        let is_match = |row: usize| {
            let cell = view.table.cell(row, pos);
            match &matcher {
                Some(m) => m.matches(cell),
                None => numeric_match(cell, request.double_value, request.delta),
            }
        };

        let found = if request.search_up {
            (0..=request.search_from)
                .rev()
                .find(|&i| is_match(view.rows[i]))
        } else {
            (request.search_from..view.rows.len()).find(|&i| is_match(view.rows[i]))
        };

        Ok(match found.and_then(|i| i64::try_from(i).ok()) {
            Some(found_position) => SearchResponse { found_position },
            None => SearchResponse::not_found(),
        })
    }

    #[instrument(skip(self, request), fields(wrapper_guid = %request.wrapper_guid, keys = request.columns.len(), requestor = "in_memory"))]
    async fn sort(&self, request: SortRequest) -> Result<GuidResponse> {
        let mut state = self.state.write().await;
        let view = state.view(&request.wrapper_guid)?;

        let keys = request
            .columns
            .iter()
            .map(|key| -> Result<(usize, bool, bool)> {
                Ok((
                    view.table.position(key.column_id)?,
                    self.is_textual(&key.column_type),
                    key.descending,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows = view.rows.clone();
        if keys.is_empty() {
            rows.sort_unstable();
        } else {
            let table = &view.table;
            rows.sort_by(|&a, &b| {
                keys.iter()
                    .map(|&(pos, textual, descending)| {
                        let ord = compare_cells(table.cell(a, pos), table.cell(b, pos), textual);
                        if descending {
                            ord.reverse()
                        } else {
                            ord
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let derived = view.derive(rows);
        Ok(GuidResponse::new(state.register(derived)))
    }

    #[instrument(skip(self, request), fields(wrapper_guid = %request.wrapper_guid, column_id = request.column_id, requestor = "in_memory"))]
    async fn distinct(&self, request: DistinctRequest) -> Result<GuidResponse> {
        let mut state = self.state.write().await;
        let view = state.view(&request.wrapper_guid)?;
        let pos = view.table.position(request.column_id)?;
        let source_type = view.table.columns[pos].column_type.clone();

        let mut order: Vec<Value> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for &row in &view.rows {
            let cell = view.table.cell(row, pos);
            let count = counts.entry(cell.to_string()).or_insert(0);
            if *count == 0 {
                order.push(cell.clone());
            }
            *count += 1;
        }

        let total = view.rows.len();
        let rows = order
            .into_iter()
            .map(|value| {
                let count = counts.get(&value.to_string()).copied().unwrap_or(0);
                let percent = count as f64 * 100.0 / total as f64;
                vec![value, json!(count), number_value(percent)]
            })
            .collect();

        let table = Table {
            columns: vec![
                ColumnInfo::new(0, DISTINCT_VALUE_TITLE, source_type),
                ColumnInfo::new(1, DISTINCT_COUNT_TITLE, ColumnType::Integer),
                ColumnInfo::new(2, DISTINCT_PERCENT_TITLE, ColumnType::Numeric),
            ],
            rows,
        };
        debug!(groups = table.rows.len(), "Built distinct view");
        Ok(GuidResponse::new(
            state.register(View::all(Arc::new(table))),
        ))
    }

    #[instrument(skip(self, request), fields(wrapper_guid = %request.wrapper_guid, column_id = request.column_id, requestor = "in_memory"))]
    async fn statistics(&self, request: StatisticsRequest) -> Result<StatisticsResponse> {
        if !self.statistics_enabled {
            return Err(ProbeError::NotSupported(
                "statistics disabled for this requestor".to_string(),
            ));
        }
        let state = self.state.read().await;
        let view = state.view(&request.wrapper_guid)?;
        let pos = view.table.position(request.column_id)?;
        let column = &view.table.columns[pos];
        let cells = view.rows.iter().map(|&row| view.table.cell(row, pos));

        let basic_statistics = if self.is_textual(&column.column_type) {
            let present: Vec<String> = cells.filter(|c| !c.is_null()).map(stringify).collect();
            let mut distinct = present.clone();
            distinct.sort_unstable();
            distinct.dedup();
            vec![
                BasicStatAggregation::new("Count", json!(present.len())),
                BasicStatAggregation::new("Distinct", json!(distinct.len())),
            ]
        } else {
            numeric_statistics(&cells.map(numify).filter(|n| !n.is_nan()).collect::<Vec<_>>())
        };

        Ok(StatisticsResponse { basic_statistics })
    }
}

fn numeric_statistics(values: &[f64]) -> Vec<BasicStatAggregation> {
    let count = values.len();
    let mut stats = vec![BasicStatAggregation::new("Count", json!(count))];
    if count == 0 {
        return stats;
    }

    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Sample standard deviation (n - 1)
    let std_dev = if count > 1 {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    stats.extend([
        BasicStatAggregation::new("Min", number_value(min)),
        BasicStatAggregation::new("Max", number_value(max)),
        BasicStatAggregation::new("Sum", number_value(sum)),
        BasicStatAggregation::new("Mean", number_value(mean)),
        BasicStatAggregation::new("StdDev", number_value(std_dev)),
    ]);
    stats
}
