//! Headless probe session over a [`Requestor`].
//!
//! A [`ProbeSession`] holds the state a dataset test panel keeps between user
//! actions: the root view and the views derived from it by filter, sort and
//! distinct, the selected column, the rows last fetched, the last statistics
//! and the current drill-down condition. Every action awaits each requestor
//! call before issuing the one that depends on it.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::core::value::{numify, parse_number, stringify};
use crate::core::{
    geo_to_string, join_and, to_condition_operand_with, to_display_value_with, ColumnInfo,
    ColumnType, ConditionTree, DisplayConfig, DisplayValue, DrillDown, GeoPoint, TextualPolicy,
    Value,
};
use crate::error::{ErrorContext, ProbeError, Result};
use crate::logging::{truncate_field, LogConfig};
use crate::requestor::{
    BasicStatAggregation, ColumnSortParams, DatasetInfo, DistinctRequest, FilterRequest,
    InfoRequest, Requestor, SearchMethod, SearchRequest, SortRequest, StatisticsRequest,
    ValuesRequest,
};

/// Configuration for a [`ProbeSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Rows fetched by [`ProbeSession::refresh_default`]
    pub default_row_count: usize,
    /// Which column types send text operands
    pub textual_policy: TextualPolicy,
    /// Editor sessions never open drill-downs
    pub editor: bool,
    /// Cell formatting for [`ProbeSession::table_view`]
    pub display: DisplayConfig,
    /// Logging knobs
    pub log: LogConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_row_count: 50,
            textual_policy: TextualPolicy::Extended,
            editor: false,
            display: DisplayConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Configuration for a session embedded in an editor.
    pub fn editor() -> Self {
        Self {
            editor: true,
            ..Self::default()
        }
    }

    pub fn with_default_row_count(mut self, rows: usize) -> Self {
        self.default_row_count = rows;
        self
    }

    pub fn with_textual_policy(mut self, policy: TextualPolicy) -> Self {
        self.textual_policy = policy;
        self
    }

    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Rejects settings a session cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_row_count == 0 {
            return Err(ProbeError::Configuration(
                "default_row_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Receives drill-down requests, e.g. to open a filtered view of the rows.
pub trait DrillDownSink: Send + Sync {
    fn open_drill_down(&self, drill: &DrillDown);
}

/// Guids of the views a session currently knows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub guid: Option<String>,
    pub filter_guid: Option<String>,
    pub sort_guid: Option<String>,
    pub distinct_guid: Option<String>,
}

/// A rendered row: its id and one display cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<DisplayValue>,
}

/// The fetched rows, ready for display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    /// `#` followed by the column titles
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headers.join(" | "))?;
        for row in &self.rows {
            let cells: Vec<String> = row.cells.iter().map(ToString::to_string).collect();
            writeln!(f, "{} | {}", row.id, cells.join(" | "))?;
        }
        Ok(())
    }
}

/// Headless counterpart of a dataset test panel.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use std::sync::Arc;
/// use tabprobe::core::{ColumnInfo, ColumnType};
/// use tabprobe::requestor::InMemoryRequestor;
/// use tabprobe::session::{ProbeSession, SessionConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> tabprobe::error::Result<()> {
/// let requestor = InMemoryRequestor::new(
///     vec![ColumnInfo::new(0, "City", ColumnType::String)],
///     vec![vec![json!("Oslo")], vec![json!("Bergen")]],
/// );
/// let mut session = ProbeSession::new(Arc::new(requestor), SessionConfig::default());
/// session.load().await?;
/// session.apply_filter("oslo").await?;
/// assert_eq!(session.values().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct ProbeSession {
    requestor: Arc<dyn Requestor>,
    config: SessionConfig,
    sink: Option<Arc<dyn DrillDownSink>>,
    views: ViewState,
    prev_filter: String,
    column_id: usize,
    info: DatasetInfo,
    row_ids: Vec<String>,
    values: Vec<Vec<Value>>,
    stats: Vec<BasicStatAggregation>,
    condition: Option<ConditionTree>,
}

impl ProbeSession {
    pub fn new(requestor: Arc<dyn Requestor>, config: SessionConfig) -> Self {
        Self {
            requestor,
            config,
            sink: None,
            views: ViewState::default(),
            prev_filter: String::new(),
            column_id: 0,
            info: DatasetInfo::default(),
            row_ids: Vec::new(),
            values: Vec::new(),
            stats: Vec::new(),
            condition: None,
        }
    }

    /// Forwards drill-downs to `sink`.
    pub fn with_drill_down_sink(mut self, sink: Arc<dyn DrillDownSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Root dataset description.
    pub fn info(&self) -> &DatasetInfo {
        &self.info
    }

    pub fn views(&self) -> &ViewState {
        &self.views
    }

    pub fn selected_column(&self) -> usize {
        self.column_id
    }

    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    pub fn values(&self) -> &[Vec<Value>] {
        &self.values
    }

    pub fn stats(&self) -> &[BasicStatAggregation] {
        &self.stats
    }

    pub fn condition(&self) -> Option<&ConditionTree> {
        self.condition.as_ref()
    }

    pub fn is_distinct(&self) -> bool {
        self.views.distinct_guid.is_some()
    }

    fn root(&self) -> Result<String> {
        self.views.guid.clone().ok_or(ProbeError::NotLoaded)
    }

    /// The view searches and sorts run against: the filtered view when a
    /// filter is active, the root otherwise.
    fn working_view(&self) -> Result<String> {
        match &self.views.filter_guid {
            Some(guid) => Ok(guid.clone()),
            None => self.root(),
        }
    }

    fn selected(&self) -> Result<ColumnInfo> {
        self.info
            .column(self.column_id)
            .cloned()
            .ok_or(ProbeError::ColumnNotFound {
                column_id: self.column_id,
            })
    }

    fn is_textual(&self, column_type: &ColumnType) -> bool {
        column_type.is_textual_with(self.config.textual_policy)
    }

    async fn view_info(&self, guid: &str) -> Result<DatasetInfo> {
        self.requestor
            .info(InfoRequest {
                wrapper_guid: guid.to_string(),
            })
            .await
    }

    /// Fetches a window of a view into the session. A response without a
    /// table leaves the previous rows in place.
    async fn fetch_values(&mut self, guid: &str, row_count: usize, offset: usize) -> Result<()> {
        crate::log_request!(
            self.config.log,
            wrapper_guid = %guid,
            row_count,
            offset,
            "Requesting values"
        );
        let response = self
            .requestor
            .values(ValuesRequest::window(guid, offset, row_count))
            .await
            .with_context(|| format!("Fetching values of view {guid}"))?;
        if let Some(table) = response.table {
            self.row_ids = response.row_ids;
            self.values = table;
        }
        Ok(())
    }

    /// Fetches every row of a view.
    async fn fetch_all(&mut self, guid: &str) -> Result<()> {
        let info = self.view_info(guid).await?;
        self.fetch_values(guid, info.row_count, 0).await
    }

    /// Loads the root view, selects its first column and fetches all rows.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        let root = self.requestor.wrapper_guid().await?.wrapper_guid;
        let info = self.view_info(&root).await?;

        self.views = ViewState {
            guid: Some(root.clone()),
            ..ViewState::default()
        };
        self.prev_filter.clear();
        self.column_id = info.columns.first().map(|c| c.id).unwrap_or(0);
        let row_count = info.row_count;
        self.info = info;
        debug!(
            columns = self.info.columns.len(),
            row_count, "Loaded dataset"
        );

        self.fetch_values(&root, row_count, 0).await
    }

    /// Fetches the first `row_count` rows of the root view.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self, row_count: usize) -> Result<()> {
        let root = self.root()?;
        self.fetch_values(&root, row_count, 0).await
    }

    /// Fetches the configured default number of root rows.
    pub async fn refresh_default(&mut self) -> Result<()> {
        self.refresh(self.config.default_row_count).await
    }

    /// Selects a column, leaves distinct mode and reloads the root rows.
    #[instrument(skip(self))]
    pub async fn select_column(&mut self, column_id: usize) -> Result<()> {
        if self.info.column(column_id).is_none() {
            return Err(ProbeError::ColumnNotFound { column_id });
        }
        self.column_id = column_id;
        self.views.distinct_guid = None;
        let root = self.root()?;
        self.fetch_all(&root).await
    }

    /// Filters the root view by the selected column.
    ///
    /// Nothing happens when `text` repeats the filter already applied, or
    /// when it is empty and no filter is active. Empty text with an active
    /// filter drops the filter and reloads the root rows.
    #[instrument(skip(self, text), fields(filter_len = text.len()))]
    pub async fn apply_filter(&mut self, text: &str) -> Result<()> {
        if (text.is_empty() && self.views.filter_guid.is_none()) || self.prev_filter == text {
            debug!("Filter unchanged");
            return Ok(());
        }

        let root = self.root()?;
        if text.is_empty() {
            self.views.filter_guid = None;
            self.prev_filter.clear();
            return self.fetch_all(&root).await;
        }

        let column = self.selected()?;
        let textual = self.is_textual(&column.column_type);
        let request = FilterRequest {
            action: 0,
            column_id: column.id,
            delta: 0.0,
            howsearch: 0,
            match_case: false,
            str_value: if textual { text.to_string() } else { String::new() },
            use_pdl: false,
            use_reg_ex: false,
            value: if textual { 0.0 } else { parse_number(text) },
            wrapper_guid: root,
            column_name: column.title.clone(),
            column_type: column.column_type.clone(),
        };
        crate::log_request!(
            self.config.log,
            column = %column.title,
            textual,
            filter = %truncate_field(text, self.config.log.max_field_length),
            "Requesting filter"
        );

        let filtered = self.requestor.filter(request).await?.wrapper_guid;
        self.prev_filter = text.to_string();
        self.views.filter_guid = Some(filtered.clone());
        self.fetch_all(&filtered).await
    }

    /// Searches the working view by the selected column.
    ///
    /// On a hit only the found row is fetched; otherwise every row of the
    /// working view is. Returns the found position.
    #[instrument(skip(self, text))]
    pub async fn search(&mut self, text: &str) -> Result<Option<usize>> {
        let column = self.selected()?;
        let view = self.working_view()?;
        let textual = self.is_textual(&column.column_type);

        let request = SearchRequest {
            wrapper_guid: view.clone(),
            column_id: column.id,
            column_name: column.title.clone(),
            column_type: column.column_type.clone(),
            int_value: if textual { "0".to_string() } else { text.to_string() },
            double_value: if textual { 0.0 } else { parse_number(text) },
            delta: 0.0,
            text: if textual { text.to_string() } else { String::new() },
            search_from: 0,
            day: 0,
            month: 0,
            year: 0,
            search_how: if textual {
                SearchMethod::ByPaLongValue
            } else {
                SearchMethod::Simple
            },
            match_case: false,
            search_up: false,
            use_regex: false,
            unique_id: Uuid::new_v4(),
        };
        crate::log_request!(self.config.log, column = %column.title, textual, "Requesting search");

        let found = self.requestor.search(request).await?.found();
        match found {
            Some(position) => self.fetch_values(&view, 1, position).await?,
            None => self.fetch_all(&view).await?,
        }
        Ok(found)
    }

    /// Sorts the working view. An empty column list restores the unsorted order.
    #[instrument(skip(self, columns), fields(keys = columns.len()))]
    pub async fn sort(&mut self, columns: Vec<ColumnSortParams>) -> Result<()> {
        let view = self.working_view()?;
        let sorted = self
            .requestor
            .sort(SortRequest {
                wrapper_guid: view,
                columns,
            })
            .await?
            .wrapper_guid;
        self.views.sort_guid = Some(sorted.clone());
        self.fetch_all(&sorted).await
    }

    /// Sorts the working view by the selected column.
    pub async fn sort_by_selected(&mut self, descending: bool) -> Result<()> {
        let column = self.selected()?;
        self.sort(vec![ColumnSortParams::for_column(&column, descending)])
            .await
    }

    pub async fn unsort(&mut self) -> Result<()> {
        self.sort(Vec::new()).await
    }

    /// Switches distinct mode for the selected column on or off and returns
    /// whether it is now on.
    #[instrument(skip(self))]
    pub async fn toggle_distinct(&mut self) -> Result<bool> {
        let root = self.root()?;
        if self.views.distinct_guid.take().is_some() {
            self.fetch_all(&root).await?;
            return Ok(false);
        }

        let distinct = self
            .requestor
            .distinct(DistinctRequest {
                wrapper_guid: root,
                column_id: self.column_id,
            })
            .await?
            .wrapper_guid;
        self.views.distinct_guid = Some(distinct.clone());
        self.fetch_all(&distinct).await?;
        Ok(true)
    }

    /// Requests basic statistics of the selected column on the root view.
    ///
    /// A requestor without statistics yields an empty list.
    #[instrument(skip(self))]
    pub async fn statistics(&mut self) -> Result<&[BasicStatAggregation]> {
        let root = self.root()?;
        let request = StatisticsRequest {
            wrapper_guid: root,
            column_id: self.column_id,
        };
        self.stats = match self.requestor.statistics(request).await {
            Ok(response) => response.basic_statistics,
            Err(e) if e.is_not_supported() => {
                warn!(error = %e, "Statistics unavailable");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        Ok(&self.stats)
    }

    /// Builds the condition selecting one row and hands it to the sink.
    ///
    /// The condition ANDs one leaf per non-`Text` column. Geo values are
    /// compared through their [`geo_to_string`] rendering, which leaves out
    /// absent coordinates; a host that renders all three raw coordinates
    /// (sentinels included) will write `{1; 2; 1.7976931348623157e+308}`
    /// where this writes `{1; 2}`. Editor sessions return `None` without
    /// touching the requestor.
    #[instrument(skip(self))]
    pub async fn drill_down(&mut self, row_id: u64) -> Result<Option<DrillDown>> {
        if self.config.editor {
            return Ok(None);
        }
        let root = self.root()?;
        let columns: Vec<ColumnInfo> = self
            .info
            .columns
            .iter()
            .filter(|c| c.column_type != ColumnType::Text)
            .cloned()
            .collect();

        let response = self
            .requestor
            .values(ValuesRequest {
                wrapper_guid: root,
                offset: 0,
                row_count: 1,
                column_indexes: Some(columns.iter().map(|c| c.id).collect()),
                row_ids: Some(vec![row_id]),
            })
            .await?;
        let row = response
            .table
            .and_then(|table| table.into_iter().next())
            .ok_or(ProbeError::RowNotFound { row_id })?;

        let leaves = columns
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| {
                let value = match GeoPoint::from_value(cell).filter(|_| column.column_type.is_geo()) {
                    Some(point) => Value::String(geo_to_string(&point)),
                    None => cell.clone(),
                };
                let operand = to_condition_operand_with(
                    self.config.textual_policy,
                    &value,
                    Some(&column.column_type),
                );
                if self.config.log.log_coercions {
                    crate::perf_debug!(
                        self.config.log,
                        column = %column.title,
                        value = %stringify(&value),
                        "Drill-down leaf"
                    );
                }
                ConditionTree::from(operand.into_leaf(column.title.clone()))
            })
            .collect();

        let condition = join_and(leaves);
        let drill = DrillDown::new(condition.clone(), vec![row_id]);
        self.condition = Some(condition);
        if let Some(sink) = &self.sink {
            sink.open_drill_down(&drill);
        }
        debug!(row_id, leaves = drill.condition.leaf_count(), "Drill-down built");
        Ok(Some(drill))
    }

    /// Returns true while a condition is selected.
    pub fn has_selection(&self) -> bool {
        self.condition.is_some()
    }

    pub fn set_condition(&mut self, condition: ConditionTree) {
        self.condition = Some(condition);
    }

    /// Replaces the selection with a host-provided expression.
    pub fn select_by_expression(&mut self, condition: Option<ConditionTree>) {
        self.condition = condition;
    }

    /// Columns the fetched rows are laid out in.
    pub fn display_columns(&self) -> Vec<ColumnInfo> {
        if !self.is_distinct() {
            return self.info.columns.clone();
        }
        let value_type = self
            .info
            .column(self.column_id)
            .map(|c| c.column_type.clone())
            .unwrap_or_else(|| ColumnType::Other(String::new()));
        vec![
            ColumnInfo::new(0, "Value", value_type),
            ColumnInfo::new(1, "Count", ColumnType::Integer),
            ColumnInfo::new(2, "Percent", ColumnType::Integer),
        ]
    }

    /// Renders the fetched rows through the display coercion.
    pub fn table_view(&self) -> TableView {
        let columns = self.display_columns();
        let mut headers = vec!["#".to_string()];
        headers.extend(columns.iter().map(|c| c.title.clone()));

        let rows = self
            .row_ids
            .iter()
            .zip(&self.values)
            .map(|(id, row)| TableRow {
                id: id.clone(),
                cells: row
                    .iter()
                    .enumerate()
                    .map(|(i, value)| match columns.get(i) {
                        Some(column) => {
                            to_display_value_with(&self.config.display, value, &column.column_type)
                        }
                        None => DisplayValue::Raw(value.clone()),
                    })
                    .collect(),
            })
            .collect();

        TableView { headers, rows }
    }

    /// Numeric reading of the selected column for every fetched row.
    pub fn selected_numbers(&self) -> Vec<f64> {
        let position = self
            .display_columns()
            .iter()
            .position(|c| c.id == self.column_id);
        match position {
            Some(pos) => self
                .values
                .iter()
                .filter_map(|row| row.get(pos))
                .map(numify)
                .collect(),
            None => Vec::new(),
        }
    }
}
