//! End-to-end session flows against the in-memory requestor.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tabprobe::core::{DisplayValue, GeoPoint, GEO_NAN};
use tabprobe::prelude::*;
use tabprobe::requestor::{
    DatasetInfo, DistinctRequest, FilterRequest, GuidResponse, InfoRequest, SearchMethod,
    SearchRequest, SearchResponse, SortRequest, StatisticsRequest, StatisticsResponse,
    ValuesRequest, ValuesResponse,
};

fn surveys() -> InMemoryRequestor {
    InMemoryRequestor::new(
        vec![
            ColumnInfo::new(0, "Id", ColumnType::NumId),
            ColumnInfo::new(1, "Surveyor", ColumnType::String),
            ColumnInfo::new(2, "Taken", ColumnType::DateTime),
            ColumnInfo::new(3, "Elapsed", ColumnType::Duration),
            ColumnInfo::new(4, "Ok", ColumnType::Bool),
            ColumnInfo::new(5, "Point", ColumnType::Geo),
            ColumnInfo::new(6, "Remarks", ColumnType::Text),
        ],
        vec![
            vec![
                json!(101),
                json!("Hansen"),
                json!(45000.25),
                json!(0.5),
                json!(true),
                json!({"latitude": 69.65, "longitude": 18.96, "elevation": GEO_NAN}),
                json!("clear sky"),
            ],
            vec![
                json!(102),
                json!("Berg"),
                json!(45001.0),
                json!(1.25),
                json!(0),
                json!({"latitude": 60.39, "longitude": 5.32, "elevation": 40}),
                json!("fog"),
            ],
            vec![
                json!(103),
                json!("Hansen"),
                json!("not a date"),
                Value::Null,
                json!(1),
                json!({"latitude": GEO_NAN, "longitude": GEO_NAN, "elevation": GEO_NAN}),
                json!(""),
            ],
        ],
    )
}

/// Wraps a requestor and records every filter and search it is sent.
struct Recording {
    inner: InMemoryRequestor,
    filters: Mutex<Vec<FilterRequest>>,
    searches: Mutex<Vec<SearchRequest>>,
    values: Mutex<Vec<ValuesRequest>>,
}

impl Recording {
    fn new(inner: InMemoryRequestor) -> Self {
        Self {
            inner,
            filters: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            values: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Requestor for Recording {
    async fn wrapper_guid(&self) -> Result<GuidResponse> {
        self.inner.wrapper_guid().await
    }

    async fn info(&self, request: InfoRequest) -> Result<DatasetInfo> {
        self.inner.info(request).await
    }

    async fn values(&self, request: ValuesRequest) -> Result<ValuesResponse> {
        self.values.lock().unwrap().push(request.clone());
        self.inner.values(request).await
    }

    async fn filter(&self, request: FilterRequest) -> Result<GuidResponse> {
        self.filters.lock().unwrap().push(request.clone());
        self.inner.filter(request).await
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        self.searches.lock().unwrap().push(request.clone());
        self.inner.search(request).await
    }

    async fn sort(&self, request: SortRequest) -> Result<GuidResponse> {
        self.inner.sort(request).await
    }

    async fn distinct(&self, request: DistinctRequest) -> Result<GuidResponse> {
        self.inner.distinct(request).await
    }
}

/// Answers every values request without a table.
struct Tableless(InMemoryRequestor);

#[async_trait]
impl Requestor for Tableless {
    async fn wrapper_guid(&self) -> Result<GuidResponse> {
        self.0.wrapper_guid().await
    }

    async fn info(&self, request: InfoRequest) -> Result<DatasetInfo> {
        self.0.info(request).await
    }

    async fn values(&self, _request: ValuesRequest) -> Result<ValuesResponse> {
        Ok(ValuesResponse::default())
    }

    async fn filter(&self, request: FilterRequest) -> Result<GuidResponse> {
        self.0.filter(request).await
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        self.0.search(request).await
    }

    async fn sort(&self, request: SortRequest) -> Result<GuidResponse> {
        self.0.sort(request).await
    }

    async fn distinct(&self, request: DistinctRequest) -> Result<GuidResponse> {
        self.0.distinct(request).await
    }
}

#[tokio::test]
async fn test_table_view_applies_display_coercion() {
    let mut session = ProbeSession::new(Arc::new(surveys()), SessionConfig::default());
    session.load().await.unwrap();

    let view = session.table_view();
    assert_eq!(view.headers.len(), 8);
    let first = &view.rows[0].cells;
    assert_eq!(first[0].as_text(), Some("101"));
    assert_eq!(first[2].as_text(), Some("3/15/2023, 6:00:00 AM"));
    assert_eq!(first[3].as_text(), Some("12 h"));
    assert_eq!(first[4].as_text(), Some("true"));
    assert_eq!(first[5].as_text(), Some("{69.65; 18.96}"));

    let second = &view.rows[1].cells;
    assert_eq!(second[3].as_text(), Some("1 d 6 h"));
    assert_eq!(second[4].as_text(), Some("false"));

    let third = &view.rows[2].cells;
    assert_eq!(third[2], DisplayValue::Text(String::new()));
    assert_eq!(third[5].as_text(), Some(""));
}

#[tokio::test]
async fn test_iso_display_config() {
    let config = SessionConfig::default()
        .with_display(DisplayConfig::iso().with_invalid_date_text("Invalid Date"));
    let mut session = ProbeSession::new(Arc::new(surveys()), config);
    session.load().await.unwrap();

    let view = session.table_view();
    assert_eq!(view.rows[1].cells[2].as_text(), Some("2023-03-16T00:00:00.000Z"));
    assert_eq!(view.rows[2].cells[2].as_text(), Some("Invalid Date"));
}

#[tokio::test]
async fn test_filter_request_shape_depends_on_column_type() {
    let requestor = Arc::new(Recording::new(surveys()));
    let mut session = ProbeSession::new(requestor.clone(), SessionConfig::default());
    session.load().await.unwrap();

    session.select_column(1).await.unwrap();
    session.apply_filter("hansen").await.unwrap();
    assert_eq!(session.row_ids(), ["0", "2"]);

    session.apply_filter("").await.unwrap();
    session.select_column(4).await.unwrap();
    session.apply_filter("1").await.unwrap();
    assert_eq!(session.row_ids(), ["0", "2"]);

    let filters = requestor.filters.lock().unwrap();
    assert_eq!(filters.len(), 2);
    assert_eq!(filters[0].str_value, "hansen");
    assert_eq!(filters[0].value, 0.0);
    assert_eq!(filters[0].column_name, "Surveyor");
    assert_eq!(filters[1].str_value, "");
    assert_eq!(filters[1].value, 1.0);
    assert_eq!(filters[1].column_type, ColumnType::Bool);
}

#[tokio::test]
async fn test_search_runs_inside_active_filter() {
    let requestor = Arc::new(Recording::new(surveys()));
    let mut session = ProbeSession::new(requestor.clone(), SessionConfig::default());
    session.load().await.unwrap();
    session.select_column(1).await.unwrap();
    session.apply_filter("Hansen").await.unwrap();
    let filtered = session.views().filter_guid.clone().unwrap();

    let found = session.search("hans").await.unwrap();
    assert_eq!(found, Some(0));

    let searches = requestor.searches.lock().unwrap();
    assert_eq!(searches[0].wrapper_guid, filtered);
    assert_eq!(searches[0].search_how, SearchMethod::ByPaLongValue);
    assert_eq!(searches[0].text, "hans");
    assert_eq!(searches[0].int_value, "0");

    let last_values = requestor.values.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last_values.wrapper_guid, filtered);
    assert_eq!((last_values.offset, last_values.row_count), (0, 1));
}

#[tokio::test]
async fn test_numeric_search_sends_simple_method() {
    let requestor = Arc::new(Recording::new(surveys()));
    let mut session = ProbeSession::new(requestor.clone(), SessionConfig::default());
    session.load().await.unwrap();
    session.select_column(3).await.unwrap();

    assert_eq!(session.search("1.25").await.unwrap(), Some(1));
    assert_eq!(session.row_ids(), ["1"]);

    let searches = requestor.searches.lock().unwrap();
    assert_eq!(searches[0].search_how, SearchMethod::Simple);
    assert_eq!(searches[0].double_value, 1.25);
    assert_eq!(searches[0].int_value, "1.25");
    assert_eq!(searches[0].text, "");
}

#[tokio::test]
async fn test_sort_inside_filter_then_distinct() {
    let mut session = ProbeSession::new(Arc::new(surveys()), SessionConfig::default());
    session.load().await.unwrap();
    session.select_column(1).await.unwrap();
    session.apply_filter("Hansen").await.unwrap();
    session.select_column(0).await.unwrap();
    session.sort_by_selected(true).await.unwrap();
    assert_eq!(session.row_ids(), ["2", "0"]);

    session.select_column(1).await.unwrap();
    assert!(session.toggle_distinct().await.unwrap());
    let view = session.table_view();
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].cells[0].as_text(), Some("Hansen"));
    assert_eq!(view.rows[0].cells[1].as_number(), Some(2.0));
    assert_eq!(view.rows[1].cells[0].as_text(), Some("Berg"));
}

#[tokio::test]
async fn test_drill_down_payload() {
    let mut session = ProbeSession::new(Arc::new(surveys()), SessionConfig::default());
    session.load().await.unwrap();

    let drill = session.drill_down(1).await.unwrap().unwrap();
    let host = drill.to_host_json().unwrap();
    assert_eq!(host["cdata"], "[1]");
    assert_eq!(host["op"], "AND");

    let children = host["children"].as_array().unwrap();
    assert_eq!(children.len(), 6);
    assert_eq!(children[0], json!({"columnName": "Id", "val": "102"}));
    assert_eq!(children[1], json!({"columnName": "Surveyor", "val": "Berg"}));
    assert_eq!(children[2], json!({"columnName": "Taken", "dVal": 45001.0}));
    assert_eq!(children[4], json!({"columnName": "Ok", "dVal": 0.0}));
    assert_eq!(
        children[5],
        json!({"columnName": "Point", "val": "{60.39; 5.32; 40}"})
    );
    assert_eq!(session.condition(), Some(&drill.condition));
}

#[tokio::test]
async fn test_narrow_policy_sends_numbers_for_geo() {
    let config = SessionConfig::default().with_textual_policy(TextualPolicy::Narrow);
    let mut session = ProbeSession::new(Arc::new(surveys()), config);
    session.load().await.unwrap();

    let drill = session.drill_down(0).await.unwrap().unwrap();
    let host = drill.to_host_json().unwrap();
    let children = host["children"].as_array().unwrap();
    assert_eq!(children[0], json!({"columnName": "Id", "dVal": 101.0}));
    // NaN operands have no JSON number form
    assert_eq!(children[5], json!({"columnName": "Point", "dVal": null}));
}

#[tokio::test]
async fn test_narrow_policy_filters_num_id_numerically() {
    let requestor = Arc::new(Recording::new(
        surveys().with_textual_policy(TextualPolicy::Narrow),
    ));
    let config = SessionConfig::default().with_textual_policy(TextualPolicy::Narrow);
    let mut session = ProbeSession::new(requestor.clone(), config);
    session.load().await.unwrap();
    session.apply_filter("101").await.unwrap();
    assert_eq!(session.row_ids(), ["0"]);

    let filters = requestor.filters.lock().unwrap();
    assert_eq!(filters[0].str_value, "");
    assert_eq!(filters[0].value, 101.0);
}

#[tokio::test]
async fn test_selection_by_expression() {
    let mut session = ProbeSession::new(Arc::new(surveys()), SessionConfig::default());
    assert!(!session.has_selection());

    let condition = join_or(vec![
        ConditionTree::leaf("Surveyor", ConditionOperand::text("Berg")),
        ConditionTree::leaf("Surveyor", ConditionOperand::text("Hansen")),
    ]);
    session.select_by_expression(Some(condition.clone()));
    assert_eq!(session.condition(), Some(&condition));

    session.select_by_expression(None);
    assert!(!session.has_selection());

    session.set_condition(ConditionTree::empty());
    assert!(session.has_selection());
}

#[tokio::test]
async fn test_tableless_response_keeps_rows() {
    let mut session = ProbeSession::new(Arc::new(Tableless(surveys())), SessionConfig::default());
    session.load().await.unwrap();
    assert!(session.values().is_empty());
    assert!(session.table_view().rows.is_empty());
}

#[tokio::test]
async fn test_refresh_default_window() {
    let config = SessionConfig::default().with_default_row_count(2);
    let mut session = ProbeSession::new(Arc::new(surveys()), config);
    session.load().await.unwrap();
    session.refresh_default().await.unwrap();
    assert_eq!(session.row_ids(), ["0", "1"]);
}

#[test]
fn test_geo_point_from_host_value() {
    let point = GeoPoint::from_value(&json!({
        "latitude": 1.5,
        "longitude": GEO_NAN,
        "elevation": null
    }));
    assert_eq!(point, Some(GeoPoint::new(Some(1.5), None, None)));

    // Without all three members the value is not a point
    assert_eq!(GeoPoint::from_value(&json!({"latitude": 1.5, "longitude": 2.5})), None);
    assert_eq!(
        to_display_value(&json!({"latitude": 1.5, "longitude": 2.5}), &ColumnType::Geo),
        DisplayValue::Raw(json!({"latitude": 1.5, "longitude": 2.5}))
    );
}
