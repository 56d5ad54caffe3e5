//! Walks a probe session through the actions of a dataset test panel.
//!
//! This example shows how to:
//! - Load a dataset through a requestor and render its rows
//! - Filter, search, sort and switch to distinct values
//! - Build a drill-down condition for one row
//!
//! Run with:
//! ```bash
//! cargo run --example session_walkthrough
//! ```
//!
//! Set `TABPROBE_LOG_JSON=1` for JSON logs.

use serde_json::json;
use std::sync::Arc;
use tabprobe::core::{DrillDown, GEO_NAN};
use tabprobe::logging::setup::{init_logging, LoggingConfig};
use tabprobe::prelude::*;

struct PrintSink;

impl DrillDownSink for PrintSink {
    fn open_drill_down(&self, drill: &DrillDown) {
        match drill.to_host_json() {
            Ok(json) => println!("Drill-down payload:\n{json:#}\n"),
            Err(e) => eprintln!("Could not encode drill-down: {e}"),
        }
    }
}

fn wells() -> InMemoryRequestor {
    let columns = vec![
        ColumnInfo::new(0, "Well", ColumnType::String),
        ColumnInfo::new(1, "Field", ColumnType::String),
        ColumnInfo::new(2, "Depth", ColumnType::Numeric),
        ColumnInfo::new(3, "Spudded", ColumnType::DateTime),
        ColumnInfo::new(4, "Drilling time", ColumnType::Duration),
        ColumnInfo::new(5, "Location", ColumnType::Geo),
        ColumnInfo::new(6, "Comment", ColumnType::Text),
    ];
    let rows = vec![
        vec![
            json!("A-1"),
            json!("Troll"),
            json!(1520.5),
            json!(44927.375),
            json!(12.5),
            json!({"latitude": 60.64, "longitude": 3.72, "elevation": -330}),
            json!("first producer"),
        ],
        vec![
            json!("A-2"),
            json!("Troll"),
            json!(1488),
            json!(44958.5),
            json!(9.75),
            json!({"latitude": 60.66, "longitude": 3.7, "elevation": GEO_NAN}),
            json!(""),
        ],
        vec![
            json!("B-1"),
            json!("Oseberg"),
            json!(2710.25),
            json!(45016.0),
            json!(21.0625),
            json!({"latitude": 60.49, "longitude": 2.83, "elevation": -109}),
            json!("sidetracked"),
        ],
        vec![
            json!("C-3"),
            json!("Gullfaks"),
            json!(1890),
            json!(45100.25),
            json!(15.5),
            json!({"latitude": 61.2, "longitude": 2.27, "elevation": GEO_NAN}),
            json!(""),
        ],
    ];
    InMemoryRequestor::new(columns, rows)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let json_logs = std::env::var("TABPROBE_LOG_JSON").is_ok_and(|v| v == "1");
    init_logging(LoggingConfig::development().with_json_format(json_logs))?;

    let config = SessionConfig::default().with_log_config(LogConfig::verbose());
    let mut session =
        ProbeSession::new(Arc::new(wells()), config).with_drill_down_sink(Arc::new(PrintSink));

    session.load().await?;
    println!("Loaded {} rows:\n{}", session.info().row_count, session.table_view());

    session.select_column(1).await?;
    session.apply_filter("troll").await?;
    println!("Filtered by Field = troll:\n{}", session.table_view());

    match session.search("a-2").await? {
        Some(position) => println!("Found 'a-2' at position {position}\n"),
        None => println!("'a-2' not found\n"),
    }

    session.apply_filter("").await?;
    session.select_column(2).await?;
    session.sort_by_selected(true).await?;
    println!("Sorted by depth, deepest first:\n{}", session.table_view());

    for stat in session.statistics().await? {
        println!("  {:<8} {}", stat.kind, stat.value);
    }
    println!();

    session.select_column(1).await?;
    if session.toggle_distinct().await? {
        println!("Distinct fields:\n{}", session.table_view());
    }
    session.toggle_distinct().await?;

    session.drill_down(2).await?;
    if let Some(condition) = session.condition() {
        println!("Selection holds {} leaves", condition.leaf_count());
    }

    Ok(())
}
