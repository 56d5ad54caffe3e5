//! # tabprobe - Headless dataset probing
//!
//! tabprobe turns the opaque cell values a dataset host returns into typed
//! display values and filter operands, and builds the boolean condition trees
//! a drill-down hands back to the host.
//!
//! ## Overview
//!
//! The crate has two layers:
//!
//! - [`core`]: pure, synchronous coercion. Column types decide whether a value
//!   is shown as a number, text or date, and whether a condition compares it
//!   as text (`val`) or as a number (`dVal`). Dates and durations arrive as
//!   fractional days and are decoded here.
//! - [`session`]: a [`ProbeSession`](session::ProbeSession) drives a
//!   [`Requestor`](requestor::Requestor) through load, filter, search, sort,
//!   distinct, statistics and drill-down, keeping the view guids and fetched
//!   rows between actions.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use std::sync::Arc;
//! use tabprobe::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tabprobe::error::Result<()> {
//! let requestor = InMemoryRequestor::new(
//!     vec![
//!         ColumnInfo::new(0, "Well", ColumnType::String),
//!         ColumnInfo::new(1, "Depth", ColumnType::Numeric),
//!     ],
//!     vec![
//!         vec![json!("A-1"), json!(1200.5)],
//!         vec![json!("B-7"), json!(980)],
//!     ],
//! );
//!
//! let mut session = ProbeSession::new(Arc::new(requestor), SessionConfig::default());
//! session.load().await?;
//!
//! if let Some(drill) = session.drill_down(1).await? {
//!     assert_eq!(drill.cdata()?, "[1]");
//!     assert_eq!(drill.condition.leaf_count(), 2);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Condition trees
//!
//! [`join_conditions`](core::join_conditions) turns no conditions into the
//! empty node, returns a single condition unchanged and wraps two or more in
//! an `AND`/`OR` node. Trees serialize to the host's JSON shape:
//!
//! ```rust
//! use tabprobe::core::{join_or, ConditionOperand, ConditionTree};
//!
//! let tree = join_or(vec![
//!     ConditionTree::leaf("City", ConditionOperand::text("Oslo")),
//!     ConditionTree::leaf("Depth", ConditionOperand::number(12.0)),
//! ]);
//! assert_eq!(
//!     serde_json::to_string(&tree).unwrap(),
//!     r#"{"op":"OR","children":[{"columnName":"City","val":"Oslo"},{"columnName":"Depth","dVal":12.0}]}"#
//! );
//! ```
//!
//! ## Logging
//!
//! Everything logs through `tracing`. Binaries can install a subscriber with
//! [`logging::setup::init_logging`]; [`LogConfig`](logging::LogConfig)
//! controls how much per-request and per-cell detail a session emits.

pub mod core;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod requestor;
pub mod session;
