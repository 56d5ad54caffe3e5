//! The host dataset API a probe session talks to.
//!
//! A requestor exposes dataset *views*, each named by a wrapper guid. The
//! root view comes from [`Requestor::wrapper_guid`]; filter, sort and
//! distinct derive new views and return their guids.

use async_trait::async_trait;

use crate::error::{ProbeError, Result};

pub mod in_memory;
pub mod types;

pub use in_memory::InMemoryRequestor;
pub use types::{
    BasicStatAggregation, ColumnSortParams, DatasetInfo, DistinctRequest, FilterRequest,
    GuidResponse, InfoRequest, SearchMethod, SearchRequest, SearchResponse, SortRequest,
    StatisticsRequest, StatisticsResponse, ValuesRequest, ValuesResponse,
};

/// Trait for host dataset backends.
///
/// # Example
///
/// ```rust,ignore
/// use tabprobe::requestor::{InfoRequest, Requestor};
///
/// async fn row_count(requestor: &dyn Requestor) -> tabprobe::error::Result<usize> {
///     let root = requestor.wrapper_guid().await?;
///     let info = requestor
///         .info(InfoRequest { wrapper_guid: root.wrapper_guid })
///         .await?;
///     Ok(info.row_count)
/// }
/// ```
#[async_trait]
pub trait Requestor: Send + Sync {
    /// Returns the guid of the root (unfiltered, unsorted) view.
    async fn wrapper_guid(&self) -> Result<GuidResponse>;

    /// Describes the columns and row count of a view.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnknownView`] when the guid is not registered.
    async fn info(&self, request: InfoRequest) -> Result<DatasetInfo>;

    /// Reads a window of rows, or specific rows by id.
    async fn values(&self, request: ValuesRequest) -> Result<ValuesResponse>;

    /// Derives a view holding the rows that match the filter.
    async fn filter(&self, request: FilterRequest) -> Result<GuidResponse>;

    /// Finds the position of the first matching row in a view.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse>;

    /// Derives a view sorted by the given columns.
    async fn sort(&self, request: SortRequest) -> Result<GuidResponse>;

    /// Derives a view of the distinct values of one column with their counts.
    async fn distinct(&self, request: DistinctRequest) -> Result<GuidResponse>;

    /// Computes basic statistics for one column.
    ///
    /// Not every host offers statistics; the default reports that.
    async fn statistics(&self, request: StatisticsRequest) -> Result<StatisticsResponse> {
        let _ = request;
        Err(ProbeError::NotSupported(
            "statistics not implemented for this requestor".to_string(),
        ))
    }
}
