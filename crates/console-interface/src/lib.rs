//! Data contracts and service traits shared by the platform clients and the
//! console UI.
//!
//! The UI only ever talks to [`StatusSource`] and [`QueryService`]; the HTTP
//! implementations live in `platform-client`, scripted doubles in [`mock`]
//! behind the `test-utils` feature.

mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
mod query;
mod status;
mod table;

use futures::future::BoxFuture;

pub use error::{BoxError, FetchError, QueryError};
pub use query::{
    ColumnDescriptor, QueryRecord, QueryRequest, QueryResult, QueryState, header_for,
    infer_columns,
};
pub use status::{
    ComponentStatus, Indicator, PollState, StatusLevel, StatusSnapshot, classify,
    classify_indicator,
};
pub use table::{
    DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS, Pagination, SortDirection, TableRow, sort_rows,
};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockQueryService, MockStatusSource};

/// Source of platform status snapshots.
pub trait StatusSource: Send + Sync {
    /// Fetches the current status once. Implementations do not retry.
    fn fetch_status(&self) -> BoxFuture<'_, Result<StatusSnapshot, FetchError>>;
}

/// Remote service that executes ad-hoc queries.
pub trait QueryService: Send + Sync {
    /// Submits one query and returns its records in service order.
    fn execute(&self, request: QueryRequest) -> BoxFuture<'_, Result<Vec<QueryRecord>, QueryError>>;
}
