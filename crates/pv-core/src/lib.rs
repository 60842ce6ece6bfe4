//! Core functionality for the PCA projection dashboard
//!
//! This crate provides the selection/state machinery and the data source
//! boundary; it has no UI dependencies.

pub mod selection;
pub mod state;

// Re-export commonly used types
pub use selection::{normalize, SelectionEvent, SelectionRange};
pub use state::{DashboardEvent, ViewState};
pub use data::DataSource;

pub mod data {
    use std::sync::Arc;

    /// Trait for data sources
    ///
    /// A source returns the full record set in one atomic fetch; callers
    /// own caching and invalidation.
    #[async_trait::async_trait]
    pub trait DataSource: Send + Sync {
        /// Get the schema of this data source
        async fn schema(&self) -> Arc<arrow::datatypes::Schema>;

        /// Fetch every record as a single batch
        async fn fetch_all(&self) -> anyhow::Result<arrow::record_batch::RecordBatch>;

        /// Get the source name/path
        fn source_name(&self) -> &str;
    }
}
