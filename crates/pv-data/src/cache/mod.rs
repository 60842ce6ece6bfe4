//! Dataset caching with explicit invalidation
//!
//! The dashboard fetches the whole record set once and shares it read-only
//! across render passes; a refresh action clears the slot so the next pass
//! refetches.

use arrow::record_batch::RecordBatch;
use parking_lot::RwLock;

use pv_core::data::DataSource;

/// Single-slot cache owning the fetched dataset.
pub struct DatasetCache {
    dataset: RwLock<Option<RecordBatch>>,
}

impl DatasetCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            dataset: RwLock::new(None),
        }
    }

    /// The cached dataset, if any. Batches are cheap to clone: the column
    /// buffers are shared.
    pub fn cached(&self) -> Option<RecordBatch> {
        self.dataset.read().clone()
    }

    /// Return the cached dataset, fetching from `source` on a cold or
    /// invalidated cache. Failed fetches are not cached, so the next pass
    /// retries.
    pub async fn get_or_load(&self, source: &dyn DataSource) -> anyhow::Result<RecordBatch> {
        if let Some(batch) = self.cached() {
            return Ok(batch);
        }

        tracing::info!("fetching all records from {}", source.source_name());
        let batch = source.fetch_all().await?;
        tracing::info!(
            "fetched {} records with {} columns",
            batch.num_rows(),
            batch.num_columns()
        );

        *self.dataset.write() = Some(batch.clone());
        Ok(batch)
    }

    /// Discard the cached dataset; the next `get_or_load` refetches.
    pub fn invalidate(&self) {
        if self.dataset.write().take().is_some() {
            tracing::info!("dataset cache invalidated");
        }
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Float64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        schema: Arc<Schema>,
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                schema: Arc::new(Schema::new(vec![Field::new(
                    "Xpca",
                    DataType::Float64,
                    true,
                )])),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl DataSource for CountingSource {
        async fn schema(&self) -> Arc<Schema> {
            self.schema.clone()
        }

        async fn fetch_all(&self) -> anyhow::Result<RecordBatch> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(RecordBatch::try_new(
                self.schema.clone(),
                vec![Arc::new(Float64Array::from(vec![1.0, 2.0]))],
            )?)
        }

        fn source_name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn second_load_hits_the_cache() {
        let cache = DatasetCache::new();
        let source = CountingSource::new();

        let first = cache.get_or_load(&source).await.unwrap();
        let second = cache.get_or_load(&source).await.unwrap();

        assert_eq!(first.num_rows(), 2);
        assert_eq!(second.num_rows(), 2);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let cache = DatasetCache::new();
        let source = CountingSource::new();

        cache.get_or_load(&source).await.unwrap();
        cache.invalidate();
        assert!(cache.cached().is_none());

        cache.get_or_load(&source).await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl DataSource for FailingSource {
        async fn schema(&self) -> Arc<Schema> {
            Arc::new(Schema::empty())
        }

        async fn fetch_all(&self) -> anyhow::Result<RecordBatch> {
            anyhow::bail!("connection refused")
        }

        fn source_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = DatasetCache::new();

        let result = cache.get_or_load(&FailingSource).await;
        assert!(result.is_err());
        assert!(cache.cached().is_none());
    }
}
