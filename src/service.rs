use chrono::FixedOffset;
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info};

use crate::{
    cache::ResultCache,
    error::Result,
    ingest::{IngestResult, IngestionGuard},
    model::{FilterSpec, QueriedRecord},
    process::read_source,
    query::plan,
    store::MeasurementStore,
};

/// Write and read paths over one store and one result cache.
pub struct AirQualityService {
    store: Arc<dyn MeasurementStore>,
    cache: ResultCache,
    guard: IngestionGuard,
    source_path: PathBuf,
}

impl AirQualityService {
    pub fn new(
        store: Arc<dyn MeasurementStore>,
        cache: ResultCache,
        source_path: impl Into<PathBuf>,
        source_offset: FixedOffset,
    ) -> Self {
        Self {
            guard: IngestionGuard::new(store.clone(), source_offset),
            store,
            cache,
            source_path: source_path.into(),
        }
    }

    /// Read the source file and import it unless the store is already populated.
    pub async fn ingest_source(&self) -> Result<IngestResult> {
        let path = self.source_path.clone();
        let rows = tokio::task::spawn_blocking(move || read_source(path)).await??;
        self.guard.ingest(rows).await
    }

    /// Run a validated filter, answering from the cache when possible.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn query(&self, filter: &FilterSpec) -> Result<Vec<QueriedRecord>> {
        let key = filter.cache_key();
        if let Some(records) = self.cache.lookup(&key).await {
            info!(rows = records.len(), "returning cached response");
            return Ok(records);
        }

        let plan = plan(filter);
        debug!(?plan, "querying store");
        let records = self.store.find(&plan).await?;
        self.cache.store(&key, &records).await;
        info!(rows = records.len(), "query done");
        Ok(records)
    }
}
