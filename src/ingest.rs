use chrono::FixedOffset;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    error::Result,
    model::RawRow,
    process::normalize_rows,
    store::MeasurementStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestResult {
    Inserted(usize),
    SkippedAlreadyPresent,
}

impl IngestResult {
    /// Message reported to the client that triggered the import.
    pub fn message(&self) -> &'static str {
        match self {
            IngestResult::Inserted(_) => "Records inserted",
            IngestResult::SkippedAlreadyPresent => "Already inserted records before",
        }
    }
}

/// Imports the dataset at most once.
///
/// The store is considered populated as soon as it holds any record; a
/// populated store makes every later import a no-op. The count-then-insert
/// step is serialized through `write_lock`, which covers concurrent triggers
/// within this process only. Two processes sharing one store can still race.
pub struct IngestionGuard {
    store: Arc<dyn MeasurementStore>,
    source_offset: FixedOffset,
    write_lock: Mutex<()>,
}

impl IngestionGuard {
    pub fn new(store: Arc<dyn MeasurementStore>, source_offset: FixedOffset) -> Self {
        Self {
            store,
            source_offset,
            write_lock: Mutex::new(()),
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(rows = rows.len()))]
    pub async fn ingest(&self, rows: Vec<RawRow>) -> Result<IngestResult> {
        let total = rows.len();
        let rows: Vec<RawRow> = rows.into_iter().filter(RawRow::has_date).collect();
        debug!(dropped = total - rows.len(), "dropped rows without a date");

        let offset = self.source_offset;
        let records =
            tokio::task::spawn_blocking(move || normalize_rows(&rows, offset)).await??;

        let _guard = self.write_lock.lock().await;
        let existing = self.store.count().await?;
        if existing > 0 {
            info!(existing, "dataset already imported, skipping");
            return Ok(IngestResult::SkippedAlreadyPresent);
        }

        let inserted = records.len();
        self.store.insert_many(records).await?;
        info!(inserted, "dataset imported");
        Ok(IngestResult::Inserted(inserted))
    }
}
