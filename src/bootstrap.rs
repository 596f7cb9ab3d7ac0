use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    cache::{MokaCacheStore, ResultCache},
    config::{Settings, StorageKind},
    fetch,
    service::AirQualityService,
    store::{MeasurementStore, MemoryStore, ParquetStore},
};

pub fn init_logging() {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,airquality=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
}

pub fn open_store(settings: &Settings) -> Result<Arc<dyn MeasurementStore>> {
    Ok(match settings.storage {
        StorageKind::Parquet => {
            let store = ParquetStore::open(&settings.data_dir)
                .with_context(|| format!("opening store at {}", settings.data_dir.display()))?;
            info!(dir = %settings.data_dir.display(), "parquet store");
            Arc::new(store)
        }
        StorageKind::Memory => {
            info!("in-memory store");
            Arc::new(MemoryStore::new())
        }
    })
}

/// Wire store, cache and service from `settings`, fetching the source
/// dataset first when it is missing and a download URL is configured.
pub async fn build_service(settings: &Settings) -> Result<Arc<AirQualityService>> {
    if settings.source_url.is_some() {
        fetch::ensure_source(
            &reqwest::Client::new(),
            &settings.source_path,
            settings.source_url.as_deref(),
        )
        .await
        .context("fetching source dataset")?;
    }

    let store = open_store(settings)?;
    let cache = ResultCache::new(Arc::new(MokaCacheStore::new(
        settings.cache.max_entries,
        settings.cache_ttl(),
    )));
    Ok(Arc::new(AirQualityService::new(
        store,
        cache,
        &settings.source_path,
        settings.source_offset()?,
    )))
}
