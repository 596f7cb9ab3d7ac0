// One-shot import of the source dataset into the configured store.

use airquality::{bootstrap, config::Settings, ingest::IngestResult};
use anyhow::Result;
use tokio::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_logging();

    let settings = Settings::load()?;
    let service = bootstrap::build_service(&settings).await?;

    let start = Instant::now();
    let result = service.ingest_source().await?;
    match result {
        IngestResult::Inserted(n) => info!(rows = n, elapsed = ?start.elapsed(), "imported"),
        IngestResult::SkippedAlreadyPresent => info!("store already populated; nothing to do"),
    }
    println!("{}", result.message());
    Ok(())
}
