use airquality::{api, bootstrap, config::Settings};
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    bootstrap::init_logging();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) settings ─────────────────────────────────────────────────
    let settings = Settings::load()?;
    info!(?settings, "loaded settings");

    // ─── 3) store, cache, service ────────────────────────────────────
    let service = bootstrap::build_service(&settings).await?;

    // ─── 4) serve ────────────────────────────────────────────────────
    let listener = TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("binding {}", settings.listen_addr))?;
    info!(addr = %settings.listen_addr, "listening");
    axum::serve(listener, api::router(service)).await?;

    info!("shutdown");
    Ok(())
}
