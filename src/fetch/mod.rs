// src/fetch/mod.rs
//! Bootstrap helper that downloads the UCI dataset archive when the source
//! file is not present locally.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use std::{
    fs::{self, File},
    io,
    path::Path,
};
use tracing::{debug, info};
use url::Url;
use zip::ZipArchive;

/// Name of the CSV entry inside the published archive.
pub const SOURCE_ENTRY: &str = "AirQualityUCI.csv";

/// Copy the archive entry whose file name is `entry_name` to `dest`.
pub fn extract_entry(zip_path: &Path, entry_name: &str, dest: &Path) -> Result<()> {
    let file = File::open(zip_path)
        .with_context(|| format!("Failed to open ZIP file: {:?}", zip_path))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to access ZIP entry #{} in {:?}", i, zip_path))?;
        let matches = Path::new(entry.name())
            .file_name()
            .is_some_and(|n| n == entry_name);
        if !entry.is_file() || !matches {
            continue;
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = dest.with_extension("csv.tmp");
        let mut out = File::create(&tmp)?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to extract {} from {:?}", entry_name, zip_path))?;
        fs::rename(&tmp, dest)?;
        return Ok(());
    }

    bail!("{} not found in {:?}", entry_name, zip_path)
}

/// Make sure `source_path` exists, downloading and unpacking the archive at
/// `url` if it does not.
pub async fn ensure_source(client: &Client, source_path: &Path, url: Option<&str>) -> Result<()> {
    if source_path.exists() {
        return Ok(());
    }
    let url = url.ok_or_else(|| {
        anyhow!(
            "source file {} is missing and no source_url is configured",
            source_path.display()
        )
    })?;
    let url = Url::parse(url).with_context(|| format!("invalid source_url {url}"))?;

    info!(%url, "downloading source archive");
    let archive = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()
        .with_context(|| format!("downloading {url}"))?
        .bytes()
        .await?;

    let workdir = tempfile::tempdir()?;
    let zip_path = workdir.path().join(archive_name(&url));
    tokio::fs::write(&zip_path, &archive).await?;
    debug!(bytes = archive.len(), path = %zip_path.display(), "archive saved");

    let dest = source_path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_entry(&zip_path, SOURCE_ENTRY, &dest)).await??;
    info!(path = %source_path.display(), "source extracted");
    Ok(())
}

/// Last path segment of `url`, or `source.zip` when it has none.
fn archive_name(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("source.zip")
}
