use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

pub const CONFIG_ENV: &str = "AIRQ_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "airquality.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Parquet,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub max_entries: u64,
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            ttl_secs: 600,
        }
    }
}

/// Process settings, read from YAML with env overrides on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub listen_addr: String,
    /// Location of `AirQualityUCI.csv`.
    pub source_path: PathBuf,
    /// Where to download the dataset ZIP from when `source_path` is missing.
    pub source_url: Option<String>,
    /// Root directory of the Parquet store.
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    /// UTC offset, in seconds, of the wall-clock times in the source file.
    pub source_utc_offset_secs: i32,
    pub cache: CacheSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            source_path: PathBuf::from("AirQualityUCI.csv"),
            source_url: None,
            data_dir: PathBuf::from("data"),
            storage: StorageKind::default(),
            source_utc_offset_secs: 0,
            cache: CacheSettings::default(),
        }
    }
}

impl Settings {
    /// Load from `$AIRQ_CONFIG` (or `airquality.yaml`), falling back to
    /// defaults when the file does not exist, then apply env overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut settings = Self::from_file_or_default(Path::new(&path))?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Override selected settings from variables found through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("AIRQ_LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Some(v) = lookup("AIRQ_SOURCE_PATH") {
            self.source_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("AIRQ_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
    }

    pub fn source_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.source_utc_offset_secs)
            .ok_or_else(|| anyhow!("source_utc_offset_secs out of range: {}", self.source_utc_offset_secs))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}
