use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-stage network timeouts (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connect timeout applied to every request.
    pub connect_secs: u64,
    /// Total timeout for the translation call.
    pub translate_secs: u64,
    /// Total timeout for the search listing fetch.
    pub search_secs: u64,
    /// Total timeout for detail and interstitial page fetches.
    pub page_secs: u64,
    /// Overall cap for the package stream. Payloads can be hundreds of MB, so
    /// a slow but moving transfer is bounded by the stall settings instead.
    pub download_secs: u64,
    /// The package stream is aborted when it stays below
    /// `stall_min_bytes_per_sec` for this many seconds.
    pub stall_secs: u64,
    pub stall_min_bytes_per_sec: u32,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 15,
            translate_secs: 10,
            search_secs: 30,
            page_secs: 20,
            download_secs: 3600,
            stall_secs: 60,
            stall_min_bytes_per_sec: 1024,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn translate(&self) -> Duration {
        Duration::from_secs(self.translate_secs)
    }

    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }

    pub fn page(&self) -> Duration {
        Duration::from_secs(self.page_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }

    pub fn stall(&self) -> Duration {
        Duration::from_secs(self.stall_secs)
    }
}

/// Query translation settings (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// When false, queries are never sent to the translation service.
    pub enabled: bool,
    /// Endpoint of the translation service.
    pub endpoint: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            source_lang: "ar".to_string(),
            target_lang: "en".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/apkdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApkdlConfig {
    /// Base address of the catalog site; relative links are resolved against it.
    pub catalog_base_url: String,
    /// Host that every candidate address must belong to.
    pub catalog_domain: String,
    /// Path of the search endpoint (query goes in `q`).
    pub search_path: String,
    /// Maximum number of search results tried per request.
    pub max_candidates: usize,
    /// Directory (relative to the working directory) receiving packages.
    pub downloads_dir: PathBuf,
    /// Browser identity sent with every request.
    pub user_agent: String,
    /// Accept-Language for the search listing.
    pub search_accept_language: String,
    /// Accept-Language for detail, interstitial and package requests.
    pub page_accept_language: String,
    /// Receive buffer size for the package stream (bytes per chunk, at most).
    pub chunk_size_bytes: usize,
    pub timeouts: TimeoutConfig,
    pub translation: TranslationConfig,
}

impl Default for ApkdlConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: "https://apkpure.com".to_string(),
            catalog_domain: "apkpure.com".to_string(),
            search_path: "/search".to_string(),
            max_candidates: 5,
            downloads_dir: PathBuf::from("downloads"),
            user_agent: "Mozilla/5.0 (Linux; Android 10; SM-G973F) AppleWebKit/537.36 \
                (KHTML, like Gecko) Chrome/91.0.4472.120 Mobile Safari/537.36"
                .to_string(),
            search_accept_language: "ar,en-US,en;q=0.5".to_string(),
            page_accept_language: "en-US,en;q=0.5".to_string(),
            chunk_size_bytes: 8192,
            timeouts: TimeoutConfig::default(),
            translation: TranslationConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("apkdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ApkdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ApkdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from(path: &Path) -> Result<ApkdlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: ApkdlConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
