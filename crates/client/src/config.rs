//! Client configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_URL: &str = "EXCURSIO_API_URL";
pub const ENV_CATALOG_FILE: &str = "EXCURSIO_CATALOG_FILE";
pub const ENV_STORE_PATH: &str = "EXCURSIO_STORE_PATH";
pub const ENV_DOWNLOAD_DIR: &str = "EXCURSIO_DOWNLOAD_DIR";
pub const ENV_AUTO_EXPORT_DELAY_MS: &str = "EXCURSIO_AUTO_EXPORT_DELAY_MS";
pub const ENV_RASTER_DPI: &str = "EXCURSIO_RASTER_DPI";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the catalog API.
    pub api_url: String,
    /// JSON fixture catalog; takes precedence over `api_url` when set.
    pub catalog_file: Option<PathBuf>,
    pub store_path: PathBuf,
    pub download_dir: PathBuf,
    pub auto_export_delay: Duration,
    pub raster_dpi: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            catalog_file: None,
            store_path: PathBuf::from("./excursio-bookings.json"),
            download_dir: PathBuf::from("."),
            auto_export_delay: Duration::from_millis(500),
            raster_dpi: 150,
        }
    }
}

fn parse_number<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value,
        reason: e.to_string(),
    })
}

impl ClientConfig {
    /// Read the process environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(path) = get(ENV_CATALOG_FILE) {
            config.catalog_file = Some(PathBuf::from(path));
        }
        if let Some(path) = get(ENV_STORE_PATH) {
            config.store_path = PathBuf::from(path);
        }
        if let Some(dir) = get(ENV_DOWNLOAD_DIR) {
            config.download_dir = PathBuf::from(dir);
        }
        if let Some(ms) = get(ENV_AUTO_EXPORT_DELAY_MS) {
            let ms = parse_number(ENV_AUTO_EXPORT_DELAY_MS, ms)?;
            config.auto_export_delay = Duration::from_millis(ms);
        }
        if let Some(dpi) = get(ENV_RASTER_DPI) {
            config.raster_dpi = parse_number(ENV_RASTER_DPI, dpi)?;
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_catalog_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_file = Some(path.into());
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_auto_export_delay(mut self, delay: Duration) -> Self {
        self.auto_export_delay = delay;
        self
    }

    pub fn with_raster_dpi(mut self, dpi: u32) -> Self {
        self.raster_dpi = dpi;
        self
    }
}
