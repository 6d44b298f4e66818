//! Client configuration
//!
//! Everything is read from the environment once at start-up. The API base may
//! be relative (`/api`, the default); it is then resolved against the origin.

use crate::error::{AppError, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_API_URL: &str = "/api";
const DEFAULT_ORIGIN: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DATA_DIR_NAME: &str = ".screener-dashboard";

pub const ENV_API_URL: &str = "SCREENER_API_URL";
pub const ENV_ORIGIN: &str = "SCREENER_ORIGIN";
pub const ENV_TIMEOUT_SECS: &str = "SCREENER_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "SCREENER_DATA_DIR";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub origin: String,
    pub timeout: Duration,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: data_dir.into(),
        }
    }

    /// Build configuration from `SCREENER_*` environment variables
    pub fn from_env() -> Result<Self> {
        let data_dir = match std::env::var(ENV_DATA_DIR) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir(),
        };

        let mut config = Self::new(data_dir);

        if let Ok(api_url) = std::env::var(ENV_API_URL) {
            if !api_url.trim().is_empty() {
                config = config.with_api_url(api_url.trim());
            }
        }

        if let Ok(origin) = std::env::var(ENV_ORIGIN) {
            if !origin.trim().is_empty() {
                config = config.with_origin(origin.trim());
            }
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_secs(1));
        self
    }

    /// Absolute API base URL, always ending in `/`
    pub fn api_base(&self) -> Result<Url> {
        let raw = self.api_url.trim();
        let mut base = if raw.starts_with("http://") || raw.starts_with("https://") {
            Url::parse(raw).map_err(|e| AppError::Config(format!("Invalid API URL '{}': {}", raw, e)))?
        } else {
            let origin = Url::parse(self.origin.trim()).map_err(|e| {
                AppError::Config(format!("Invalid origin '{}': {}", self.origin, e))
            })?;
            origin
                .join(raw)
                .map_err(|e| AppError::Config(format!("Invalid API path '{}': {}", raw, e)))?
        };

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(base)
    }

    /// SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("screener.db")
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_base_resolves_against_origin() {
        let config = Config::new("/tmp/screener");
        let base = config.api_base().unwrap();
        assert_eq!(base.as_str(), "http://localhost:5000/api/");
    }

    #[test]
    fn test_absolute_base_used_as_is() {
        let config = Config::new("/tmp/screener").with_api_url("https://screener.example.com/v2/api");
        let base = config.api_base().unwrap();
        assert_eq!(base.as_str(), "https://screener.example.com/v2/api/");
    }

    #[test]
    fn test_invalid_origin_is_config_error() {
        let config = Config::new("/tmp/screener").with_origin("not a url");
        assert!(matches!(config.api_base(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_timeout_has_floor() {
        let config = Config::new("/tmp/screener").with_timeout(Duration::ZERO);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }
}
