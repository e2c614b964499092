//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the app origin, the remote catalog URL, cache naming and network options.
//!
//! Configuration is stored at `~/.config/hitlog/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::worker::{AssetRules, WorkerConfig, DEFAULT_APP_PREFIX, DEFAULT_CACHE_VERSION};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "hitlog";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_ORIGIN: &str = "http://localhost:5173/";

/// Path of the remote catalog relative to the origin
const DEFAULT_CATALOG_PATH: &str = "/exercises.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub origin: String,
    /// Defaults to `exercises.json` on the origin
    pub catalog_url: Option<String>,
    pub app_prefix: String,
    pub cache_version: String,
    pub asset_prefixes: Vec<String>,
    pub request_timeout_secs: Option<u64>,
    pub offline_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            catalog_url: None,
            app_prefix: DEFAULT_APP_PREFIX.to_string(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            asset_prefixes: AssetRules::default().path_prefixes,
            request_timeout_secs: Some(15),
            offline_mode: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Ok(serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Response cache partitions and log files live here.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Workout state and the cached catalog live here.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Apply `HITLOG_ORIGIN` / `HITLOG_CATALOG_URL` overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("HITLOG_ORIGIN").ok(),
            std::env::var("HITLOG_CATALOG_URL").ok(),
        );
    }

    fn apply_overrides(&mut self, origin: Option<String>, catalog_url: Option<String>) {
        if let Some(origin) = origin.filter(|v| !v.trim().is_empty()) {
            self.origin = origin.trim().to_string();
        }
        if let Some(url) = catalog_url.filter(|v| !v.trim().is_empty()) {
            self.catalog_url = Some(url.trim().to_string());
        }
    }

    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin).with_context(|| format!("Invalid origin URL: {}", self.origin))
    }

    pub fn catalog_endpoint(&self) -> Result<Url> {
        match &self.catalog_url {
            Some(url) => Url::parse(url).with_context(|| format!("Invalid catalog URL: {}", url)),
            None => self
                .origin_url()?
                .join(DEFAULT_CATALOG_PATH)
                .context("Failed to build catalog URL"),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn asset_rules(&self) -> AssetRules {
        AssetRules::with_prefixes(self.asset_prefixes.clone())
    }

    pub fn worker_config(&self) -> Result<WorkerConfig> {
        Ok(WorkerConfig::new(self.origin_url()?).with_version(&self.app_prefix, &self.cache_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let worker = config.worker_config().unwrap();
        assert_eq!(worker.static_partition(), "hit-static-v3");
        assert_eq!(config.catalog_endpoint().unwrap().as_str(), "http://localhost:5173/exercises.json");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"origin": "https://hit.example/"}"#).unwrap();
        assert_eq!(config.origin, "https://hit.example/");
        assert_eq!(config.cache_version, DEFAULT_CACHE_VERSION);
        assert!(!config.offline_mode);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("https://hit.example/app/".into()), Some(" ".into()));
        assert_eq!(config.origin, "https://hit.example/app/");
        assert!(config.catalog_url.is_none());
        assert_eq!(config.catalog_endpoint().unwrap().as_str(), "https://hit.example/exercises.json");

        config.apply_overrides(None, Some("https://cdn.example/c.json".into()));
        assert_eq!(config.catalog_endpoint().unwrap().as_str(), "https://cdn.example/c.json");
    }

    #[test]
    fn test_invalid_origin() {
        let config = Config {
            origin: "not a url".into(),
            ..Config::default()
        };
        assert!(config.worker_config().is_err());
    }
}
