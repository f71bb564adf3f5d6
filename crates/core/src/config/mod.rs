//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (URLFILTER_*)
//! 2. TOML config file (if URLFILTER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Stage kinds understood by the chain builder.
pub const STAGE_KINDS: &[&str] = &["fake", "memory", "sqlite", "bloom"];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (URLFILTER_*)
/// 2. TOML config file (if URLFILTER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Filter chain, consulted head (first) to tail (last).
    ///
    /// Valid kinds are listed in [`STAGE_KINDS`].
    #[serde(default = "default_filters")]
    pub filters: Vec<String>,

    /// Terminal stub stage.
    #[serde(default)]
    pub fake: FakeConfig,

    /// SQLite cache-aside stage.
    #[serde(default)]
    pub sqlite: SqliteConfig,

    /// Bloom pre-filter stage.
    #[serde(default)]
    pub bloom: BloomConfig,
}

/// Config for the `fake` stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FakeConfig {
    /// Substrings that cause a URL to be flagged.
    #[serde(default)]
    pub markers: Vec<String>,
}

/// Connection parameters for one SQLite store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`.
    #[serde(default = "default_sqlite_path")]
    pub path: PathBuf,

    /// Extra `PRAGMA` statements applied when the store is opened,
    /// e.g. `"cache_size = -65536"`.
    #[serde(default)]
    pub pragmas: Vec<String>,
}

/// Config for a bloom pre-filter loaded from an authoritative SQLite store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomConfig {
    /// Store holding the approximate set.
    #[serde(default = "default_bloom_store")]
    pub store: SqliteConfig,

    /// Authoritative store the set is paged in from.
    #[serde(default = "default_bloom_source")]
    pub source: SqliteConfig,

    /// Number of keys requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Seconds between catch-up loads.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_filters() -> Vec<String> {
    vec!["sqlite".into()]
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./urlfilter-cache.sqlite")
}

fn default_bloom_store() -> SqliteConfig {
    SqliteConfig { path: PathBuf::from(":memory:"), pragmas: Vec::new() }
}

fn default_bloom_source() -> SqliteConfig {
    SqliteConfig { path: PathBuf::from("./urlfilter.sqlite"), pragmas: Vec::new() }
}

fn default_page_size() -> u64 {
    1000
}

fn default_refresh_interval_secs() -> u64 {
    300 // 5 minutes
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self { path: default_sqlite_path(), pragmas: Vec::new() }
    }
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            store: default_bloom_store(),
            source: default_bloom_source(),
            page_size: default_page_size(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filters: default_filters(),
            fake: FakeConfig::default(),
            sqlite: SqliteConfig::default(),
            bloom: BloomConfig::default(),
        }
    }
}

impl BloomConfig {
    /// Refresh interval as Duration for use with tokio.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `URLFILTER_`
    /// 2. TOML file from `URLFILTER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("URLFILTER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("URLFILTER_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate configuration from an already layered figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
