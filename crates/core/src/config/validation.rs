//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, STAGE_KINDS, SqliteConfig};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `filters` is empty.
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `filters` names an unknown stage kind, or ends with `bloom`
    /// - `bloom.page_size` is 0 or exceeds 100000
    /// - `bloom.refresh_interval_secs` is 0 or exceeds one day
    /// - a store path used by the chain is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filters.is_empty() {
            return Err(ConfigError::Missing {
                field: "filters".into(),
                hint: "list at least one stage, e.g. filters = [\"sqlite\"]".into(),
            });
        }

        if let Some(unknown) = self.filters.iter().find(|kind| !STAGE_KINDS.contains(&kind.as_str())) {
            return Err(ConfigError::Invalid {
                field: "filters".into(),
                reason: format!("{unknown} is not a valid filter, the valid options are {STAGE_KINDS:?}"),
            });
        }

        if self.filters.last().is_some_and(|kind| kind == "bloom") {
            return Err(ConfigError::Invalid {
                field: "filters".into(),
                reason: "bloom requires a secondary filter after it".into(),
            });
        }

        if self.uses("sqlite") {
            validate_store("sqlite.path", &self.sqlite)?;
        }

        if self.uses("bloom") {
            self.validate_bloom()?;
        }

        Ok(())
    }

    fn uses(&self, kind: &str) -> bool {
        self.filters.iter().any(|k| k == kind)
    }

    fn validate_bloom(&self) -> Result<(), ConfigError> {
        let bloom = &self.bloom;
        if bloom.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "bloom.page_size".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if bloom.page_size > 100_000 {
            return Err(ConfigError::Invalid {
                field: "bloom.page_size".into(),
                reason: "must not exceed 100000".into(),
            });
        }

        if bloom.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "bloom.refresh_interval_secs".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        if bloom.refresh_interval_secs > 86_400 {
            return Err(ConfigError::Invalid {
                field: "bloom.refresh_interval_secs".into(),
                reason: "must not exceed 1 day (86400s)".into(),
            });
        }

        validate_store("bloom.store.path", &bloom.store)?;
        validate_store("bloom.source.path", &bloom.source)?;

        if bloom.source.path.as_os_str() == ":memory:" {
            tracing::warn!("bloom.source is an in-memory database; the bloom filter will never load any URLs");
        }

        Ok(())
    }
}

fn validate_store(field: &str, store: &SqliteConfig) -> Result<(), ConfigError> {
    if store.path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn with_filters(filters: &[&str]) -> AppConfig {
        AppConfig { filters: filters.iter().map(|f| f.to_string()).collect(), ..Default::default() }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_filters() {
        let config = with_filters(&[]);
        assert!(matches!(config.validate(), Err(ConfigError::Missing { field, .. }) if field == "filters"));
    }

    #[test]
    fn test_validate_unknown_filter() {
        let config = with_filters(&["sqlite", "wzzl"]);
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, reason }) if field == "filters" && reason.contains("wzzl")));
    }

    #[test]
    fn test_validate_bloom_needs_successor() {
        let config = with_filters(&["memory", "bloom"]);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "filters"));

        let config = with_filters(&["memory", "bloom", "sqlite"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_page_size() {
        let mut config = with_filters(&["bloom", "fake"]);
        config.bloom.page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "bloom.page_size"));

        config.bloom.page_size = 100_001;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "bloom.page_size"));

        config.bloom.page_size = 100_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_refresh_interval() {
        let mut config = with_filters(&["bloom", "fake"]);
        config.bloom.refresh_interval_secs = 0;
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "bloom.refresh_interval_secs"));

        config.bloom.refresh_interval_secs = 86_401;
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "bloom.refresh_interval_secs"));
    }

    #[test]
    fn test_validate_bloom_settings_ignored_when_unused() {
        let mut config = with_filters(&["memory", "fake"]);
        config.bloom.page_size = 0;
        config.sqlite.path = PathBuf::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_store_path() {
        let mut config = with_filters(&["sqlite"]);
        config.sqlite.path = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "sqlite.path"));
    }
}
