/// Dashboard configuration.
///
/// Loaded from an optional TOML file (`fema_dashboard.toml` in the working
/// directory by default), then overridden by environment variables, which
/// may come from a `.env` file. Command-line flags are applied last by the
/// binary.
///
/// ```toml
/// [source]
/// url = "https://www.fema.gov/api/open/v1/FemaWebDisasterDeclarations?$orderby=disasterNumber%20desc"
/// timeout_secs = 30
/// cache_ttl_secs = 900
/// # snapshot = "snapshots/declarations.json"
///
/// [classify]
/// window_days = 90
///
/// [logging]
/// level = "info"
/// # file = "fema_dashboard.log"
/// timestamps = false
/// ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::logging::LogLevel;
use crate::model::{DashboardError, DEFAULT_API_URL, DEFAULT_WINDOW_DAYS};

pub const DEFAULT_CONFIG_PATH: &str = "fema_dashboard.toml";

pub const ENV_API_URL: &str = "FEMA_API_URL";
pub const ENV_WINDOW_DAYS: &str = "FEMA_WINDOW_DAYS";
pub const ENV_LOG_LEVEL: &str = "FEMA_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "FEMA_LOG_FILE";

/// Longest recent window accepted, one hundred years.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Cache lifetime for fetched records. 0 keeps them for the whole session.
    pub cache_ttl_secs: u64,
    /// Read records from a saved response instead of the live API.
    pub snapshot: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            cache_ttl_secs: 900,
            snapshot: None,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<chrono::Duration> {
        match self.cache_ttl_secs {
            0 => None,
            secs => i64::try_from(secs).ok().map(chrono::Duration::seconds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifyConfig {
    pub window_days: u32,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self { window_days: DEFAULT_WINDOW_DAYS }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, DashboardError> {
        self.level.parse().map_err(DashboardError::Config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub classify: ClassifyConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl DashboardConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, DashboardError> {
        let config: DashboardConfig =
            toml::from_str(contents).map_err(|e| DashboardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`.
    ///
    /// An explicitly requested file must exist. When `path` is `None` the
    /// default file is read if present, and built-in defaults are used
    /// otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, DashboardError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if !path.exists() {
            if required {
                return Err(DashboardError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }

    /// Applies environment overrides. `lookup` is `std::env::var(..).ok()`
    /// in production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.source.url = url;
        }
        if let Some(days) = lookup(ENV_WINDOW_DAYS) {
            self.classify.window_days = days.trim().parse().map_err(|_| {
                DashboardError::Config(format!("{} must be a whole number of days, got '{}'", ENV_WINDOW_DAYS, days))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.logging.file = Some(file).filter(|f| !f.trim().is_empty());
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.source.url.trim().is_empty() && self.source.snapshot.is_none() {
            return Err(DashboardError::Config("source.url must not be empty".to_string()));
        }
        if self.source.timeout_secs == 0 {
            return Err(DashboardError::Config("source.timeout_secs must be positive".to_string()));
        }
        if self.classify.window_days > MAX_WINDOW_DAYS {
            return Err(DashboardError::Config(format!(
                "classify.window_days must be at most {}, got {}",
                MAX_WINDOW_DAYS, self.classify.window_days
            )));
        }
        self.logging.min_level()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.source.url, DEFAULT_API_URL);
        assert_eq!(config.classify.window_days, 90);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [classify]
            window_days = 30

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.classify.window_days, 30);
        assert_eq!(config.logging.min_level().unwrap(), LogLevel::Debug);
        assert_eq!(config.source.timeout_secs, 30);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = DashboardConfig::from_toml_str("[classify]\nwindow = 30\n");
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        let result = DashboardConfig::from_toml_str("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_cache_ttl_zero_means_session_lifetime() {
        let mut source = SourceConfig::default();
        assert_eq!(source.cache_ttl(), Some(chrono::Duration::seconds(900)));
        source.cache_ttl_secs = 0;
        assert_eq!(source.cache_ttl(), None);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = DashboardConfig::default();
        config
            .apply_env_overrides(env(&[
                (ENV_API_URL, "http://localhost:8080/declarations"),
                (ENV_WINDOW_DAYS, "45"),
                (ENV_LOG_LEVEL, "warn"),
            ]))
            .unwrap();
        assert_eq!(config.source.url, "http://localhost:8080/declarations");
        assert_eq!(config.classify.window_days, 45);
        assert_eq!(config.logging.min_level().unwrap(), LogLevel::Warning);
    }

    #[test]
    fn test_non_numeric_window_override_is_config_error() {
        let mut config = DashboardConfig::default();
        let result = config.apply_env_overrides(env(&[(ENV_WINDOW_DAYS, "ninety")]));
        assert!(matches!(result, Err(DashboardError::Config(msg)) if msg.contains(ENV_WINDOW_DAYS)));
    }

    #[test]
    fn test_oversized_window_is_config_error() {
        let result = DashboardConfig::from_toml_str("[classify]\nwindow_days = 4000000000\n");
        assert!(matches!(result, Err(DashboardError::Config(msg)) if msg.contains("window_days")));

        let mut config = DashboardConfig::default();
        let result = config.apply_env_overrides(env(&[(ENV_WINDOW_DAYS, "4000000000")]));
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_window_at_limit_is_accepted() {
        let mut config = DashboardConfig::default();
        config.classify.window_days = MAX_WINDOW_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = DashboardConfig::load(Some(Path::new("/nonexistent/fema_dashboard.toml")));
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }
}
