//! Configuration management for lexis.
//!
//! Settings are stored in TOML and can be overridden from the environment.
//!
//! ## Resolution Order
//!
//! 1. **Defaults**: built-in values (see [`Config::default`])
//! 2. **Config file**: `<config_dir>/config.toml`, or the file named by `LEXIS_CONFIG`
//! 3. **Environment variables**: `LEXIS_*` overrides
//!
//! ## Example Configuration File
//!
//! ```toml
//! [fetch]
//! base_url = "https://www.ldoceonline.com"
//! timeout_secs = 30
//!
//! [store]
//! path = "/home/user/.local/share/lexis/lexis.db"
//! ```
//!
//! ## Environment Variables
//!
//! | variable | overrides |
//! |---|---|
//! | `LEXIS_CONFIG` | config file location |
//! | `LEXIS_DICTIONARY_URL` | `fetch.base_url` |
//! | `LEXIS_FETCH_TIMEOUT_SECS` | `fetch.timeout_secs` |
//! | `LEXIS_DB_PATH` | `store.path` |

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default dictionary host.
pub const DEFAULT_BASE_URL: &str = "https://www.ldoceonline.com";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_CONFIG: &str = "LEXIS_CONFIG";
const ENV_DICTIONARY_URL: &str = "LEXIS_DICTIONARY_URL";
const ENV_FETCH_TIMEOUT: &str = "LEXIS_FETCH_TIMEOUT_SECS";
const ENV_DB_PATH: &str = "LEXIS_DB_PATH";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dictionary fetching settings
    pub fetch: FetchConfig,
    /// Entry store settings
    pub store: StoreConfig,
}

/// Settings for the dictionary page fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Scheme and host of the dictionary site. Pages are requested from
    /// `<base_url>/dictionary/<word>`.
    pub base_url: String,

    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Settings for the entry store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Location of the SQLite database file.
    ///
    /// Default locations:
    /// - Linux: `~/.local/share/lexis/lexis.db`
    /// - macOS: `~/Library/Application Support/dev.lexis.lexis/lexis.db`
    /// - Windows: `%APPDATA%\lexis\lexis\data\lexis.db`
    pub path: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let path = directories::ProjectDirs::from("dev", "lexis", "lexis").map_or_else(
            || {
                directories::BaseDirs::new().map_or_else(
                    || PathBuf::from(".lexis/lexis.db"),
                    |base| base.home_dir().join(".lexis").join("lexis.db"),
                )
            },
            |dirs| dirs.data_dir().join("lexis.db"),
        );
        Self { path }
    }
}

impl FetchConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default location and apply environment overrides.
    ///
    /// A missing config file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if an environment override holds an invalid value.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(ENV_CONFIG) {
            Some(path) => PathBuf::from(path),
            None => Self::config_path()?,
        };

        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from an explicit file, falling back to defaults if it
    /// does not exist. Environment overrides are not applied.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Apply `LEXIS_*` overrides using `lookup` to read variables.
    ///
    /// Taking the lookup as a closure keeps tests independent of the process
    /// environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DICTIONARY_URL).filter(|v| !v.trim().is_empty()) {
            self.fetch.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_FETCH_TIMEOUT) {
            self.fetch.timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_FETCH_TIMEOUT} must be a whole number of seconds, got '{raw}'"))
            })?;
        }

        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            self.store.path = PathBuf::from(path);
        }

        self.validate()
    }

    /// Check that the configured values are usable.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.fetch.base_url)
            .map_err(|e| Error::Config(format!("Invalid fetch.base_url '{}': {e}", self.fetch.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "fetch.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::Config("fetch.timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }

    /// Get the path where the configuration file is stored by default.
    ///
    /// - Linux: `~/.config/lexis/config.toml`
    /// - macOS: `~/Library/Application Support/dev.lexis.lexis/config.toml`
    /// - Windows: `%APPDATA%\lexis\lexis\config\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = directories::ProjectDirs::from("dev", "lexis", "lexis")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.fetch.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert!(config.store.path.ends_with("lexis.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        // Given: a customised configuration saved to disk
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.fetch.base_url = "http://localhost:8080".to_string();
        config.fetch.timeout_secs = 5;
        config.store.path = temp.path().join("words.db");

        // When: saving and reloading it
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        // Then: every field survives
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[fetch]\ntimeout_secs = 7\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.fetch.timeout_secs, 7);
        assert_eq!(config.fetch.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[fetch\nbase_url = ").unwrap();

        match Config::load_from(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains("Failed to parse config")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                (ENV_DICTIONARY_URL, "http://127.0.0.1:9999"),
                (ENV_FETCH_TIMEOUT, " 12 "),
                (ENV_DB_PATH, "/tmp/lexis-test.db"),
            ]))
            .unwrap();

        assert_eq!(config.fetch.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.fetch.timeout_secs, 12);
        assert_eq!(config.store.path, PathBuf::from("/tmp/lexis-test.db"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[(ENV_DICTIONARY_URL, "  "), (ENV_DB_PATH, "")]))
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.apply_overrides(env(&[(ENV_FETCH_TIMEOUT, "soon")])),
            Err(Error::Config(_))
        ));

        let mut config = Config::default();
        assert!(matches!(
            config.apply_overrides(env(&[(ENV_DICTIONARY_URL, "ftp://example.com")])),
            Err(Error::Config(_))
        ));

        let mut config = Config::default();
        assert!(matches!(
            config.apply_overrides(env(&[(ENV_FETCH_TIMEOUT, "0")])),
            Err(Error::Config(_))
        ));
    }
}
