//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the per-directory config
pub const LOCAL_CONFIG_FILE: &str = "lari.yaml";

/// Database file name used when nothing else is configured
pub const DEFAULT_DATABASE_FILE: &str = "equipage.db";

/// Keys accepted by `lari config set`, with descriptions
pub const VALID_KEYS: &[(&str, &str)] = &[
    ("database", "Path to the equipage SQLite database"),
    ("legacy_file", "Default legacy XML equipage file for import/export"),
    ("default_format", "Default output format (tsv, json, yaml, csv, md)"),
];

/// LARI configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Equipage database file
    pub database: Option<PathBuf>,

    /// Legacy XML equipage file
    pub legacy_file: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// The `--database` flag is applied by the caller on top of this.
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/lari/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Local config (./lari.yaml)
        if let Some(local) = Self::read_file(&Self::local_config_path()) {
            config.merge(local);
        }

        // 4. Environment variables
        if let Ok(database) = std::env::var("LARI_DATABASE") {
            if !database.is_empty() {
                config.database = Some(PathBuf::from(database));
            }
        }
        if let Ok(legacy) = std::env::var("LARI_LEGACY_FILE") {
            if !legacy.is_empty() {
                config.legacy_file = Some(PathBuf::from(legacy));
            }
        }

        config
    }

    /// Parse one config file, or `None` if it is absent or unreadable
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config file");
                return None;
            }
        };
        match Self::from_yaml(&contents) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Parse a config document; an empty document is the default config
    pub fn from_yaml(contents: &str) -> Result<Config, serde_yml::Error> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "lari")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Path of the config file in the current directory
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(LOCAL_CONFIG_FILE)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.legacy_file.is_some() {
            self.legacy_file = other.legacy_file;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Resolved database path
    ///
    /// Falls back to the platform data directory, then the current directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref path) = self.database {
            return path.clone();
        }
        directories::ProjectDirs::from("", "", "lari")
            .map(|dirs| dirs.data_dir().join(DEFAULT_DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
    }

    /// Look up a key by its config-file name
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "database" => self.database.as_ref().map(|p| p.display().to_string()),
            "legacy_file" => self.legacy_file.as_ref().map(|p| p.display().to_string()),
            "default_format" => self.default_format.clone(),
            _ => None,
        }
    }

    /// Whether `key` is a known configuration key
    pub fn is_valid_key(key: &str) -> bool {
        VALID_KEYS.iter().any(|(k, _)| *k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_later_layer_wins() {
        let mut config = Config::from_yaml("database: /srv/lari/global.db\ndefault_format: json\n")
            .unwrap();
        let local = Config::from_yaml("database: ./local.db\n").unwrap();

        config.merge(local);

        assert_eq!(config.database, Some(PathBuf::from("./local.db")));
        assert_eq!(config.default_format.as_deref(), Some("json"));
        assert!(config.legacy_file.is_none());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_explicit_database_path() {
        let config = Config {
            database: Some(PathBuf::from("fleet.db")),
            ..Default::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("fleet.db"));
        assert_eq!(config.get("database").as_deref(), Some("fleet.db"));
    }

    #[test]
    fn test_default_database_file_name() {
        let path = Config::default().database_path();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(DEFAULT_DATABASE_FILE)
        );
    }

    #[test]
    fn test_valid_keys() {
        assert!(Config::is_valid_key("legacy_file"));
        assert!(!Config::is_valid_key("author"));
        assert!(Config::default().get("nope").is_none());
    }
}
