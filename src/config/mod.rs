//! # Configuration Management Module
//!
//! Settings for the `codexp` command line tool: where progression data lives,
//! which profile to use, and how to log.
//!
//! Display and notification preferences are not part of this file. They are
//! stored with each profile's progression state (see
//! [`crate::progression::Configuration`]) and changed with `codexp configure`.
//!
//! ## Configuration File Format
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//! profile = "default"
//!
//! [logging]
//! level = "info"
//! file = "codexp.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Profile used when the command line does not name one.
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Optional override for the sled database path; defaults to `<data_dir>/codexp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

fn default_profile() -> String {
    "default".to_string()
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        match &self.db_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.data_dir).join("codexp"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl LoggingConfig {
    /// Parsed level, falling back to `Info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load `path`, or the defaults when the file does not exist.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                profile: default_profile(),
                db_path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path() {
        let config = Config::default();
        assert_eq!(config.storage.database_path(), PathBuf::from("./data").join("codexp"));
        assert_eq!(config.storage.profile, "default");
    }

    #[test]
    fn test_db_path_override() {
        let storage = StorageConfig {
            data_dir: "./data".to_string(),
            profile: "work".to_string(),
            db_path: Some("/var/lib/codexp".to_string()),
        };
        assert_eq!(storage.database_path(), PathBuf::from("/var/lib/codexp"));
    }

    #[test]
    fn test_level_filter_parsing() {
        let mut logging = LoggingConfig {
            level: "debug".to_string(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Debug);
        logging.level = "loud".to_string();
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_profile_defaults_when_missing() {
        let text = r#"
            [storage]
            data_dir = "/tmp/xp"

            [logging]
            level = "warn"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.storage.profile, "default");
        assert!(config.logging.file.is_none());
    }

    #[tokio::test]
    async fn test_create_and_load_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();

        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded.storage.data_dir, "./data");
        assert_eq!(loaded.logging.level, "info");
    }

    #[tokio::test]
    async fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = Config::load_or_default(path.to_str().unwrap()).await.unwrap();
        assert_eq!(config.storage.profile, "default");
    }
}
