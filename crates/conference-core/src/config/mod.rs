//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::storage::{DatabaseConfig, Schema, default_primary_path, default_search_index_path};

/// Conference service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub search: SearchSettings,
    pub api: ApiConfig,
}

/// Primary store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file; defaults to the data directory
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

/// Search index settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Index database file; defaults to the data directory
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

/// Status reported when an update targets an id the primary store lacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIdStatus {
    /// 400, with error key `idnotfound`
    #[default]
    BadRequest,
    /// 404
    NotFound,
}

impl UnknownIdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bad_request" => Some(Self::BadRequest),
            "not_found" => Some(Self::NotFound),
            _ => None,
        }
    }
}

/// Resource layer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Prefix of the alert headers
    pub application_name: String,
    pub unknown_id_status: UnknownIdStatus,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            application_name: "conferenceApp".to_string(),
            unknown_id_status: UnknownIdStatus::BadRequest,
        }
    }
}

impl DatabaseSettings {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_primary_path)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::with_path(self.resolved_path(), Schema::Primary)
            .max_connections(self.max_connections)
    }
}

impl SearchSettings {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_search_index_path)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::with_path(self.resolved_path(), Schema::SearchIndex)
            .max_connections(self.max_connections)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("CONFERENCE_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("conference")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or use defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.max_connections == 0 || self.search.max_connections == 0 {
            return Err(anyhow!("max_connections must be at least 1"));
        }
        if self.api.application_name.trim().is_empty() {
            return Err(anyhow!("api.application_name must not be empty"));
        }
        if self.database.path.is_some() && self.database.path == self.search.path {
            return Err(anyhow!(
                "The primary store and the search index need separate database files"
            ));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "database.path" => Ok(self.database.resolved_path().display().to_string()),
            "database.max_connections" => Ok(self.database.max_connections.to_string()),
            "search.path" => Ok(self.search.resolved_path().display().to_string()),
            "search.max_connections" => Ok(self.search.max_connections.to_string()),
            "api.application_name" => Ok(self.api.application_name.clone()),
            "api.unknown_id_status" => Ok(self.api.unknown_id_status.as_str().to_string()),
            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `conference config show` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "database.path" => {
                self.database.path = Some(PathBuf::from(value));
            }
            "database.max_connections" => {
                self.database.max_connections = value
                    .parse()
                    .with_context(|| format!("Invalid max_connections value: {}", value))?;
            }
            "search.path" => {
                self.search.path = Some(PathBuf::from(value));
            }
            "search.max_connections" => {
                self.search.max_connections = value
                    .parse()
                    .with_context(|| format!("Invalid max_connections value: {}", value))?;
            }
            "api.application_name" => {
                self.api.application_name = value.to_string();
            }
            "api.unknown_id_status" => {
                self.api.unknown_id_status = UnknownIdStatus::parse(value).ok_or_else(|| {
                    anyhow!(
                        "Invalid unknown_id_status: {}. Valid options: bad_request, not_found",
                        value
                    )
                })?;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `conference config show` to see available keys.",
                    key
                ));
            }
        }

        self.validate()
    }

    /// All keys accepted by `get` and `set`
    pub fn keys() -> &'static [&'static str] {
        &[
            "database.path",
            "database.max_connections",
            "search.path",
            "search.max_connections",
            "api.application_name",
            "api.unknown_id_status",
        ]
    }
}
