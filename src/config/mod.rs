//! Configuration loading and management
//!
//! Two sources: [`AppConfig`] is the YAML settings file editable through
//! `/api/settings`, and [`ServerSettings`] is read from the environment at
//! startup.

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Settings file used when `CONFIG_PATH` is unset
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

const WEBHOOK_PREFIXES: [&str; 2] = [
    "https://discord.com/api/webhooks/",
    "https://discordapp.com/api/webhooks/",
];

/// Settings persisted in the YAML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Discord webhook for notifications; empty disables them
    #[serde(default)]
    pub discord_webhook_url: String,
}

impl AppConfig {
    /// Load configuration from a YAML file
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Self::from_read(path, std::fs::read_to_string(path))
    }

    /// [`AppConfig::load`] on tokio's file API, for use inside handlers
    pub async fn load_async(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Self::from_read(path, tokio::fs::read_to_string(path).await)
    }

    fn from_read(path: &Path, read: std::io::Result<String>) -> Result<Self, ConfigError> {
        let content = match read {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        };
        Self::from_yaml_str(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, String> {
        // an empty document parses to unit, not a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }

    /// Write the configuration to `path` as YAML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |message: String| ConfigError::Write {
            path: path.display().to_string(),
            message,
        };
        let yaml = serde_yaml::to_string(self).map_err(|e| write_error(e.to_string()))?;
        std::fs::write(path, yaml).map_err(|e| write_error(e.to_string()))
    }

    /// [`AppConfig::save`] on tokio's file API
    pub async fn save_async(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |message: String| ConfigError::Write {
            path: path.display().to_string(),
            message,
        };
        let yaml = serde_yaml::to_string(self).map_err(|e| write_error(e.to_string()))?;
        tokio::fs::write(path, yaml)
            .await
            .map_err(|e| write_error(e.to_string()))
    }

    /// Check the webhook URL, if one is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.discord_webhook_url;
        if url.is_empty() || WEBHOOK_PREFIXES.iter().any(|p| url.starts_with(p)) {
            return Ok(());
        }
        Err(ConfigError::InvalidValue {
            field: "discord_webhook_url".to_string(),
            message: format!(
                "discord webhook URL must start with {} or {}",
                WEBHOOK_PREFIXES[0], WEBHOOK_PREFIXES[1]
            ),
        })
    }

    pub fn webhook_configured(&self) -> bool {
        !self.discord_webhook_url.is_empty()
    }
}

/// Process settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// `PORT`, default 8080
    pub port: u16,
    /// `DATABASE_PATH`, default `./credit_cards.db`
    pub database_path: PathBuf,
    /// `LOAD_SAMPLE_DATA`, only the exact value `true` enables it
    pub load_sample_data: bool,
    /// `STATIC_DIR`, default `./static`
    pub static_dir: PathBuf,
    /// `CONFIG_PATH`, default `./config.yaml`
    pub config_path: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            database_path: PathBuf::from("./credit_cards.db"),
            load_sample_data: false,
            static_dir: PathBuf::from("./static"),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset or empty keys keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(port) = get("PORT") {
            settings.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                message: format!("PORT must be a port number, got '{}'", port),
            })?;
        }
        if let Some(path) = get("DATABASE_PATH") {
            settings.database_path = PathBuf::from(path);
        }
        settings.load_sample_data = get("LOAD_SAMPLE_DATA").as_deref() == Some("true");
        if let Some(dir) = get("STATIC_DIR") {
            settings.static_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("CONFIG_PATH") {
            settings.config_path = PathBuf::from(path);
        }
        Ok(settings)
    }
}
