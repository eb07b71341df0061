//! Configuration management for Model Studio
//!
//! Supports configuration via:
//! 1. Config file (~/.config/model-studio/config.toml)
//! 2. Environment variables (OPENROUTER_BASE_URL, MODEL_STUDIO_MODEL)
//! 3. CLI arguments (override file/env settings)
//!
//! The API key is deliberately not part of the file.

use crate::api::{RequestOptions, DEFAULT_TIMEOUT_SECS};
use crate::registry::{self, DEFAULT_CODE_LANGUAGE, DEFAULT_MODEL_ID};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Unknown config key: {0}")]
    UnknownKey(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference provider connection
    pub provider: ProviderSettings,

    /// Startup selection
    pub studio: StudioSettings,

    pub chat: ChatSettings,

    pub code: CodeSettings,

    pub image: ImageSettings,
}

/// Provider connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API root (can also use OPENROUTER_BASE_URL env var)
    pub base_url: String,

    /// Sent as HTTP-Referer to identify the client
    pub referer: String,

    /// Sent as X-Title
    pub title: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        let options = RequestOptions::default();
        Self {
            base_url: options.base_url,
            referer: options.referer,
            title: options.title,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioSettings {
    /// Model selected at startup (can also use MODEL_STUDIO_MODEL env var)
    pub default_model: String,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Send earlier turns with every chat request
    pub include_history: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSettings {
    pub default_language: String,
}

impl Default for CodeSettings {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_CODE_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Requested image dimensions, e.g. "1024x1024"
    pub size: String,

    /// Images per request
    pub count: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        let options = RequestOptions::default();
        Self {
            size: options.image_size,
            count: options.image_count,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("model-studio")
            .join("config.toml")
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from specific path with environment overrides applied;
    /// a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::read_file(path)?.with_env_overrides())
    }

    /// Stored settings only, without environment overrides. Use this when the
    /// result is written back to disk.
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("OPENROUTER_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Ok(model) = std::env::var("MODEL_STUDIO_MODEL") {
            self.studio.default_model = model;
        }
        self
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path())
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Set a `section.field` value from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        };

        match key {
            "provider.base_url" => self.provider.base_url = value.to_string(),
            "provider.referer" => self.provider.referer = value.to_string(),
            "provider.title" => self.provider.title = value.to_string(),
            "provider.timeout_secs" => {
                self.provider.timeout_secs = value.parse::<u64>().map_err(|e| invalid(format!("{}", e)))?
            }
            "studio.default_model" => {
                if registry::ModelRegistry::new().find(value).is_none() {
                    return Err(invalid("not a known model id".to_string()));
                }
                self.studio.default_model = value.to_string();
            }
            "chat.include_history" => {
                self.chat.include_history = value.parse::<bool>().map_err(|e| invalid(format!("{}", e)))?
            }
            "code.default_language" => {
                if !registry::is_known_language(value) {
                    return Err(invalid(format!(
                        "expected one of {}",
                        registry::CODE_LANGUAGES.join(", ")
                    )));
                }
                self.code.default_language = value.to_string();
            }
            "image.size" => self.image.size = value.to_string(),
            "image.count" => {
                self.image.count = value.parse::<u32>().map_err(|e| invalid(format!("{}", e)))?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        Ok(())
    }

    /// Request settings derived from this config
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            base_url: self.provider.base_url.clone(),
            referer: self.provider.referer.clone(),
            title: self.provider.title.clone(),
            image_size: self.image.size.clone(),
            image_count: self.image.count,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    /// Generate example config content
    pub fn example() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Builder for creating Config programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.provider.base_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.provider.timeout_secs = secs;
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.studio.default_model = model.into();
        self
    }

    pub fn include_history(mut self, include: bool) -> Self {
        self.config.chat.include_history = include;
        self
    }

    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.config.code.default_language = language.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.studio.default_model, "mistral-7b-instruct");
        assert_eq!(config.code.default_language, "javascript");
        assert_eq!(config.image.size, "1024x1024");
        assert_eq!(config.image.count, 1);
        assert!(!config.chat.include_history);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .base_url("http://localhost:9000/v1")
            .default_model("deepseek-coder-33b")
            .include_history(true)
            .timeout_secs(30)
            .build();

        assert_eq!(config.request_options().base_url, "http://localhost:9000/v1");
        assert_eq!(config.studio.default_model, "deepseek-coder-33b");
        assert!(config.chat.include_history);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_example_config() {
        let example = Config::example();
        assert!(example.contains("[provider]"));
        assert!(example.contains("[image]"));
        assert!(!example.contains("api_key"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("code.default_language", "rust").unwrap();
        config.set("image.count", "2").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.code.default_language, "rust");
        assert_eq!(loaded.image.count, 2);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\ninclude_history = true\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.chat.include_history);
        assert_eq!(loaded.image.size, "1024x1024");
    }

    #[test]
    fn test_env_override_is_not_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save_to(&path).unwrap();

        std::env::set_var("OPENROUTER_BASE_URL", "http://override.local/v1");
        assert_eq!(
            Config::load_from(&path).unwrap().provider.base_url,
            "http://override.local/v1"
        );
        let mut stored = Config::read_file(&path).unwrap();
        stored.set("image.size", "512x512").unwrap();
        stored.save_to(&path).unwrap();
        std::env::remove_var("OPENROUTER_BASE_URL");

        let reloaded = Config::read_file(&path).unwrap();
        assert_eq!(reloaded.provider.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(reloaded.image.size, "512x512");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("code.default_language", "cobol"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("studio.default_model", "gpt-5"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("provider.timeout_secs", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("provider.api_key", "sk"),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
