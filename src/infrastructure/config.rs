// src/infrastructure/config.rs
use crate::constants::{
    ANKI_CONNECT_URL, BRIDGE_TIMEOUT_MS, DEFAULT_ALLOWED_ORIGINS, DEFAULT_DECK, DEFAULT_GAME_TAG,
    DEFAULT_MODEL, DEFAULT_PAGE_ORIGIN, REQUEST_TIMEOUT_MS,
};
use crate::domain::{NoteTemplate, OriginGuard};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// TOML configuration for the bridge
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub anki: AnkiConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AnkiConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_deck")]
    pub deck: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_game_tag")]
    pub game_tag: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BridgeConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Origin the CLI acts as when posting to the bridge
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

// Default value functions
fn default_url() -> String { ANKI_CONNECT_URL.to_string() }
fn default_deck() -> String { DEFAULT_DECK.to_string() }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_game_tag() -> String { DEFAULT_GAME_TAG.to_string() }
fn default_request_timeout_ms() -> u64 { REQUEST_TIMEOUT_MS }
fn default_allowed_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
}
fn default_origin() -> String { DEFAULT_PAGE_ORIGIN.to_string() }
fn default_timeout_ms() -> u64 { BRIDGE_TIMEOUT_MS }

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            deck: default_deck(),
            model: default_model(),
            game_tag: default_game_tag(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            origin: default_origin(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load the given file, else the default location if it exists, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                debug!(?path, "Using default config file");
                Self::load(path)
            }
            _ => {
                debug!("No config file, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    pub fn origin_guard(&self) -> OriginGuard {
        OriginGuard::new(self.bridge.allowed_origins.iter().cloned())
    }

    pub fn note_template(&self) -> NoteTemplate {
        NoteTemplate {
            deck: self.anki.deck.clone(),
            model: self.anki.model.clone(),
            game_tag: self.anki.game_tag.clone(),
        }
    }

    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_millis(self.bridge.timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.anki.request_timeout_ms)
    }
}

/// `<config_dir>/ankibridge/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ankibridge").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_no_file_when_creating_default_then_creates_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::create_default(&config_path).unwrap();

        assert_eq!(config.anki.url, "http://localhost:8765");
        assert_eq!(config.anki.deck, "Addition");
        assert_eq!(config.bridge.allowed_origins.len(), 3);
        assert!(config_path.exists());
    }

    #[test]
    fn given_partial_toml_when_loading_then_missing_fields_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[anki]
deck = "Kids::Addition"

[bridge]
allowed_origins = ["http://127.0.0.1:5173"]
timeout_ms = 250
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.anki.deck, "Kids::Addition");
        assert_eq!(config.anki.model, "Basic");
        assert_eq!(config.bridge.timeout_ms, 250);
        assert_eq!(config.bridge.origin, "http://localhost:3000");
        assert!(config.origin_guard().is_allowed("http://127.0.0.1:5173"));
        assert!(!config.origin_guard().is_allowed("http://localhost:3000"));
        assert_eq!(config.note_template().deck, "Kids::Addition");
    }

    #[test]
    fn given_saved_config_when_loading_then_equal() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let mut config = Config::default();
        config.anki.game_tag = "sums".to_string();

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn given_invalid_toml_when_loading_then_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[anki\nurl = ").unwrap();

        let result = Config::load(&config_path);

        assert!(result.is_err());
    }

    #[test]
    fn given_explicit_missing_path_when_resolving_then_error() {
        let temp_dir = TempDir::new().unwrap();
        let absent = temp_dir.path().join("absent.toml");

        let result = Config::resolve(Some(absent.as_path()));

        assert!(result.is_err());
    }
}
