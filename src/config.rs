//! Configuration loading for Parley.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::command::DEFAULT_COMMAND_PREFIX;
use crate::core::DEFAULT_CHANNEL_BUFFER;
use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Environment variable that overrides `telegram.bot_token`.
pub const TELEGRAM_TOKEN_ENV: &str = "PARLEY_TELEGRAM_TOKEN";

/// Get the Parley home directory (~/.parley).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".parley"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.parley/settings.json
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

/// Load settings from an explicit file, applying environment overrides.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let mut settings: Settings = serde_json::from_str(&content)?;
    settings.apply_env();
    settings.validate()?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings or return default if not found.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        let mut settings = Settings::default();
        settings.apply_env();
        settings
    })
}

/// Which optional commands are registered.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Features {
    pub discussion_queue: bool,
    pub meme_stash: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            discussion_queue: true,
            meme_stash: true,
        }
    }
}

/// Telegram transport configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
}

/// Parley settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default = "default_command_prefix")]
    pub command_prefix: char,

    /// Commands that may wait for the worker before producers block.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer: usize,

    /// Where snapshots and logs are written. Defaults to ~/.parley/store.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub features: Features,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

fn default_command_prefix() -> char {
    DEFAULT_COMMAND_PREFIX
}

fn default_channel_buffer() -> usize {
    DEFAULT_CHANNEL_BUFFER
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            channel_buffer: default_channel_buffer(),
            data_dir: None,
            features: Features::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Settings {
    /// Resolved data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(get_home_dir()?.join("store")),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let c = self.command_prefix;
        if !c.is_ascii() || c.is_ascii_whitespace() || c.is_ascii_control() {
            return Err(Error::Config(format!(
                "command_prefix {:?} must be a single visible ASCII character",
                c
            )));
        }
        if self.channel_buffer == 0 {
            return Err(Error::Config("channel_buffer must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Pull overrides from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TELEGRAM_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.telegram.bot_token = Some(token);
            }
        }
    }

    pub fn telegram_token(&self) -> Result<String> {
        self.telegram
            .bot_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "No Telegram bot token configured. Set telegram.bot_token or {}",
                    TELEGRAM_TOKEN_ENV
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.command_prefix, '&');
        assert_eq!(settings.channel_buffer, 15);
        assert!(settings.features.discussion_queue);
        assert!(settings.features.meme_stash);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "command_prefix": "!", "features": { "meme_stash": false }, "data_dir": "/tmp/parley" }"#,
        )
        .unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.command_prefix, '!');
        assert_eq!(settings.channel_buffer, 15);
        assert!(settings.features.discussion_queue);
        assert!(!settings.features.meme_stash);
        assert_eq!(settings.data_dir().unwrap(), PathBuf::from("/tmp/parley"));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings {
            command_prefix: ' ',
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        settings.command_prefix = 'é';
        assert!(settings.validate().is_err());

        settings.command_prefix = '$';
        settings.channel_buffer = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_settings_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_token_required() {
        let mut settings = Settings::default();
        settings.telegram.bot_token = Some("  ".to_string());
        assert!(settings.telegram_token().is_err());

        settings.telegram.bot_token = Some("123:abc".to_string());
        assert_eq!(settings.telegram_token().unwrap(), "123:abc");
    }
}
