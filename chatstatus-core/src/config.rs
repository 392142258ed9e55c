//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/chatstatus/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/chatstatus/` (~/.config/chatstatus/)
//! - Data: `$XDG_DATA_HOME/chatstatus/` (~/.local/share/chatstatus/)
//! - State/Logs: `$XDG_STATE_HOME/chatstatus/` (~/.local/state/chatstatus/)

use crate::error::{Error, Result};
use crate::recent::MAX_RECENT_CUSTOM_STATUSES;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Custom status feature settings
    #[serde(default)]
    pub status: StatusSettings,

    /// Identity used by the CLI
    #[serde(default)]
    pub user: UserConfig,

    /// Emoji catalog settings
    #[serde(default)]
    pub emoji: EmojiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Custom status feature settings
#[derive(Debug, Deserialize, Clone)]
pub struct StatusSettings {
    /// Enable/disable custom statuses
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether custom (server-uploaded) emojis may be used
    #[serde(default = "default_true")]
    pub custom_emoji_enabled: bool,

    /// IANA timezone for expiry computation and labels (defaults to UTC)
    pub timezone: Option<String>,

    /// Maximum number of recent statuses to keep
    #[serde(default = "default_max_recent")]
    pub max_recent: usize,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            custom_emoji_enabled: true,
            timezone: None,
            max_recent: default_max_recent(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_recent() -> usize {
    MAX_RECENT_CUSTOM_STATUSES
}

impl StatusSettings {
    /// Parsed timezone, UTC when unset
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        match self.timezone.as_deref() {
            None | Some("") => Ok(chrono_tz::UTC),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map_err(|_| Error::Config(format!("unknown timezone: {}", name))),
        }
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.max_recent == 0 {
            return Err(Error::Config(
                "status.max_recent must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Identity used by the CLI when no user is given on the command line
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    /// User ID
    #[serde(default = "default_user_id")]
    pub id: String,
    /// Username
    #[serde(default = "default_username")]
    pub username: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
            username: default_username(),
        }
    }
}

fn default_user_id() -> String {
    "me".to_string()
}

fn default_username() -> String {
    std::env::var("USER").unwrap_or_else(|_| "me".to_string())
}

/// Emoji catalog settings
#[derive(Debug, Deserialize, Default)]
pub struct EmojiConfig {
    /// Extra emojis (JSON array) loaded on top of the built-ins
    pub catalog_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.status.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/chatstatus/config.toml` (~/.config/chatstatus/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("chatstatus").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/chatstatus/` (~/.local/share/chatstatus/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("chatstatus")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/chatstatus/` (~/.local/state/chatstatus/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("chatstatus")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/chatstatus/data.db` (~/.local/share/chatstatus/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/chatstatus/chatstatus.log` (~/.local/state/chatstatus/chatstatus.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("chatstatus.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.status.enabled);
        assert!(config.status.custom_emoji_enabled);
        assert_eq!(config.status.max_recent, 27);
        assert_eq!(config.status.tz().unwrap(), chrono_tz::UTC);
        assert_eq!(config.user.id, "me");
        assert!(config.emoji.catalog_path.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[status]
enabled = true
custom_emoji_enabled = false
timezone = "America/New_York"
max_recent = 10

[user]
id = "u42"
username = "alice"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(!config.status.custom_emoji_enabled);
        assert_eq!(config.status.max_recent, 10);
        assert_eq!(config.status.tz().unwrap(), chrono_tz::America::New_York);
        assert_eq!(config.user.id, "u42");
        assert_eq!(config.user.username, "alice");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_status_settings_validation() {
        let settings = StatusSettings::default();
        assert!(settings.validate().is_ok());

        let settings = StatusSettings {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let settings = StatusSettings {
            max_recent: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[status]\ntimezone = \"Nowhere/Land\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "[status]\ntimezone = \"Asia/Tokyo\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.status.tz().unwrap(), chrono_tz::Asia::Tokyo);
    }
}
