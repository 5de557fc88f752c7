//! Runtime settings.
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional TOML file, then environment variables (`PRACTICUM_TOKEN`,
//! `TELEGRAM_TOKEN`, `TELEGRAM_CHAT_ID`, `RETRY_SECS`, ...). A `.env` file is
//! loaded into the environment by the binary before this runs.
//!
//! ```toml
//! endpoint = "https://practicum.yandex.ru/api/user_api/homework_statuses/"
//! retry_secs = 600
//! log_dir = "/var/log/reviewwatch"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use reviewwatch_adapters::practicum::DEFAULT_ENDPOINT;
use reviewwatch_adapters::telegram::DEFAULT_API_BASE;
use reviewwatch_types::Cursor;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "reviewwatch.toml";

/// Errors raised while loading or checking settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential is absent or empty.
    #[error("required setting {0} is missing or empty")]
    MissingCredential(&'static str),

    /// A setting has an unusable value.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    /// The configuration sources could not be read or deserialized.
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// All runtime settings.
#[derive(Clone, Deserialize)]
pub struct Settings {
    /// OAuth token for the status endpoint.
    #[serde(default)]
    pub practicum_token: String,

    /// Telegram bot token.
    #[serde(default)]
    pub telegram_token: String,

    /// Telegram chat that receives notifications.
    #[serde(default)]
    pub telegram_chat_id: String,

    /// Status endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Telegram Bot API base URL.
    #[serde(default = "default_telegram_api")]
    pub telegram_api: String,

    /// Seconds to sleep between cycles.
    #[serde(default = "default_retry_secs")]
    pub retry_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory for the rotating log file.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Initial cursor in Unix seconds; startup time when unset.
    #[serde(default)]
    pub from_date: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_telegram_api() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_retry_secs() -> u64 {
    6
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            practicum_token: String::new(),
            telegram_token: String::new(),
            telegram_chat_id: String::new(),
            endpoint: default_endpoint(),
            telegram_api: default_telegram_api(),
            retry_secs: default_retry_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            log_dir: default_log_dir(),
            from_date: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("practicum_token", &redact(&self.practicum_token))
            .field("telegram_token", &redact(&self.telegram_token))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("telegram_api", &self.telegram_api)
            .field("retry_secs", &self.retry_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_dir", &self.log_dir)
            .field("from_date", &self.from_date)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// The three values required before the loop may start.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

impl Settings {
    /// Load settings from `path` (or [`DEFAULT_CONFIG_FILE`] if it exists) and
    /// the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would make the loop misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "retry_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    /// Return the required credentials, or name the first one missing.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let required = [
            ("PRACTICUM_TOKEN", &self.practicum_token),
            ("TELEGRAM_TOKEN", &self.telegram_token),
            ("TELEGRAM_CHAT_ID", &self.telegram_chat_id),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingCredential(name));
            }
        }

        Ok(Credentials {
            practicum_token: self.practicum_token.trim().to_string(),
            telegram_token: self.telegram_token.trim().to_string(),
            telegram_chat_id: self.telegram_chat_id.trim().to_string(),
        })
    }

    /// Sleep between cycles.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_secs)
    }

    /// Timeout applied to every HTTP request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Cursor for the first fetch.
    pub fn initial_cursor(&self) -> Cursor {
        self.from_date
            .map(Cursor::from_secs)
            .unwrap_or_else(Cursor::now)
    }
}
