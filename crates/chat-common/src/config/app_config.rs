//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub hub: HubConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Broadcast hub and per-connection limits
///
/// `ping_period` is not configurable on its own: it is always 9/10 of
/// `pong_wait` so that a probe lands before the peer's read deadline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HubConfig {
    /// Largest inbound frame accepted from a peer, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Time allowed to read the next pong from the peer
    #[serde(default = "default_pong_wait_secs")]
    pub pong_wait_secs: u64,
    /// Time allowed to write a frame to the peer
    #[serde(default = "default_write_wait_secs")]
    pub write_wait_secs: u64,
    /// Capacity of each connection's outbound queue
    #[serde(default = "default_send_buffer")]
    pub send_buffer: usize,
    /// Capacity of the hub's broadcast inbox
    #[serde(default = "default_inbox_buffer")]
    pub inbox_buffer: usize,
}

impl HubConfig {
    #[must_use]
    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_secs)
    }

    #[must_use]
    pub fn ping_period(&self) -> Duration {
        self.pong_wait() * 9 / 10
    }

    #[must_use]
    pub fn write_wait(&self) -> Duration {
        Duration::from_secs(self.write_wait_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("HUB_MAX_MESSAGE_SIZE", self.max_message_size == 0),
            ("HUB_PONG_WAIT_SECS", self.pong_wait_secs == 0),
            ("HUB_WRITE_WAIT_SECS", self.write_wait_secs == 0),
            ("HUB_SEND_BUFFER", self.send_buffer == 0),
            ("HUB_INBOX_BUFFER", self.inbox_buffer == 0),
        ];

        match checks.into_iter().find(|(_, zero)| *zero) {
            Some((key, _)) => Err(ConfigError::InvalidValue(key, "must be greater than zero".to_string())),
            None => Ok(()),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_message_size: default_max_message_size(),
            pong_wait_secs: default_pong_wait_secs(),
            write_wait_secs: default_write_wait_secs(),
            send_buffer: default_send_buffer(),
            inbox_buffer: default_inbox_buffer(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "chat-hub".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_message_size() -> usize {
    512
}

fn default_pong_wait_secs() -> u64 {
    60
}

fn default_write_wait_secs() -> u64 {
    10
}

fn default_send_buffer() -> usize {
    256
}

fn default_inbox_buffer() -> usize {
    1024
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be used
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(value) => Environment::parse(&value)
                .ok_or(ConfigError::InvalidValue("APP_ENV", value))?,
            None => default_env(),
        };

        let config = Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            server: ServerConfig {
                host: lookup("HUB_HOST").unwrap_or_else(default_host),
                port: parse_or(&lookup, "HUB_PORT", default_port)?,
            },
            hub: HubConfig {
                max_message_size: parse_or(&lookup, "HUB_MAX_MESSAGE_SIZE", default_max_message_size)?,
                pong_wait_secs: parse_or(&lookup, "HUB_PONG_WAIT_SECS", default_pong_wait_secs)?,
                write_wait_secs: parse_or(&lookup, "HUB_WRITE_WAIT_SECS", default_write_wait_secs)?,
                send_buffer: parse_or(&lookup, "HUB_SEND_BUFFER", default_send_buffer)?,
                inbox_buffer: parse_or(&lookup, "HUB_INBOX_BUFFER", default_inbox_buffer)?,
            },
        };

        config.hub.validate()?;
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(default());
    };

    match raw.trim().parse() {
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::InvalidValue(key, raw)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
