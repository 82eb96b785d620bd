//! Configuration types for the APRS client.

use crate::endpoint::{Credentials, Server};
use crate::errors::OgnClientError;
use crate::reconnect::Backoff;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete APRS client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server address.
    #[serde(default)]
    pub server: ServerConfig,
    /// Login settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Reconnection settings.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Read, keepalive and connect timings.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server hostname or IP address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (10152 is the full OGN feed, 14580 the filtered one).
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "aprs.glidernet.org".to_string()
}

fn default_port() -> u16 {
    10152
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Login configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Call sign.
    #[serde(default = "default_username")]
    pub username: String,
    /// APRS passcode. `-1` requests a read-only login.
    #[serde(default = "default_password")]
    pub password: String,
    /// Server-side filter, e.g. `filter r/48.0/11.0/100`.
    #[serde(default)]
    pub filter: String,
}

fn default_username() -> String {
    "N0CALL".to_string()
}

fn default_password() -> String {
    aprs_protocol::handshake::NO_PASSCODE.to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            filter: String::new(),
        }
    }
}

/// Reconnection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Enable automatic reconnection.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of dial attempts after a session failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial backoff duration in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Maximum backoff duration in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    6
}

fn default_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Deadline for a single read attempt, in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Interval between `#keepalive` lines, in milliseconds.
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
    /// Deadline for TCP connect plus login, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_read_timeout_ms() -> u64 {
    15_000
}

fn default_keepalive_interval_ms() -> u64 {
    180_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), OgnClientError> {
        if self.server.host.is_empty() {
            return Err(OgnClientError::Config("Host cannot be empty".to_string()));
        }

        if self.server.port == 0 {
            return Err(OgnClientError::Config("Port cannot be 0".to_string()));
        }

        if self.auth.username.is_empty() {
            return Err(OgnClientError::Config("Username cannot be empty".to_string()));
        }

        if self.timeouts.read_timeout_ms == 0
            || self.timeouts.keepalive_interval_ms == 0
            || self.timeouts.connect_timeout_ms == 0
        {
            return Err(OgnClientError::Config(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        if self.reconnect.enabled && self.reconnect.max_retries == 0 {
            return Err(OgnClientError::Config(
                "max_retries must be at least 1 when reconnect is enabled".to_string(),
            ));
        }

        if self.reconnect.max_backoff_ms < self.reconnect.backoff_ms {
            return Err(OgnClientError::Config(
                "max_backoff_ms cannot be smaller than backoff_ms".to_string(),
            ));
        }

        Ok(())
    }

    /// Parses a TOML document. Missing sections and keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`OgnClientError::Config`] if the document cannot be parsed.
    pub fn from_toml_str(s: &str) -> Result<Self, OgnClientError> {
        toml::from_str(s)
            .map_err(|e| OgnClientError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Loads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`OgnClientError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OgnClientError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OgnClientError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`OgnClientError::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, OgnClientError> {
        toml::to_string(self)
            .map_err(|e| OgnClientError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Server address to dial.
    #[must_use]
    pub fn server(&self) -> Server {
        Server::new(self.server.host.clone(), self.server.port)
    }

    /// Login credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.auth.username.clone(),
            self.auth.password.clone(),
            self.auth.filter.clone(),
        )
    }

    /// Reconnect backoff schedule.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.reconnect.backoff_ms),
            Duration::from_millis(self.reconnect.max_backoff_ms),
            self.reconnect.max_retries,
        )
    }

    /// Returns the per-read deadline.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.read_timeout_ms)
    }

    /// Returns the keepalive interval.
    #[must_use]
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.timeouts.keepalive_interval_ms)
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.connect_timeout_ms)
    }
}

/// Builder for creating a `Config`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Starts from an existing configuration, e.g. one loaded from a file.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Sets the server hostname or IP address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Sets the server port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Sets the call sign.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.auth.username = username.into();
        self
    }

    /// Sets the APRS passcode.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.auth.password = password.into();
        self
    }

    /// Sets the server-side filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.config.auth.filter = filter.into();
        self
    }

    /// Enables or disables automatic reconnection.
    #[must_use]
    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.config.reconnect.enabled = enabled;
        self
    }

    /// Sets the maximum number of reconnection attempts.
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.reconnect.max_retries = max_retries;
        self
    }

    /// Sets the initial and maximum backoff.
    #[must_use]
    pub fn backoff(mut self, base: Duration, max: Duration) -> Self {
        self.config.reconnect.backoff_ms = duration_ms(base);
        self.config.reconnect.max_backoff_ms = duration_ms(max);
        self
    }

    /// Sets the per-read deadline.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeouts.read_timeout_ms = duration_ms(timeout);
        self
    }

    /// Sets the keepalive interval.
    #[must_use]
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.config.timeouts.keepalive_interval_ms = duration_ms(interval);
        self
    }

    /// Sets the connect and login deadline.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeouts.connect_timeout_ms = duration_ms(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Config, OgnClientError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
