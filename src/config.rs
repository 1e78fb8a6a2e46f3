//! Session and peer configuration.

use crate::session::{BoundedPoll, SessionConfig};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Settings shared by `serve` and `play`.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct DuelConfig {
    /// Host to bind or connect to: an IP address or `localhost`.
    #[serde(default = "default_host")]
    host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    port: u16,

    /// Where the server keeps its HTML snapshot page.
    #[serde(default = "default_state_path")]
    state_path: PathBuf,

    /// Poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// Silent poll cycles before the player to move is dropped.
    #[serde(default = "default_cycles")]
    idle_cycles: u32,

    /// Poll cycles in the rematch voting window.
    #[serde(default = "default_cycles")]
    vote_cycles: u32,

    /// Delay before a random peer plays, in milliseconds.
    #[serde(default = "default_think_time_ms")]
    think_time_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    12345
}

fn default_state_path() -> PathBuf {
    PathBuf::from("game_state.html")
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_cycles() -> u32 {
    10
}

fn default_think_time_ms() -> u64 {
    3000
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            state_path: default_state_path(),
            poll_interval_ms: default_poll_interval_ms(),
            idle_cycles: default_cycles(),
            vote_cycles: default_cycles(),
            think_time_ms: default_think_time_ms(),
        }
    }
}

impl DuelConfig {
    /// Lowest port accepted.
    pub const MIN_PORT: u16 = 1024;

    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {e}")))?;
        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks port range, host syntax and that polling makes progress.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port < Self::MIN_PORT {
            return Err(ConfigError::new(format!(
                "Port {} outside {}..=65535",
                self.port,
                Self::MIN_PORT
            )));
        }
        self.ip()?;
        if self.idle_cycles == 0 || self.vote_cycles == 0 {
            return Err(ConfigError::new("Cycle counts must be positive".to_string()));
        }
        Ok(())
    }

    fn ip(&self) -> Result<IpAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }
        self.host
            .parse()
            .map_err(|_| ConfigError::new(format!("Invalid host address: {:?}", self.host)))
    }

    /// Resolved socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.ip()?, self.port))
    }

    /// Coordinator settings derived from this configuration.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let interval = Duration::from_millis(self.poll_interval_ms);
        Ok(SessionConfig::new(
            self.socket_addr()?,
            BoundedPoll::new(interval, self.idle_cycles),
            BoundedPoll::new(interval, self.vote_cycles),
        ))
    }

    /// Think time as a duration.
    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_time_ms)
    }

    /// Overrides the host and revalidates.
    pub fn with_host(mut self, host: impl Into<String>) -> Result<Self, ConfigError> {
        self.host = host.into();
        self.validate()?;
        Ok(self)
    }

    /// Overrides the port and revalidates.
    pub fn with_port(mut self, port: u16) -> Result<Self, ConfigError> {
        self.port = port;
        self.validate()?;
        Ok(self)
    }

    /// Overrides the snapshot page location.
    pub fn with_state_path(mut self, state_path: impl Into<PathBuf>) -> Self {
        self.state_path = state_path.into();
        self
    }

    /// Overrides the think time.
    pub fn with_think_time_ms(mut self, think_time_ms: u64) -> Self {
        self.think_time_ms = think_time_ms;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
