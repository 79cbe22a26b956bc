//! Configuration for the DonnyDB client
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{DonnyError, Result};

/// Default server host
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port
pub const DEFAULT_PORT: u16 = 1337;

/// Default per-read deadline
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(300);

/// Default upper bound on a GET payload (1 GiB)
pub const DEFAULT_MAX_VALUE_LEN: usize = 1024 * 1024 * 1024;

/// Main configuration for a client instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server host name or IP
    pub host: String,

    /// Server TCP port
    pub port: u16,

    /// Optional connect timeout. `None` leaves it to the OS.
    pub connect_timeout: Option<Duration>,

    /// Disable Nagle's algorithm on the socket
    pub nodelay: bool,

    // -------------------------------------------------------------------------
    // Request Configuration
    // -------------------------------------------------------------------------
    /// Deadline applied to each individual response read
    pub read_timeout: Duration,

    /// Largest GET payload the client will allocate for
    pub max_value_len: usize,

    /// What to do with the stream after a write or read fails
    pub desync_policy: DesyncPolicy,
}

/// Recovery policy after a write or read fails part-way (timeout, EOF, bad length)
///
/// The protocol has no correlation id, so any bytes still in flight would be
/// read as the start of the next response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DesyncPolicy {
    /// Refuse further requests on this connection (fail with `Desynchronized`)
    #[default]
    Poison,

    /// Keep using the stream as-is; later responses may be misread
    Tolerate,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            nodelay: true,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
            desync_policy: DesyncPolicy::Poison,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// `host:port` string used for logging and error reports
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the configuration is usable before any socket is opened
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(DonnyError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(DonnyError::Config("port must not be 0".to_string()));
        }
        if self.read_timeout.is_zero() {
            return Err(DonnyError::Config(
                "read timeout must be greater than zero".to_string(),
            ));
        }
        if matches!(self.connect_timeout, Some(t) if t.is_zero()) {
            return Err(DonnyError::Config(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_value_len == 0 {
            return Err(DonnyError::Config(
                "max value length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the per-read deadline
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Set the per-read deadline (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout = Duration::from_millis(ms);
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    /// Set the largest accepted GET payload (in bytes)
    pub fn max_value_len(mut self, len: usize) -> Self {
        self.config.max_value_len = len;
        self
    }

    /// Set the recovery policy for failed writes and reads
    pub fn desync_policy(mut self, policy: DesyncPolicy) -> Self {
        self.config.desync_policy = policy;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
