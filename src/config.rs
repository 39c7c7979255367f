//! Configuration for StrataKV clients
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

/// Default service locator used when none is configured.
pub const DEFAULT_LOCATOR: &str = "tcp:host=127.0.0.1,port=12242";

/// Configuration for a StrataKV client session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Session Configuration
    // -------------------------------------------------------------------------
    /// Service locator of the cluster coordinator
    /// (opaque to the core; interpreted by the transport layer)
    pub locator: String,

    /// Timeout for establishing the session
    pub connect_timeout: Duration,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Socket read timeout (0 disables)
    pub read_timeout_ms: u64,

    /// Socket write timeout (0 disables)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm for low latency
    pub nodelay: bool,

    // -------------------------------------------------------------------------
    // Object Read Configuration
    // -------------------------------------------------------------------------
    /// Max object size accepted by a read, offered to the service as the
    /// read buffer bound (in bytes)
    pub max_read_len: u32,

    /// Default timeout for liveness probes
    pub ping_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locator: DEFAULT_LOCATOR.to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            nodelay: true,
            max_read_len: 2 * 1024 * 1024, // 2 MiB
            ping_timeout: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the service locator
    pub fn locator(mut self, locator: impl Into<String>) -> Self {
        self.config.locator = locator.into();
        self
    }

    /// Set the session establishment timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the socket read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the socket write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable Nagle's algorithm
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    /// Set the read buffer bound (in bytes)
    pub fn max_read_len(mut self, len: u32) -> Self {
        self.config.max_read_len = len;
        self
    }

    /// Set the default liveness probe timeout
    pub fn ping_timeout(mut self, timeout: Duration) -> Self {
        self.config.ping_timeout = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
