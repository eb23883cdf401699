//! Session configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a Workbench session
///
/// Controls where the process starts, which installed version launches,
/// and the timing bounds around startup and teardown.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory the Workbench process starts in; the handshake file is
    /// written here
    pub work_dir: PathBuf,

    /// Workbench version identifier (2019R1 = 190, 2020R1 = 201,
    /// 2021R1 = 211)
    pub version: u32,

    /// Whether to display the Workbench interface
    pub interactive: bool,

    /// Inclusive TCP range the server searches for a free port
    pub port_range: (u16, u16),

    /// Delay between handshake-file polls during startup
    pub poll_interval: Duration,

    /// Upper bound on waiting for the server to report its address
    pub handshake_timeout: Duration,

    /// Optional bound on each command exchange; `None` leaves the OS
    /// socket defaults in place
    pub exchange_timeout: Option<Duration>,

    /// Backoff between temp-directory removal attempts during forced
    /// teardown
    pub cleanup_retry_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            version: 201,
            interactive: true,
            port_range: (9000, 9200),
            poll_interval: Duration::from_millis(500),
            handshake_timeout: Duration::from_secs(120),
            exchange_timeout: None,
            cleanup_retry_delay: Duration::from_secs(2),
        }
    }
}

impl SessionConfig {
    /// Create a new session config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory the Workbench process starts in
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Set the Workbench version identifier
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set whether the Workbench interface is displayed
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Set the inclusive TCP port-search range
    pub fn with_port_range(mut self, start: u16, end: u16) -> Self {
        self.port_range = (start, end);
        self
    }

    /// Set the delay between handshake-file polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the upper bound on waiting for the server address
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Bound each command exchange
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = Some(timeout);
        self
    }

    /// Set the backoff between removal attempts during forced teardown
    pub fn with_cleanup_retry_delay(mut self, delay: Duration) -> Self {
        self.cleanup_retry_delay = delay;
        self
    }
}
