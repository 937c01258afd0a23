//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default interval between alarm chimes
pub const DEFAULT_ALARM_INTERVAL: Duration = Duration::from_millis(2200);

/// Client configuration for the kitchen dashboard
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Request timeout in seconds (not applied to the live stream)
    pub timeout: u64,

    /// Acknowledgment file; `None` keeps acknowledgments in memory only
    pub ack_file: Option<PathBuf>,

    /// Acknowledgments older than this are evicted
    pub ack_retention_hours: i64,

    /// Interval between chimes while alarming
    pub alarm_interval: Duration,

    /// First reconnect delay after the live stream drops
    pub reconnect_initial: Duration,

    /// Upper bound for the reconnect delay
    pub reconnect_max: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            ack_file: None,
            ack_retention_hours: 48,
            alarm_interval: DEFAULT_ALARM_INTERVAL,
            reconnect_initial: Duration::from_millis(500),
            reconnect_max: Duration::from_secs(10),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Persist acknowledgments to `path`
    pub fn with_ack_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ack_file = Some(path.into());
        self
    }

    pub fn with_ack_retention_hours(mut self, hours: i64) -> Self {
        self.ack_retention_hours = hours;
        self
    }

    pub fn with_alarm_interval(mut self, interval: Duration) -> Self {
        self.alarm_interval = interval;
        self
    }

    /// Set reconnect backoff bounds
    pub fn with_reconnect(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_initial = initial;
        self.reconnect_max = max.max(initial);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
