//! Runtime configuration for the order tracker.
//!
//! [`TrackerConfig::default`] matches the reference deployment (service on
//! `localhost:8082`, two second polling). [`TrackerConfig::from_env`] layers
//! environment overrides on top.

use std::time::Duration;

/// Base URL of the orders resource.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8082/orders";

/// Delay between two status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Shortest accepted poll interval; shorter values are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Bound on the order submission request.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_ENDPOINT: &str = "ORDER_TRACKER_ENDPOINT";
pub const ENV_POLL_INTERVAL_MS: &str = "ORDER_TRACKER_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "ORDER_TRACKER_REQUEST_TIMEOUT_MS";
pub const ENV_SUBMIT_TIMEOUT_MS: &str = "ORDER_TRACKER_SUBMIT_TIMEOUT_MS";
pub const ENV_MAX_POLL_FAILURES: &str = "ORDER_TRACKER_MAX_POLL_FAILURES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Orders resource: `POST` here to submit, `GET <endpoint>/<id>` to poll.
    pub endpoint: String,
    pub poll_interval: Duration,
    /// Bound on a single status fetch. `None` means "one poll interval".
    pub request_timeout: Option<Duration>,
    pub submit_timeout: Duration,
    /// Stop polling after this many failed fetches in a row. `None` polls forever.
    pub max_consecutive_poll_failures: Option<u32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: None,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            max_consecutive_poll_failures: None,
        }
    }
}

impl TrackerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `ORDER_TRACKER_ENDPOINT`: orders resource URL
    /// - `ORDER_TRACKER_POLL_INTERVAL_MS`: poll interval (0 is raised to 1 ms)
    /// - `ORDER_TRACKER_REQUEST_TIMEOUT_MS`: status fetch timeout
    /// - `ORDER_TRACKER_SUBMIT_TIMEOUT_MS`: submission timeout
    /// - `ORDER_TRACKER_MAX_POLL_FAILURES`: consecutive failures before polling is abandoned
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |key: &str| {
            lookup(key)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
        };
        let defaults = Self::default();

        Self {
            endpoint: lookup(ENV_ENDPOINT)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.endpoint),
            poll_interval: millis(ENV_POLL_INTERVAL_MS)
                .map(|interval| interval.max(MIN_POLL_INTERVAL))
                .unwrap_or(defaults.poll_interval),
            request_timeout: millis(ENV_REQUEST_TIMEOUT_MS).filter(|timeout| !timeout.is_zero()),
            submit_timeout: millis(ENV_SUBMIT_TIMEOUT_MS)
                .filter(|timeout| !timeout.is_zero())
                .unwrap_or(defaults.submit_timeout),
            max_consecutive_poll_failures: lookup(ENV_MAX_POLL_FAILURES)
                .and_then(|value| value.trim().parse::<u32>().ok())
                .filter(|limit| *limit > 0),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Bounds consecutive poll failures. `0` means no bound, as in the environment.
    pub fn with_max_consecutive_poll_failures(mut self, limit: u32) -> Self {
        self.max_consecutive_poll_failures = (limit > 0).then_some(limit);
        self
    }

    /// Timeout applied to each status fetch.
    pub fn effective_request_timeout(&self) -> Duration {
        self.request_timeout.unwrap_or(self.poll_interval)
    }
}
