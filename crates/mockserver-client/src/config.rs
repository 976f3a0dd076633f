//! Client configuration.

use crate::path::{join_paths, normalize_context_path};
use std::time::Duration;

/// Fixed path segment every MockServer control endpoint lives under.
pub const BASE_PATH: &str = "/mockserver";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1080;

/// Bounded retry loop: at most `attempts` tries, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Upper bound on the time spent sleeping by this policy.
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.attempts.saturating_sub(1))
    }
}

/// Where the server lives and how the client waits on it.
///
/// Values are supplied by the caller; nothing is read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Path the server is mounted under, normalized on use
    pub context_path: String,
    pub secure: bool,
    pub request_timeout: Duration,
    /// Polling policy used by `is_running()`
    pub status_check: PollPolicy,
    /// How long `stop()` waits for the server to go away
    pub stop_poll: PollPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            context_path: String::new(),
            secure: false,
            request_timeout: Duration::from_secs(10),
            status_check: PollPolicy::new(10, Duration::from_millis(500)),
            stop_poll: PollPolicy::new(10, Duration::from_secs(5)),
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_status_check(mut self, attempts: u32, interval: Duration) -> Self {
        self.status_check = PollPolicy::new(attempts, interval);
        self
    }

    pub fn with_stop_poll(mut self, attempts: u32, interval: Duration) -> Self {
        self.stop_poll = PollPolicy::new(attempts, interval);
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// Value sent in the `Host` header.
    pub fn host_header(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `{scheme}://{host}:{port}{context_path}/mockserver`
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}{}",
            self.scheme(),
            self.host_header(),
            join_paths(&normalize_context_path(&self.context_path), BASE_PATH)
        )
    }

    /// Full URL of a control endpoint such as `/expectation`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        join_paths(&self.base_url(), endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1080);
        assert_eq!(config.stop_poll.interval, Duration::from_secs(5));
        assert_eq!(config.base_url(), "http://localhost:1080/mockserver");
    }

    #[test]
    fn test_endpoint_url_without_context_path() {
        let config = ClientConfig::new("h", 80);
        assert_eq!(
            config.endpoint_url("/expectation"),
            "http://h:80/mockserver/expectation"
        );
        assert_eq!(
            config.endpoint_url("expectation"),
            "http://h:80/mockserver/expectation"
        );
    }

    #[test]
    fn test_endpoint_url_with_context_path_variants() {
        for context_path in ["ctx", "/ctx", "ctx/", "/ctx/", "//ctx//"] {
            let config = ClientConfig::new("h", 80).with_context_path(context_path);
            assert_eq!(
                config.endpoint_url("/expectation"),
                "http://h:80/ctx/mockserver/expectation",
                "context path {context_path:?}"
            );
        }
        let nested = ClientConfig::new("h", 8080).with_context_path("/a/b/");
        assert_eq!(
            nested.endpoint_url("/status"),
            "http://h:8080/a/b/mockserver/status"
        );
    }

    #[test]
    fn test_secure_scheme_and_host_header() {
        let config = ClientConfig::new("mock.local", 443).with_secure(true);
        assert_eq!(
            config.endpoint_url("/reset"),
            "https://mock.local:443/mockserver/reset"
        );
        assert_eq!(config.host_header(), "mock.local:443");
    }

    #[test]
    fn test_poll_policy_max_wait() {
        assert_eq!(
            PollPolicy::new(10, Duration::from_secs(5)).max_wait(),
            Duration::from_secs(45)
        );
        assert_eq!(
            PollPolicy::new(0, Duration::from_secs(5)).max_wait(),
            Duration::ZERO
        );
    }
}
