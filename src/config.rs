//! Client configuration.

use std::time::Duration;

use log::debug;

use crate::error::{Result, WaldurError};
use crate::runtime::Runtime;

/// Version reported in the default user agent.
pub const VERSION: &str = env!("WALDUR_CLIENT_VERSION");

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_CONFLICT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Env var toggling TLS certificate verification.
pub const VERIFY_SSL_ENV: &str = "REQUESTS_VERIFY_SSL";
/// Env var holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "REQUESTS_TIMEOUT";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub access_token: String,
    pub user_agent: Option<String>,
    pub verify_ssl: bool,
    pub timeout: Duration,
    /// Pause before re-sending a request answered with `409 Conflict`.
    pub conflict_retry_delay: Duration,
    pub page_size: u32,
}

impl ClientConfig {
    /// `api_url` is the fully qualified API root, e.g. `https://waldur.example.com/api`.
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            access_token: access_token.into(),
            user_agent: Some(format!("waldur-client/{}", VERSION)),
            verify_ssl: true,
            timeout: DEFAULT_TIMEOUT,
            conflict_retry_delay: DEFAULT_CONFLICT_RETRY_DELAY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_conflict_retry_delay(mut self, delay: Duration) -> Self {
        self.conflict_retry_delay = delay;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Applies `REQUESTS_VERIFY_SSL` and `REQUESTS_TIMEOUT` when they are set.
    pub fn apply_env<R: Runtime + ?Sized>(mut self, runtime: &R) -> Result<Self> {
        if let Ok(value) = runtime.env_var(VERIFY_SSL_ENV) {
            self.verify_ssl = parse_bool(&value);
            debug!("TLS verification set to {} from {}", self.verify_ssl, VERIFY_SSL_ENV);
        }

        if let Ok(value) = runtime.env_var(TIMEOUT_ENV) {
            let seconds: u64 = value.trim().parse().map_err(|_| {
                WaldurError::Validation(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    TIMEOUT_ENV, value
                ))
            })?;
            self.timeout = Duration::from_secs(seconds);
            debug!("Request timeout set to {}s from {}", seconds, TIMEOUT_ENV);
        }

        Ok(self)
    }
}

/// Anything but `false`, `no` or `0` (case-insensitive) is true.
pub fn parse_bool(value: &str) -> bool {
    !matches!(value.to_lowercase().as_str(), "false" | "no" | "0")
}
