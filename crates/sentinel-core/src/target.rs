//! Probe Target
//!
//! The immutable description of what to monitor and how often.

use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while building a [`ProbeTarget`] or its HTTP client
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Check interval must be greater than zero")]
    ZeroInterval,

    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// The monitored endpoint and its timing parameters
///
/// Built once at startup and never mutated. Construction validates every
/// field, so a `ProbeTarget` in hand is always usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    url: Url,

    /// Time between ticks
    ///
    /// **Default:** 5s
    check_interval: Duration,

    /// Upper bound for a single probe
    ///
    /// **Default:** 5s
    request_timeout: Duration,
}

impl ProbeTarget {
    pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a validated target
    ///
    /// The URL must parse and use the `http` or `https` scheme; both
    /// durations must be non-zero.
    pub fn new(
        url: &str,
        check_interval: Duration,
        request_timeout: Duration,
    ) -> Result<Self, TargetError> {
        let parsed = Url::parse(url).map_err(|e| TargetError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TargetError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if check_interval.is_zero() {
            return Err(TargetError::ZeroInterval);
        }

        if request_timeout.is_zero() {
            return Err(TargetError::ZeroTimeout);
        }

        Ok(Self {
            url: parsed,
            check_interval,
            request_timeout,
        })
    }

    /// Create a target with the default interval and timeout
    pub fn with_defaults(url: &str) -> Result<Self, TargetError> {
        Self::new(
            url,
            Self::DEFAULT_CHECK_INTERVAL,
            Self::DEFAULT_REQUEST_TIMEOUT,
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL as used for metric labels
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// True when a probe may outlast the interval, so some ticks will be skipped
    pub fn timeout_exceeds_interval(&self) -> bool {
        self.request_timeout > self.check_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target() {
        let target = ProbeTarget::with_defaults("https://google.com").unwrap();

        assert_eq!(target.check_interval(), Duration::from_secs(5));
        assert_eq!(target.request_timeout(), Duration::from_secs(5));
        assert_eq!(target.url().host_str(), Some("google.com"));
        assert!(!target.timeout_exceeds_interval());
    }

    #[test]
    fn test_url_is_normalized() {
        let target = ProbeTarget::with_defaults("http://example.com").unwrap();
        assert_eq!(target.url_str(), "http://example.com/");
    }

    #[test]
    fn test_validation_failures() {
        let secs = Duration::from_secs(1);

        assert!(matches!(
            ProbeTarget::new("not a url", secs, secs),
            Err(TargetError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ProbeTarget::new("ftp://example.com", secs, secs),
            Err(TargetError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ProbeTarget::new("http://example.com", Duration::ZERO, secs),
            Err(TargetError::ZeroInterval)
        ));
        assert!(matches!(
            ProbeTarget::new("http://example.com", secs, Duration::ZERO),
            Err(TargetError::ZeroTimeout)
        ));
    }

    #[test]
    fn test_timeout_exceeds_interval() {
        let target = ProbeTarget::new(
            "http://example.com",
            Duration::from_millis(100),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(target.timeout_exceeds_interval());
    }

    #[test]
    fn test_error_messages() {
        let err = ProbeTarget::new(
            "ftp://example.com",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }
}
