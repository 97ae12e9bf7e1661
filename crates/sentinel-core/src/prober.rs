//! Prober: one bounded reachability check
//!
//! The prober issues a single GET against the target and turns whatever
//! happens into a [`ProbeResult`]. Network failures are data here, never
//! errors: the caller always gets a result back within the request timeout.
//!
//! Classification ignores the HTTP status code. Any response that arrives,
//! including a 5xx, counts as UP; only transport failures (refused
//! connection, DNS, TLS, timeout) count as DOWN.

use crate::target::{ProbeTarget, TargetError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Detail recorded for a probe abandoned by shutdown
pub const CANCELLED: &str = "probe cancelled by shutdown";

/// How a probe ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeOutcome {
    /// A response was received
    Up,

    /// No response; `error` is never empty
    Down { error: String },
}

/// Outcome of one probe attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// When the probe finished
    pub timestamp: DateTime<Utc>,

    /// Wall time from dispatch until the outcome was known
    pub elapsed: Duration,

    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn up(elapsed: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            elapsed,
            outcome: ProbeOutcome::Up,
        }
    }

    pub fn down(elapsed: Duration, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown transport error".to_string();
        }

        Self {
            timestamp: Utc::now(),
            elapsed,
            outcome: ProbeOutcome::Down { error },
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Up)
    }

    /// Latency of a successful probe; `None` when the target was down
    pub fn latency(&self) -> Option<Duration> {
        match self.outcome {
            ProbeOutcome::Up => Some(self.elapsed),
            ProbeOutcome::Down { .. } => None,
        }
    }

    /// Failure detail; `None` when the target was up
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Up => None,
            ProbeOutcome::Down { error } => Some(error),
        }
    }
}

/// Executes a single check against a target
///
/// Implementations must return within the target's request timeout (plus
/// scheduling overhead), must not touch shared state, and must release any
/// network resource before returning.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &ProbeTarget, cancel: &CancellationToken) -> ProbeResult;
}

/// HTTP GET prober backed by a pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// Build a prober whose client enforces `request_timeout`
    pub fn new(request_timeout: Duration) -> Result<Self, TargetError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout)
            .user_agent(concat!("net-sentinel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    pub fn for_target(target: &ProbeTarget) -> Result<Self, TargetError> {
        Self::new(target.request_timeout())
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &ProbeTarget, cancel: &CancellationToken) -> ProbeResult {
        let timeout = target.request_timeout();
        debug!("Probing {} (timeout {:?})", target.url(), timeout);

        let url = target.url().clone();
        let request = self.client.get(url).timeout(timeout).send();

        let start = Instant::now();

        // Outer deadline also bounds DNS resolution.
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CANCELLED.to_string()),
            sent = tokio::time::timeout(timeout, request) => match sent {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(e)) => Err(describe_error(&e)),
                Err(_) => Err(format!("request timed out after {:?}", timeout)),
            },
        };

        let elapsed = start.elapsed();

        match response {
            Ok(response) => {
                let status = response.status();
                // Dropping the unread body hands the connection back (or closes it).
                drop(response);
                debug!("{} answered {} in {:?}", target.url(), status, elapsed);
                ProbeResult::up(elapsed)
            }
            Err(err) => {
                debug!("{} unreachable after {:?}: {}", target.url(), elapsed, err);
                ProbeResult::down(elapsed, err)
            }
        }
    }
}

/// Flatten an error and its sources into one line
fn describe_error(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn spawn_server(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn refused_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    fn target(addr: SocketAddr, path: &str, timeout: Duration) -> ProbeTarget {
        ProbeTarget::new(
            &format!("http://{}{}", addr, path),
            Duration::from_secs(1),
            timeout,
        )
        .unwrap()
    }

    #[test]
    fn test_result_accessors() {
        let up = ProbeResult::up(Duration::from_millis(7));
        assert!(up.is_up());
        assert_eq!(up.latency(), Some(Duration::from_millis(7)));
        assert_eq!(up.error(), None);

        let down = ProbeResult::down(Duration::from_millis(3), "connection refused");
        assert!(!down.is_up());
        assert_eq!(down.latency(), None);
        assert_eq!(down.error(), Some("connection refused"));
    }

    #[test]
    fn test_down_never_has_empty_error() {
        let down = ProbeResult::down(Duration::ZERO, "  ");
        assert!(!down.error().unwrap().trim().is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let down = ProbeResult::down(Duration::ZERO, "boom");
        let json = serde_json::to_value(&down.outcome).unwrap();
        assert_eq!(json["status"], "down");
        assert_eq!(json["error"], "boom");
    }

    #[tokio::test]
    async fn test_probe_up() {
        let router = Router::new().route("/", get(|| async { "ok" }));
        let addr = spawn_server(router).await;
        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();

        let target = target(addr, "/", Duration::from_secs(2));
        let result = prober.probe(&target, &CancellationToken::new()).await;

        assert!(result.is_up(), "expected up, got {:?}", result);
        assert!(result.latency().unwrap() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_error_status_counts_as_up() {
        let router = Router::new().route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "nope") }),
        );
        let addr = spawn_server(router).await;
        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();

        let target = target(addr, "/broken", Duration::from_secs(2));
        let result = prober.probe(&target, &CancellationToken::new()).await;

        assert!(result.is_up());
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        let addr = refused_addr().await;
        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();

        let target = target(addr, "/", Duration::from_secs(2));
        let result = prober.probe(&target, &CancellationToken::new()).await;

        assert!(!result.is_up());
        assert!(!result.error().unwrap().is_empty());
        assert_eq!(result.latency(), None);
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "late"
            }),
        );
        let addr = spawn_server(router).await;
        let timeout = Duration::from_millis(200);
        let prober = HttpProber::new(timeout).unwrap();

        let started = Instant::now();
        let result = prober
            .probe(&target(addr, "/slow", timeout), &CancellationToken::new())
            .await;

        assert!(!result.is_up());
        assert!(started.elapsed() < timeout + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_probe_cancelled() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "late"
            }),
        );
        let addr = spawn_server(router).await;
        let prober = HttpProber::new(Duration::from_secs(5)).unwrap();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result = prober
            .probe(&target(addr, "/slow", Duration::from_secs(5)), &cancel)
            .await;

        assert_eq!(result.error(), Some(CANCELLED));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
