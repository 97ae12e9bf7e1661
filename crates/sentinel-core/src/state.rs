//! Sentinel State
//!
//! The single piece of mutable state shared between the scheduler (one
//! writer, once per interval) and the status/metrics endpoints (many
//! readers). Only the latest result is kept; the check count is the one
//! aggregate.

use crate::prober::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Reachability of the target as of the last completed probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No probe has completed yet
    Starting,
    Up,
    Down,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Status::Starting => "STARTING",
            Status::Up => "UP",
            Status::Down => "DOWN",
        };
        f.write_str(label)
    }
}

/// Latest observed state of the monitored target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelState {
    pub status: Status,

    /// Latency of the last probe, if it succeeded
    pub last_latency: Option<Duration>,

    /// Failure detail of the last probe, if it failed
    pub last_error: Option<String>,

    /// When the last probe completed
    pub last_checked: Option<DateTime<Utc>>,

    /// Completed probes since startup
    pub check_count: u64,
}

impl SentinelState {
    pub fn new() -> Self {
        Self {
            status: Status::Starting,
            last_latency: None,
            last_error: None,
            last_checked: None,
            check_count: 0,
        }
    }

    /// Replace the per-probe fields with `result` and bump the count
    pub fn apply(&mut self, result: &ProbeResult) {
        self.status = if result.is_up() {
            Status::Up
        } else {
            Status::Down
        };
        self.last_latency = result.latency();
        self.last_error = result.error().map(str::to_string);
        self.last_checked = Some(result.timestamp);
        self.check_count += 1;
    }
}

impl Default for SentinelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`SentinelState`] as served by the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub target: String,
    pub status: Status,
    pub latency_ms: Option<f64>,
    pub last_error: Option<String>,
    pub last_checked: Option<DateTime<Utc>>,
    pub check_count: u64,
}

fn as_millis(latency: Duration) -> f64 {
    latency.as_micros() as f64 / 1000.0
}

/// Cloneable handle to the shared state
///
/// Backed by tokio's fair `RwLock`: status readers proceed concurrently,
/// while the scheduler takes the write lock once per probe for a
/// constant-time update.
#[derive(Debug, Clone)]
pub struct SharedState {
    target: Arc<str>,
    inner: Arc<RwLock<SentinelState>>,
}

impl SharedState {
    pub fn new(target: &str) -> Self {
        Self {
            target: Arc::from(target),
            inner: Arc::new(RwLock::new(SentinelState::new())),
        }
    }

    /// Apply a completed probe under the write lock
    pub async fn record(&self, result: &ProbeResult) -> Status {
        let mut state = self.inner.write().await;
        state.apply(result);
        state.status
    }

    /// Copy every field under one read guard
    pub async fn snapshot(&self) -> StatusSnapshot {
        let state = self.inner.read().await;
        StatusSnapshot {
            target: self.target.to_string(),
            status: state.status,
            latency_ms: state.last_latency.map(as_millis),
            last_error: state.last_error.clone(),
            last_checked: state.last_checked,
            check_count: state.check_count,
        }
    }

    pub async fn status(&self) -> Status {
        self.inner.read().await.status
    }

    pub async fn check_count(&self) -> u64 {
        self.inner.read().await.check_count
    }
}
