//! Net Sentinel Observability
//!
//! Metrics plumbing for the reachability monitor. The scheduler reports each
//! completed probe through the [`MetricsSink`] trait; [`SentinelMetrics`]
//! implements it on top of a Prometheus registry and renders the text
//! exposition format for the `/metrics` endpoint.
//!
//! ## Lifecycle
//!
//! One `SentinelMetrics` is constructed at startup, wrapped in an `Arc`, and
//! handed to both the scheduler (writer) and the HTTP server (reader). It is
//! never recreated, so counters stay monotonic for the life of the process.
//!
//! ```
//! use sentinel_observability::{MetricsSink, SentinelMetrics};
//! use std::time::Duration;
//!
//! let metrics = SentinelMetrics::new().unwrap();
//! metrics.record_check();
//! metrics.set_up("https://example.com", true);
//! metrics.observe_latency("https://example.com", Duration::from_millis(42));
//!
//! let text = metrics.encode_text().unwrap();
//! assert!(text.contains("sentinel_checks_total 1"));
//! ```

pub mod metrics;

pub use metrics::{MetricsError, MetricsSink, SentinelMetrics, TEXT_CONTENT_TYPE};
