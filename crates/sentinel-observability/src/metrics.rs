//! Prometheus metrics for probe outcomes
//!
//! All metrics live on a registry owned by [`SentinelMetrics`]. The process
//! creates exactly one instance at startup and shares it behind an `Arc`;
//! every recording method takes `&self` and is safe to call concurrently.

use prometheus::proto::{Metric, MetricFamily};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;
use thiserror::Error;

/// Total number of completed probes, regardless of outcome
pub const CHECKS_TOTAL: &str = "sentinel_checks_total";

/// Reachability of the target (1 = up, 0 = down), labelled by `url`
pub const SITE_UP: &str = "sentinel_site_up";

/// Latency of successful probes in seconds, labelled by `url`
pub const LATENCY_SECONDS: &str = "sentinel_latency_seconds";

/// Ticks dropped because a probe was still in flight
pub const SKIPPED_TICKS_TOTAL: &str = "sentinel_skipped_ticks_total";

/// Content type of the text exposition format
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Buckets: 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Metrics output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Observations emitted for every completed probe.
///
/// Append-only: implementors are written to, never read back by the
/// scheduler.
pub trait MetricsSink: Send + Sync {
    /// Count one completed probe attempt
    fn record_check(&self);

    /// Set the up indicator for `url`
    fn set_up(&self, url: &str, up: bool);

    /// Record the latency of a successful probe against `url`
    fn observe_latency(&self, url: &str, latency: Duration);

    /// Count a tick that was dropped because a probe was still running
    fn record_skipped_tick(&self) {}
}

/// Prometheus-backed metrics sink.
pub struct SentinelMetrics {
    registry: Registry,
    checks_total: IntCounter,
    site_up: IntGaugeVec,
    latency: HistogramVec,
    skipped_ticks: IntCounter,
}

impl SentinelMetrics {
    /// Create the metrics and register them on a fresh registry
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let checks_total = IntCounter::with_opts(Opts::new(
            CHECKS_TOTAL,
            "Total number of reachability checks performed",
        ))?;
        registry.register(Box::new(checks_total.clone()))?;

        let site_up = IntGaugeVec::new(
            Opts::new(SITE_UP, "Target status (1 for UP, 0 for DOWN)"),
            &["url"],
        )?;
        registry.register(Box::new(site_up.clone()))?;

        let latency = HistogramVec::new(
            HistogramOpts::new(LATENCY_SECONDS, "Latency of successful HTTP probes")
                .buckets(LATENCY_BUCKETS.to_vec()),
            &["url"],
        )?;
        registry.register(Box::new(latency.clone()))?;

        let skipped_ticks = IntCounter::with_opts(Opts::new(
            SKIPPED_TICKS_TOTAL,
            "Ticks skipped because the previous probe was still running",
        ))?;
        registry.register(Box::new(skipped_ticks.clone()))?;

        Ok(Self {
            registry,
            checks_total,
            site_up,
            latency,
            skipped_ticks,
        })
    }

    /// Get metrics in Prometheus text format
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Current value of the total-checks counter
    pub fn checks_total(&self) -> u64 {
        self.checks_total.get()
    }

    /// Current value of the skipped-ticks counter
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks.get()
    }

    /// Up indicator for `url`, or `None` if it was never set
    pub fn site_up(&self, url: &str) -> Option<i64> {
        let series = self.find_series(SITE_UP, url)?;
        Some(series.get_gauge().get_value() as i64)
    }

    /// Number of latency observations recorded for `url`
    pub fn latency_count(&self, url: &str) -> u64 {
        self.find_series(LATENCY_SECONDS, url)
            .map(|m| m.get_histogram().get_sample_count())
            .unwrap_or(0)
    }

    /// Sum of latency observations recorded for `url`, in seconds
    pub fn latency_sum(&self, url: &str) -> f64 {
        self.find_series(LATENCY_SECONDS, url)
            .map(|m| m.get_histogram().get_sample_sum())
            .unwrap_or(0.0)
    }

    // Looks a series up through `gather` so that reading never creates it.
    fn find_series(&self, name: &str, url: &str) -> Option<Metric> {
        self.registry
            .gather()
            .into_iter()
            .find(|family: &MetricFamily| family.get_name() == name)?
            .get_metric()
            .iter()
            .find(|metric| {
                metric
                    .get_label()
                    .iter()
                    .any(|label| label.get_name() == "url" && label.get_value() == url)
            })
            .cloned()
    }
}

impl MetricsSink for SentinelMetrics {
    fn record_check(&self) {
        self.checks_total.inc();
    }

    fn set_up(&self, url: &str, up: bool) {
        self.site_up.with_label_values(&[url]).set(i64::from(up));
    }

    fn observe_latency(&self, url: &str, latency: Duration) {
        self.latency
            .with_label_values(&[url])
            .observe(latency.as_secs_f64());
    }

    fn record_skipped_tick(&self) {
        self.skipped_ticks.inc();
    }
}

impl std::fmt::Debug for SentinelMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentinelMetrics")
            .field("checks_total", &self.checks_total.get())
            .field("skipped_ticks", &self.skipped_ticks.get())
            .finish_non_exhaustive()
    }
}
