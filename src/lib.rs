/*!
 * Net Sentinel - HTTP reachability monitor
 *
 * Probes one URL on a fixed interval and exports the outcome:
 * - Prometheus metrics at /metrics (checks, up indicator, latency histogram)
 * - A JSON status snapshot at /status
 * - At most one probe in flight; slow probes skip ticks instead of piling up
 * - Layered configuration: defaults, TOML file, environment, flags
 */

pub mod config;
pub mod daemon;
pub mod error;
pub mod logging;
pub mod server;

// Re-export commonly used types
pub use config::{ConfigOverrides, LogLevel, ResolvedConfig, SentinelConfig};
pub use error::{Result, SentinelError};
pub use sentinel_core::{ProbeResult, ProbeTarget, Scheduler, SharedState, Status, StatusSnapshot};
pub use sentinel_observability::{MetricsSink, SentinelMetrics};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
