//! Net Sentinel Core: probe scheduling for a single HTTP target
//!
//! The core keeps one target under watch. A [`Scheduler`] ticks at a fixed
//! interval and asks a [`Prober`] for one bounded check per tick. Every
//! completed check lands in three places:
//!
//! ```text
//! ┌─────────────┐  tick   ┌─────────────┐  ProbeResult  ┌──────────────────┐
//! │  Scheduler  │────────>│   Prober    │──────────────>│  Scheduler       │
//! └─────────────┘         └─────────────┘               │  ├─ SharedState  │
//!        ^                                              │  ├─ MetricsSink  │
//!        └──────────────── next tick ───────────────────│  └─ log line     │
//!                                                       └──────────────────┘
//! ```
//!
//! At most one probe is in flight at a time. Failures are data: a refused
//! connection or a timeout becomes a DOWN result, never an error.
//!
//! # Example
//!
//! ```no_run
//! use sentinel_core::{HttpProber, ProbeTarget, Scheduler};
//! use sentinel_observability::SentinelMetrics;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let target = ProbeTarget::new(
//!     "https://example.com",
//!     Duration::from_secs(5),
//!     Duration::from_secs(2),
//! )?;
//!
//! let metrics = Arc::new(SentinelMetrics::new()?);
//! let prober = Arc::new(HttpProber::for_target(&target)?);
//! let scheduler = Scheduler::new(target, prober, metrics.clone());
//! let state = scheduler.state();
//!
//! let cancel = CancellationToken::new();
//! tokio::spawn(scheduler.start(cancel.clone()));
//!
//! println!("{:?}", state.snapshot().await);
//! # Ok(())
//! # }
//! ```

pub mod prober;
pub mod scheduler;
pub mod state;
pub mod target;

pub use prober::{HttpProber, ProbeOutcome, ProbeResult, Prober};
pub use scheduler::Scheduler;
pub use state::{SentinelState, SharedState, Status, StatusSnapshot};
pub use target::{ProbeTarget, TargetError};
