//! Scheduler: the probe loop
//!
//! Drives the prober at a fixed cadence until cancelled and feeds every
//! completed result to the shared state and the metrics sink.
//!
//! The ticker runs independently of probe duration. A probe is spawned on
//! a tick only when no other probe is in flight; a tick that lands while a
//! probe is still running is skipped, never queued, so results for the
//! target can never arrive out of order.

use crate::prober::{ProbeResult, Prober};
use crate::state::{SharedState, Status};
use crate::target::ProbeTarget;
use sentinel_observability::MetricsSink;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Periodic prober for a single target
pub struct Scheduler {
    target: ProbeTarget,

    prober: Arc<dyn Prober>,

    /// Process-wide sink; the scheduler only ever writes to it
    metrics: Arc<dyn MetricsSink>,

    state: SharedState,
}

impl Scheduler {
    /// Create a scheduler with fresh state (status `Starting`)
    pub fn new(
        target: ProbeTarget,
        prober: Arc<dyn Prober>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let state = SharedState::new(target.url_str());

        Self {
            target,
            prober,
            metrics,
            state,
        }
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    /// Handle for readers of the shared state
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Run the probe loop until `cancel` fires
    ///
    /// The first probe is issued immediately. Probe failures never end the
    /// loop. On cancellation the in-flight probe (if any) gets at most one
    /// request timeout to wind down before it is aborted; its result is
    /// discarded.
    ///
    /// ```no_run
    /// # use sentinel_core::{HttpProber, ProbeTarget, Scheduler};
    /// # use sentinel_observability::SentinelMetrics;
    /// # use std::sync::Arc;
    /// # use tokio_util::sync::CancellationToken;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let target = ProbeTarget::with_defaults("https://example.com")?;
    /// let prober = Arc::new(HttpProber::for_target(&target)?);
    /// let metrics = Arc::new(SentinelMetrics::new()?);
    ///
    /// let scheduler = Scheduler::new(target, prober, metrics);
    /// let cancel = CancellationToken::new();
    ///
    /// let task = tokio::spawn(scheduler.start(cancel.clone()));
    /// // ... later
    /// cancel.cancel();
    /// task.await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start(self, cancel: CancellationToken) {
        info!(
            "🛰️  Sentinel Active | Target: {} | Interval: {:?} | Timeout: {:?}",
            self.target.url(),
            self.target.check_interval(),
            self.target.request_timeout()
        );

        let mut ticker = tokio::time::interval(self.target.check_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: Option<JoinHandle<ProbeResult>> = None;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                joined = wait_for(&mut in_flight) => {
                    in_flight = None;
                    match joined {
                        Ok(result) if !cancel.is_cancelled() => self.record(&result).await,
                        Ok(_) => {}
                        Err(e) => error!("Probe task for {} failed: {}", self.target.url(), e),
                    }
                }

                _ = ticker.tick() => {
                    if in_flight.is_some() {
                        self.metrics.record_skipped_tick();
                        warn!(
                            "⏸️  Tick skipped for {}: previous probe still in flight",
                            self.target.url()
                        );
                    } else {
                        in_flight = Some(self.spawn_probe(&cancel));
                    }
                }
            }
        }

        self.abandon(in_flight).await;
        info!("🛑 Sentinel for {} stopped", self.target.url());
    }

    fn spawn_probe(&self, cancel: &CancellationToken) -> JoinHandle<ProbeResult> {
        let prober = self.prober.clone();
        let target = self.target.clone();
        let cancel = cancel.clone();

        tokio::spawn(async move { prober.probe(&target, &cancel).await })
    }

    /// Emit metrics, update state, and log one completed probe
    async fn record(&self, result: &ProbeResult) {
        let url = self.target.url_str();

        self.metrics.record_check();
        self.metrics.set_up(url, result.is_up());
        if let Some(latency) = result.latency() {
            self.metrics.observe_latency(url, latency);
        }

        let previous = self.state.status().await;
        let status = self.state.record(result).await;

        match result.error() {
            None => info!("✅ {} is UP ({:?})", url, result.elapsed),
            Some(error) => warn!("❌ {} is DOWN: {}", url, error),
        }

        if previous != status && previous != Status::Starting {
            info!("🔁 {} changed {} -> {}", url, previous, status);
        }
    }

    async fn abandon(&self, in_flight: Option<JoinHandle<ProbeResult>>) {
        let Some(mut handle) = in_flight else {
            return;
        };

        let grace = self.target.request_timeout();
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(result)) => debug!("Discarded abandoned probe: {:?}", result.outcome),
            Ok(Err(e)) => warn!("Probe task ended abnormally during shutdown: {}", e),
            Err(_) => {
                handle.abort();
                // Wait for the abort so the request is dropped before we return.
                let _ = handle.await;
                warn!("Aborted probe still running {:?} after shutdown", grace);
            }
        }
    }
}

/// Resolve when the in-flight probe finishes; pend forever when idle
async fn wait_for(
    in_flight: &mut Option<JoinHandle<ProbeResult>>,
) -> Result<ProbeResult, JoinError> {
    match in_flight.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("target", &self.target)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
