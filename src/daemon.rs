//! Daemon wiring: scheduler + HTTP server + signal handling
//!
//! The metrics registry is created here exactly once per process and shared
//! by the scheduler (writer) and the HTTP server (reader).

use sentinel_core::{HttpProber, Scheduler};
use sentinel_observability::SentinelMetrics;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::ResolvedConfig;
use crate::error::{Result, SentinelError};
use crate::server::{self, AppState};

/// Run the monitor on an already-bound listener until `shutdown` fires
///
/// Returns once both the probe loop and the HTTP server have stopped. If
/// the server fails, the probe loop is cancelled too.
pub async fn run(
    config: ResolvedConfig,
    listener: TcpListener,
    shutdown: CancellationToken,
) -> Result<()> {
    let target = config.target;

    if target.timeout_exceeds_interval() {
        warn!(
            "Request timeout {:?} exceeds check interval {:?}; slow probes will skip ticks",
            target.request_timeout(),
            target.check_interval()
        );
    }

    let metrics = Arc::new(SentinelMetrics::new()?);
    let prober = Arc::new(HttpProber::for_target(&target)?);
    let scheduler = Scheduler::new(target, prober, metrics.clone());
    let app_state = AppState::new(metrics, scheduler.state());

    let probe_task = tokio::spawn(scheduler.start(shutdown.clone()));

    let served = server::serve(listener, app_state, shutdown.clone()).await;

    // Stops the probe loop when the server exited on its own
    shutdown.cancel();

    probe_task
        .await
        .map_err(|e| SentinelError::Server(format!("Probe task failed: {}", e)))?;

    served
}

/// Cancel `shutdown` on SIGINT or SIGTERM
pub async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("🛑 Interrupt received, shutting down..."),
        _ = terminate => info!("🛑 SIGTERM received, shutting down..."),
        _ = shutdown.cancelled() => {}
    }

    shutdown.cancel();
}
