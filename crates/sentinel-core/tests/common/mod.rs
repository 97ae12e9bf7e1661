//! Shared fixtures for scheduler tests

#![allow(dead_code)]

use async_trait::async_trait;
use sentinel_core::{ProbeResult, ProbeTarget, Prober};
use sentinel_observability::MetricsSink;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One observation handed to the sink
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Check,
    Up(bool),
    Latency(Duration),
    SkippedTick,
}

/// Sink that keeps every observation in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    observations: Mutex<Vec<Observation>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().unwrap().clone()
    }

    pub fn checks(&self) -> usize {
        self.count(|o| matches!(o, Observation::Check))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Observation::SkippedTick))
    }

    pub fn up_values(&self) -> Vec<bool> {
        self.observations()
            .into_iter()
            .filter_map(|o| match o {
                Observation::Up(up) => Some(up),
                _ => None,
            })
            .collect()
    }

    pub fn latencies(&self) -> Vec<Duration> {
        self.observations()
            .into_iter()
            .filter_map(|o| match o {
                Observation::Latency(latency) => Some(latency),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Observation) -> bool) -> usize {
        self.observations
            .lock()
            .unwrap()
            .iter()
            .filter(|o| pred(o))
            .count()
    }

    fn push(&self, observation: Observation) {
        self.observations.lock().unwrap().push(observation);
    }
}

impl MetricsSink for RecordingSink {
    fn record_check(&self) {
        self.push(Observation::Check);
    }

    fn set_up(&self, _url: &str, up: bool) {
        self.push(Observation::Up(up));
    }

    fn observe_latency(&self, _url: &str, latency: Duration) {
        self.push(Observation::Latency(latency));
    }

    fn record_skipped_tick(&self) {
        self.push(Observation::SkippedTick);
    }
}

type ScriptFuture = Pin<Box<dyn Future<Output = ProbeResult> + Send>>;
type Script = Box<dyn Fn(CancellationToken) -> ScriptFuture + Send + Sync>;

/// Prober driven by a closure, tracking how many probes overlap
pub struct ScriptedProber {
    script: Script,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedProber {
    pub fn new<F, Fut>(script: F) -> Arc<Self>
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProbeResult> + Send + 'static,
    {
        Arc::new(Self {
            script: Box::new(move |cancel| Box::pin(script(cancel))),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        })
    }

    /// Responds UP after `delay`, or DOWN if cancelled first
    pub fn up_after(delay: Duration) -> Arc<Self> {
        Self::new(move |cancel| async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => ProbeResult::up(delay),
                _ = cancel.cancelled() => ProbeResult::down(delay, "cancelled"),
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, _target: &ProbeTarget, cancel: &CancellationToken) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        let result = (self.script)(cancel.clone()).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub fn target(url: &str, interval_ms: u64, timeout_ms: u64) -> ProbeTarget {
    ProbeTarget::new(
        url,
        Duration::from_millis(interval_ms),
        Duration::from_millis(timeout_ms),
    )
    .unwrap()
}
