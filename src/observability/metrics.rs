//! Metrics collection.
//!
//! # Metrics
//! - `router_navigations_total` (counter): rounds by outcome
//!   (committed, cancelled, failed)
//! - `router_navigation_duration_seconds` (histogram): round latency
//! - `router_reconcile_iterations` (histogram): loop iterations per round
//! - `router_queue_depth` (gauge): navigations waiting in the queue
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; no exporter is bundled
//! - Can be switched off with `observability.metrics_enabled`

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn metric emission on or off process-wide.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Outcome of a navigation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Committed,
    Cancelled,
    Failed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Committed => "committed",
            Outcome::Cancelled => "cancelled",
            Outcome::Failed => "failed",
        }
    }
}

/// Record a finished navigation round.
pub fn record_navigation(outcome: Outcome, started: Instant, iterations: usize) {
    if !enabled() {
        return;
    }
    metrics::counter!("router_navigations_total", "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!("router_navigation_duration_seconds")
        .record(started.elapsed().as_secs_f64());
    metrics::histogram!("router_reconcile_iterations").record(iterations as f64);
}

/// Record the number of navigations waiting in the queue.
pub fn record_queue_depth(depth: usize) {
    if !enabled() {
        return;
    }
    metrics::gauge!("router_queue_depth").set(depth as f64);
}
