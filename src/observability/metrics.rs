//! Metrics collection.
//!
//! # Metrics
//! - `transfer_broadcast_attempts_total` (counter): sendTransaction calls made
//! - `transfer_outcomes_total` (counter): finished runs by category
//! - `transfer_confirmation_seconds` (histogram): broadcast → confirmed latency
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; with no recorder installed the
//!   calls are no-ops, so a one-shot CLI run pays nothing for them
//! - Embedders can install any recorder before calling the pipeline

use std::time::Duration;

pub fn record_broadcast_attempt() {
    metrics::counter!("transfer_broadcast_attempts_total").increment(1);
}

pub fn record_outcome(category: &'static str) {
    metrics::counter!("transfer_outcomes_total", "category" => category).increment(1);
}

pub fn record_confirmation_time(elapsed: Duration) {
    metrics::histogram!("transfer_confirmation_seconds").record(elapsed.as_secs_f64());
}
