//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per run with run_id)
//!     → metrics.rs (counters, gauges, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event; secrets never appear in them
//! - Metrics are cheap (facade calls, no-op without a recorder)

pub mod logging;
pub mod metrics;
