//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the RPC collaborator:
//!     → client.rs wraps each request in a timeout
//!     → On transient failure: retries.rs (retry with backoff.rs delays)
//!     → timeouts.rs (cancellable sleeps, confirmation deadline)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries only for transient failures, never for rejections
//! - Every wait is raced against the run's cancellation signal

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{retry_with_backoff, RetryError, RetryPolicy, Retryable};
pub use timeouts::{sleep_unless_cancelled, Cancelled, Deadline};
