//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation sources:
//!     signals.rs (Ctrl-C) ──┐
//!     run deadline ─────────┴→ Shutdown::trigger
//!                              → ShutdownSignal observed at every backoff
//!                                and poll suspension point
//! ```
//!
//! # Design Decisions
//! - One coordinator per run, cloned into whoever may cancel it
//! - Cancellation is level-triggered: late observers still see it

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
