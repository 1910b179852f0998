//! Devnet transfer: load a key, build one transfer, submit it with bounded
//! retry and confirmation, and classify whatever goes wrong.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod resilience;

pub use config::TransferConfig;
pub use lifecycle::Shutdown;
pub use pipeline::{TransferPipeline, TransferReport};
