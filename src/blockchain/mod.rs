//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (JSON key array)
//!     → key_loader.rs (decode, validate 64 bytes)
//!     → wallet.rs (derive keypair, signing)
//!     → transaction.rs (build unsigned transfer from a block reference)
//!     → submitter.rs (sign, broadcast with retry, confirm)
//!         ↔ client.rs (RPC collaborator with timeouts and failover)
//!     → classifier.rs (error → category + hint)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or the raw variable
//! - All RPC calls have configurable timeouts

pub mod classifier;
pub mod client;
pub mod key_loader;
pub mod submitter;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use classifier::{ClassifiedError, ErrorCategory, ErrorClassifier};
pub use client::{RpcCollaborator, SolanaRpcClient};
pub use key_loader::SecretKeyMaterial;
pub use submitter::{Submitter, SubmitterConfig};
pub use transaction::TransactionBuilder;
pub use types::{
    BlockReference, FeeParams, RpcFailure, SignatureStatus, SubmissionResult, TransferError,
    TransferRequest, TransferResult, UnsignedTransfer,
};
pub use wallet::Wallet;
