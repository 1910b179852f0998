//! Chain-specific types and error definitions.

use std::time::Duration;

use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::blockchain::classifier::ClassifiedError;
use crate::config::ConfigError;
use crate::resilience::Retryable;

/// Expected length of a raw secret key (32-byte seed + 32-byte public key).
pub const SECRET_KEY_LEN: usize = 64;

/// Errors that can occur anywhere in the transfer pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// The key environment variable is absent.
    #[error("Environment variable {var} not set")]
    MissingKey { var: String },

    /// The key could not be decoded as a JSON array of integers.
    #[error("Failed to parse secret key as a JSON array of integers: {0}")]
    MalformedConfig(String),

    /// The decoded key does not have exactly 64 elements.
    #[error("Invalid secret key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// A key element does not fit in a byte.
    #[error("Secret key element {index} is {value}, expected 0..=255")]
    ByteOutOfRange { index: usize, value: i64 },

    /// The 64 bytes do not form a consistent keypair.
    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    /// Configuration was rejected before the run started.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transfer amount must be positive.
    #[error("Invalid amount: transfer of {0} lamports")]
    InvalidAmount(u64),

    /// Recipient is not a valid public key.
    #[error("Invalid recipient '{0}'")]
    InvalidRecipient(String),

    /// Signing failed (e.g. signer is not the fee payer).
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// The network refused the transaction synchronously.
    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(String),

    /// The network could not be reached after all retries.
    #[error("Network unavailable after {attempts} attempts: {last_error}")]
    NetworkUnavailable { attempts: u32, last_error: String },

    /// Broadcast succeeded but confirmation was not observed in time.
    #[error("Transaction {signature} not confirmed after {}s", .waited.as_secs())]
    ConfirmationTimeout { signature: Signature, waited: Duration },

    /// The transaction landed but failed on-chain.
    #[error("Transaction failed on-chain: {0}")]
    TransactionFailed(String),

    /// The run was cancelled (deadline or interrupt).
    #[error("Cancelled after {attempts} broadcast attempts")]
    Cancelled { attempts: u32 },

    /// Anything the pipeline has no specific variant for.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<ConfigError> for TransferError {
    fn from(err: ConfigError) -> Self {
        TransferError::InvalidConfig(err.to_string())
    }
}

/// Result type for pipeline operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Failure reported by the RPC collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcFailure {
    /// Unreachable, timed out, or otherwise worth retrying.
    #[error("transient RPC failure: {0}")]
    Transient(String),

    /// The node answered and refused the request.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl Retryable for RpcFailure {
    fn is_transient(&self) -> bool {
        matches!(self, RpcFailure::Transient(_))
    }
}

/// A request to move lamports between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Pubkey,
    pub to: Pubkey,
    pub lamports: u64,
}

impl TransferRequest {
    /// Self-transfer, used as a connectivity smoke test.
    pub fn to_self(payer: Pubkey, lamports: u64) -> Self {
        Self {
            from: payer,
            to: payer,
            lamports,
        }
    }

    pub fn validate(&self) -> TransferResult<()> {
        if self.lamports == 0 {
            return Err(TransferError::InvalidAmount(self.lamports));
        }
        Ok(())
    }
}

/// Recent block reference a transaction is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockReference {
    pub blockhash: Hash,
    /// Last block height at which the blockhash is still accepted.
    pub last_valid_block_height: u64,
}

/// Optional priority-fee parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeParams {
    /// Micro-lamports per compute unit.
    pub compute_unit_price: Option<u64>,
    pub compute_unit_limit: Option<u32>,
}

/// A built transfer awaiting a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransfer {
    pub message: Message,
    pub request: TransferRequest,
    pub block: BlockReference,
}

/// Status of a signature as seen at some commitment level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Unknown to the node, or not yet at the requested commitment.
    Pending,
    /// Reached the requested commitment without error.
    Confirmed,
    /// Processed with an error.
    Failed(String),
}

/// Outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success { signature: Signature },
    Failure(ClassifiedError),
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success { .. })
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            SubmissionResult::Success { signature } => Some(signature),
            SubmissionResult::Failure(_) => None,
        }
    }
}
