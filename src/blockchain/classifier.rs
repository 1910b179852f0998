//! Failure classification.
//!
//! Maps every [`TransferError`] onto a small closed set of user-facing
//! categories, with a hint where the next step is knowable. Unrecognized
//! causes land in `UnknownError` rather than being guessed at.

use std::fmt;

use crate::blockchain::types::TransferError;
use crate::config::NetworkConfig;

/// User-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    ConfigError,
    ValidationError,
    FundsError,
    NetworkError,
    TimeoutError,
    Cancelled,
    UnknownError,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ConfigError => "ConfigError",
            ErrorCategory::ValidationError => "ValidationError",
            ErrorCategory::FundsError => "FundsError",
            ErrorCategory::NetworkError => "NetworkError",
            ErrorCategory::TimeoutError => "TimeoutError",
            ErrorCategory::Cancelled => "Cancelled",
            ErrorCategory::UnknownError => "UnknownError",
        }
    }

    /// Process exit code for this category.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorCategory::UnknownError => 1,
            ErrorCategory::ConfigError => 2,
            ErrorCategory::ValidationError => 3,
            ErrorCategory::FundsError => 4,
            ErrorCategory::NetworkError => 5,
            ErrorCategory::TimeoutError => 6,
            ErrorCategory::Cancelled => 130,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure: category, original message, optional hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Substrings (lowercased) the runtime uses for an underfunded payer.
const FUNDS_MARKERS: &[&str] = &[
    "insufficient funds",
    "insufficient lamports",
    "insufficientfundsforfee",
    "no record of a prior credit",
    "accountnotfound",
];

/// Maps transfer errors to categories and hints.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    key_env_var: String,
    faucet_url: String,
    explorer_url_template: String,
}

impl ErrorClassifier {
    pub fn new(key_env_var: &str, network: &NetworkConfig) -> Self {
        Self {
            key_env_var: key_env_var.to_string(),
            faucet_url: network.faucet_url.clone(),
            explorer_url_template: network.explorer_url_template.clone(),
        }
    }

    /// Category for an error, ignoring hints.
    pub fn category(err: &TransferError) -> ErrorCategory {
        match err {
            TransferError::MissingKey { .. }
            | TransferError::MalformedConfig(_)
            | TransferError::InvalidKeyLength { .. }
            | TransferError::ByteOutOfRange { .. }
            | TransferError::InvalidKeypair(_)
            | TransferError::SigningFailed(_)
            | TransferError::InvalidConfig(_) => ErrorCategory::ConfigError,

            TransferError::InvalidAmount(_) | TransferError::InvalidRecipient(_) => {
                ErrorCategory::ValidationError
            }

            TransferError::BroadcastRejected(reason) if mentions_funds(reason) => {
                ErrorCategory::FundsError
            }
            TransferError::TransactionFailed(reason) if mentions_funds(reason) => {
                ErrorCategory::FundsError
            }

            TransferError::BroadcastRejected(_) | TransferError::NetworkUnavailable { .. } => {
                ErrorCategory::NetworkError
            }

            TransferError::ConfirmationTimeout { .. } => ErrorCategory::TimeoutError,
            TransferError::Cancelled { .. } => ErrorCategory::Cancelled,

            TransferError::TransactionFailed(_) | TransferError::Unexpected(_) => {
                ErrorCategory::UnknownError
            }
        }
    }

    /// Classify an error into category, message and hint.
    pub fn classify(&self, err: &TransferError) -> ClassifiedError {
        let category = Self::category(err);
        let mut message = err.to_string();

        let hint = match (category, err) {
            (ErrorCategory::ConfigError, TransferError::SigningFailed(_)) => Some(
                "The key in the environment does not match the fee payer of the transaction."
                    .to_string(),
            ),
            (ErrorCategory::ConfigError, TransferError::InvalidConfig(_)) => {
                Some("Fix the config file, .env or command-line flags listed above and run again.".to_string())
            }
            (ErrorCategory::ConfigError, _) => Some(format!(
                "Set {} (for example in .env) to a JSON array of 64 integers, as written by solana-keygen.",
                self.key_env_var
            )),
            (ErrorCategory::ValidationError, _) => {
                Some("Transfer amount must be positive and the recipient a base58 public key.".to_string())
            }
            (ErrorCategory::FundsError, _) => Some(format!(
                "Get free devnet SOL at {}",
                self.faucet_url
            )),
            (ErrorCategory::NetworkError, _) => {
                Some("Check the RPC URL and your connectivity, or configure failover_urls.".to_string())
            }
            (ErrorCategory::TimeoutError, TransferError::ConfirmationTimeout { signature, .. }) => {
                message.push_str(
                    ". The transaction was broadcast and may still land; \
                     resubmitting could double-spend.",
                );
                Some(format!(
                    "Check {} before sending again.",
                    self.explorer_url_template
                        .replace("{signature}", &signature.to_string())
                ))
            }
            (ErrorCategory::Cancelled, _) => Some(
                "If a broadcast happened, the transaction may still land; check the explorer before retrying."
                    .to_string(),
            ),
            _ => None,
        };

        ClassifiedError {
            category,
            message,
            hint,
        }
    }
}

fn mentions_funds(reason: &str) -> bool {
    let lower = reason.to_lowercase();
    FUNDS_MARKERS.iter().any(|marker| lower.contains(marker)) || has_system_shortfall_code(&lower)
}

/// `custom program error: 0x1` not followed by another hex digit.
///
/// A transfer only invokes the system program and the compute budget
/// program; of the two, only the system program returns custom codes, and
/// code 1 is its lamport shortfall.
fn has_system_shortfall_code(lower: &str) -> bool {
    const CODE: &str = "custom program error: 0x1";
    lower.match_indices(CODE).any(|(i, _)| {
        !lower[i + CODE.len()..].starts_with(|c: char| c.is_ascii_hexdigit())
    })
}
