//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a transfer run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;

/// Default environment variable holding the secret key.
pub const DEFAULT_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// Root configuration for a transfer run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Environment variable holding the JSON-encoded secret key.
    pub key_env_var: String,

    /// Overall deadline for the whole run in seconds.
    pub deadline_secs: u64,

    /// RPC endpoint and network settings.
    pub network: NetworkConfig,

    /// What to send and to whom.
    pub transfer: TransferParams,

    /// Broadcast retry policy.
    pub retries: RetryConfig,

    /// Confirmation polling policy.
    pub confirmation: ConfirmationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            key_env_var: DEFAULT_KEY_ENV_VAR.to_string(),
            deadline_secs: 60,
            network: NetworkConfig::default(),
            transfer: TransferParams::default(),
            retries: RetryConfig::default(),
            confirmation: ConfirmationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Commitment level requested when querying network state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_config(self) -> CommitmentConfig {
        match self {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

/// Network (RPC collaborator) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order after the primary.
    pub failover_urls: Vec<String>,

    /// Commitment level for blockhash queries and confirmation.
    pub commitment: Commitment,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Skip the node's preflight simulation when broadcasting.
    pub skip_preflight: bool,

    /// Explorer link template; `{signature}` is substituted.
    pub explorer_url_template: String,

    /// Where to get test funds, shown when the payer is out of lamports.
    pub faucet_url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            failover_urls: Vec::new(),
            commitment: Commitment::Confirmed,
            rpc_timeout_secs: 10,
            skip_preflight: false,
            explorer_url_template: "https://solscan.io/tx/{signature}?cluster=devnet".to_string(),
            faucet_url: "https://faucet.solana.com".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Render the explorer URL for a signature.
    pub fn explorer_url(&self, signature: &str) -> String {
        self.explorer_url_template.replace("{signature}", signature)
    }
}

/// Transfer parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferParams {
    /// Amount in lamports.
    pub lamports: u64,

    /// Base58 recipient; empty sends to the payer itself.
    pub recipient: String,

    /// Priority fee in micro-lamports per compute unit (0 = none).
    pub compute_unit_price_micro_lamports: u64,

    /// Compute unit limit (0 = runtime default).
    pub compute_unit_limit: u32,
}

impl Default for TransferParams {
    fn default() -> Self {
        Self {
            lamports: 1_000_000, // 0.001 SOL
            recipient: String::new(),
            compute_unit_price_micro_lamports: 0,
            compute_unit_limit: 0,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of broadcast attempts.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 2000,
            jitter: true,
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// How long to wait for confirmation after a successful broadcast.
    pub timeout_secs: u64,

    /// Delay between status polls in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            poll_interval_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
