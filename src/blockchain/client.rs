//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Define the collaborator seam the submitter talks to
//! - Connect to one or more JSON-RPC endpoints (primary + failovers)
//! - Split client errors into transient failures and rejections
//! - Bound every request with a timeout

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::InstructionError;
use solana_sdk::signature::Signature;
use solana_sdk::system_instruction::SystemError;
use solana_sdk::transaction::{Transaction, TransactionError};
use tokio::time::timeout;

use crate::blockchain::types::{BlockReference, RpcFailure, SignatureStatus};
use crate::config::NetworkConfig;

/// JSON-RPC error code for "node is unhealthy / behind".
const NODE_UNHEALTHY: i64 = -32005;

/// The network operations the pipeline depends on.
#[async_trait]
pub trait RpcCollaborator: Send + Sync {
    /// Most recent blockhash at the client's commitment.
    async fn latest_block_reference(&self) -> Result<BlockReference, RpcFailure>;

    /// Broadcast a signed transaction, returning its signature.
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, RpcFailure>;

    /// Look up a signature at the given commitment.
    async fn signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<SignatureStatus, RpcFailure>;
}

struct Endpoint {
    url: String,
    rpc: RpcClient,
}

/// Solana JSON-RPC client wrapper with failover support.
#[derive(Clone)]
pub struct SolanaRpcClient {
    /// Primary endpoint first, then failovers in configured order.
    endpoints: Arc<Vec<Endpoint>>,
    config: NetworkConfig,
    timeout_duration: Duration,
}

impl SolanaRpcClient {
    /// Create a client for the configured endpoints.
    ///
    /// No request is made here; an unreachable endpoint surfaces on first use.
    pub fn new(config: NetworkConfig) -> Self {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let commitment = config.commitment.as_config();

        let endpoints = std::iter::once(&config.rpc_url)
            .chain(config.failover_urls.iter())
            .map(|url| Endpoint {
                url: url.clone(),
                rpc: RpcClient::new_with_timeout_and_commitment(
                    url.clone(),
                    timeout_duration,
                    commitment,
                ),
            })
            .collect::<Vec<_>>();

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = config.failover_urls.len(),
            commitment = %config.commitment,
            "RPC client initialized"
        );

        Self {
            endpoints: Arc::new(endpoints),
            config,
            timeout_duration,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Run `call` against each endpoint in turn until one answers.
    ///
    /// A rejection is the node's answer and is returned without failover.
    async fn with_failover<'a, T, F, Fut>(
        &'a self,
        operation: &'static str,
        call: F,
    ) -> Result<T, RpcFailure>
    where
        F: Fn(&'a RpcClient) -> Fut,
        Fut: Future<Output = Result<T, ClientError>> + 'a,
    {
        let mut last_error = String::from("no RPC endpoints configured");

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            match timeout(self.timeout_duration, call(&endpoint.rpc)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => match classify_client_error(&e) {
                    RpcFailure::Rejected(reason) => return Err(RpcFailure::Rejected(reason)),
                    RpcFailure::Transient(reason) => {
                        tracing::warn!(
                            operation,
                            endpoint_idx = i,
                            url = %endpoint.url,
                            error = %reason,
                            "RPC error, trying next endpoint"
                        );
                        last_error = reason;
                    }
                },
                Err(_) => {
                    tracing::warn!(
                        operation,
                        endpoint_idx = i,
                        url = %endpoint.url,
                        "RPC timeout, trying next endpoint"
                    );
                    last_error = format!(
                        "{} timed out after {}s",
                        operation,
                        self.timeout_duration.as_secs()
                    );
                }
            }
        }

        Err(RpcFailure::Transient(format!(
            "all RPC endpoints failed ({}): {}",
            operation, last_error
        )))
    }
}

#[async_trait]
impl RpcCollaborator for SolanaRpcClient {
    async fn latest_block_reference(&self) -> Result<BlockReference, RpcFailure> {
        let commitment = self.config.commitment.as_config();
        let (blockhash, last_valid_block_height) = self
            .with_failover("getLatestBlockhash", |rpc| {
                rpc.get_latest_blockhash_with_commitment(commitment)
            })
            .await?;

        Ok(BlockReference {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, RpcFailure> {
        let send_config = RpcSendTransactionConfig {
            skip_preflight: self.config.skip_preflight,
            preflight_commitment: Some(self.config.commitment.as_config().commitment),
            ..RpcSendTransactionConfig::default()
        };

        self.with_failover("sendTransaction", |rpc| {
            rpc.send_transaction_with_config(tx, send_config.clone())
        })
        .await
    }

    async fn signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<SignatureStatus, RpcFailure> {
        let status = self
            .with_failover("getSignatureStatuses", |rpc| {
                rpc.get_signature_status_with_commitment(signature, commitment)
            })
            .await?;

        Ok(match status {
            None => SignatureStatus::Pending,
            Some(Ok(())) => SignatureStatus::Confirmed,
            Some(Err(e)) => SignatureStatus::Failed(describe_transaction_error(&e)),
        })
    }
}

impl std::fmt::Debug for SolanaRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpcClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("failover_urls", &self.config.failover_urls)
            .field("commitment", &self.config.commitment)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

/// Decide whether a client error is worth retrying.
///
/// Transport problems and unhealthy nodes are transient; an answer from a
/// healthy node (preflight failure, bad signature) is a rejection.
pub fn classify_client_error(err: &ClientError) -> RpcFailure {
    match err.kind() {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            RpcFailure::Transient(err.to_string())
        }
        ClientErrorKind::RpcError(RpcError::RpcRequestError(_)) => {
            RpcFailure::Transient(err.to_string())
        }
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            code,
            message,
            data,
        }) => {
            if *code == NODE_UNHEALTHY {
                RpcFailure::Transient(message.clone())
            } else {
                RpcFailure::Rejected(rejection_reason(message, data))
            }
        }
        ClientErrorKind::TransactionError(e) => RpcFailure::Rejected(describe_transaction_error(e)),
        ClientErrorKind::RpcError(_) | ClientErrorKind::SigningError(_) => {
            RpcFailure::Rejected(err.to_string())
        }
        _ => RpcFailure::Transient(err.to_string()),
    }
}

/// Response message plus the simulation's error and its diagnostic logs.
///
/// A failed preflight only says "custom program error: 0x1"; the lamport
/// counts are in the logs.
fn rejection_reason(message: &str, data: &RpcResponseErrorData) -> String {
    let RpcResponseErrorData::SendTransactionPreflightFailure(simulation) = data else {
        return message.to_string();
    };

    let mut reason = message.to_string();
    if let Some(err) = &simulation.err {
        reason.push_str("; ");
        reason.push_str(&describe_transaction_error(err));
    }
    let diagnostics: Vec<&str> = simulation
        .logs
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|line| !line.starts_with("Program ") || line.contains("failed"))
        .collect();
    if !diagnostics.is_empty() {
        reason.push_str("; logs: ");
        reason.push_str(&diagnostics.join(" | "));
    }
    reason
}

/// Display text for a transaction error, naming the system program's
/// lamport shortfall, which the runtime reports only as a custom code.
pub fn describe_transaction_error(err: &TransactionError) -> String {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code))
            if *code == SystemError::ResultWithNegativeLamports as u32 =>
        {
            format!("{} (insufficient lamports for transfer)", err)
        }
        _ => err.to_string(),
    }
}
