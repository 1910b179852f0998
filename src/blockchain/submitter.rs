//! Signing, broadcast and confirmation monitoring.
//!
//! # Responsibilities
//! - Sign the built transfer with the run's wallet
//! - Broadcast with bounded retry on transient failures
//! - Never blindly re-send: look the signature up first
//! - Poll for confirmation until a hard deadline
//!
//! # Flow
//! ```text
//! sign → [lookup?] → send ──transient──▶ backoff ──▶ [lookup?] → send ...
//!                     │
//!                     ├─rejected──▶ BroadcastRejected
//!                     ▼
//!                   poll status ──pending──▶ sleep ──▶ poll ... ──deadline──▶ ConfirmationTimeout
//!                     │
//!                     ├─confirmed──▶ Success
//!                     └─failed─────▶ TransactionFailed
//! ```

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tokio::time::timeout;

use crate::blockchain::classifier::ErrorClassifier;
use crate::blockchain::client::RpcCollaborator;
use crate::blockchain::types::{
    RpcFailure, SignatureStatus, SubmissionResult, TransferError, TransferResult, UnsignedTransfer,
};
use crate::blockchain::wallet::Wallet;
use crate::config::{Commitment, TransferConfig};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::{retry_with_backoff, sleep_unless_cancelled, Deadline, RetryError, RetryPolicy};

/// Submitter settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterConfig {
    pub retry: RetryPolicy,
    /// How long to poll for confirmation after a successful broadcast.
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    /// Commitment a transaction must reach to count as confirmed.
    pub commitment: Commitment,
}

impl SubmitterConfig {
    pub fn from_config(config: &TransferConfig) -> Self {
        Self {
            retry: RetryPolicy::from(&config.retries),
            confirmation_timeout: Duration::from_secs(config.confirmation.timeout_secs),
            poll_interval: Duration::from_millis(config.confirmation.poll_interval_ms),
            commitment: config.network.commitment,
        }
    }
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self::from_config(&TransferConfig::default())
    }
}

/// Signs, broadcasts and confirms one transaction.
pub struct Submitter {
    client: Arc<dyn RpcCollaborator>,
    config: SubmitterConfig,
    classifier: ErrorClassifier,
}

impl Submitter {
    pub fn new(client: Arc<dyn RpcCollaborator>, config: SubmitterConfig) -> Self {
        let defaults = TransferConfig::default();
        Self {
            client,
            config,
            classifier: ErrorClassifier::new(&defaults.key_env_var, &defaults.network),
        }
    }

    /// Use `classifier` for [`Submitter::submit`] results.
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// Sign, broadcast and confirm, returning a classified result.
    pub async fn submit(
        &self,
        unsigned: UnsignedTransfer,
        wallet: &Wallet,
        shutdown: &ShutdownSignal,
    ) -> SubmissionResult {
        match self.try_submit(unsigned, wallet, shutdown).await {
            Ok(signature) => SubmissionResult::Success { signature },
            Err(e) => SubmissionResult::Failure(self.classifier.classify(&e)),
        }
    }

    /// Sign, broadcast and confirm, returning the raw error on failure.
    pub async fn try_submit(
        &self,
        unsigned: UnsignedTransfer,
        wallet: &Wallet,
        shutdown: &ShutdownSignal,
    ) -> TransferResult<Signature> {
        let tx = wallet.sign(unsigned.message, unsigned.block.blockhash)?;
        let signature = tx.signatures[0];
        tracing::info!(
            signature = %signature,
            last_valid_block_height = unsigned.block.last_valid_block_height,
            "Transaction signed"
        );

        let attempts = self.broadcast(&tx, &signature, shutdown).await?;
        self.await_confirmation(&signature, attempts, shutdown).await?;

        Ok(signature)
    }

    /// Broadcast with retry. Returns the number of attempts used.
    async fn broadcast(
        &self,
        tx: &Transaction,
        signature: &Signature,
        shutdown: &ShutdownSignal,
    ) -> TransferResult<u32> {
        let client = &self.client;
        let mut used = 0;

        let result = retry_with_backoff(&self.config.retry, shutdown, "sendTransaction", |attempt| {
            used = attempt;
            async move {
                if attempt > 1 && already_known(client.as_ref(), signature).await {
                    tracing::info!(signature = %signature, attempt, "Signature already known, not re-sending");
                    return Ok(*signature);
                }
                metrics::record_broadcast_attempt();
                tracing::info!(signature = %signature, attempt, "Sending transaction");
                client.send_transaction(tx).await
            }
        })
        .await;

        match result {
            Ok(returned) => {
                if returned != *signature {
                    tracing::warn!(expected = %signature, returned = %returned, "RPC returned a different signature");
                }
                Ok(used)
            }
            Err(e) => Err(broadcast_error(e)),
        }
    }

    async fn await_confirmation(
        &self,
        signature: &Signature,
        attempts: u32,
        shutdown: &ShutdownSignal,
    ) -> TransferResult<()> {
        let deadline = Deadline::after(self.config.confirmation_timeout);
        let commitment = self.config.commitment.as_config();

        loop {
            // A poll may not outlive the deadline; an unanswered poll counts as pending.
            let poll = timeout(
                deadline.remaining(),
                self.client.signature_status(signature, commitment),
            );
            let status = tokio::select! {
                status = poll => status,
                _ = shutdown.cancelled() => return Err(TransferError::Cancelled { attempts }),
            };

            match status {
                Err(_) => {
                    tracing::debug!(signature = %signature, "Status lookup still running at the deadline");
                }
                Ok(Ok(SignatureStatus::Confirmed)) => {
                    metrics::record_confirmation_time(deadline.elapsed());
                    tracing::info!(
                        signature = %signature,
                        commitment = %self.config.commitment,
                        elapsed_ms = deadline.elapsed().as_millis() as u64,
                        "Transaction confirmed"
                    );
                    return Ok(());
                }
                Ok(Ok(SignatureStatus::Failed(reason))) => {
                    return Err(TransferError::TransactionFailed(reason));
                }
                Ok(Ok(SignatureStatus::Pending)) => {
                    tracing::debug!(signature = %signature, "Transaction pending");
                }
                Ok(Err(e)) => {
                    tracing::warn!(signature = %signature, error = %e, "Status lookup failed, will poll again");
                }
            }

            if deadline.is_expired() {
                return Err(TransferError::ConfirmationTimeout {
                    signature: *signature,
                    waited: deadline.elapsed(),
                });
            }

            let wait = deadline.next_wait(self.config.poll_interval);
            if sleep_unless_cancelled(wait, shutdown).await.is_err() {
                return Err(TransferError::Cancelled { attempts });
            }
        }
    }
}

/// Whether the network has already seen `signature` at any commitment.
///
/// A failed lookup counts as "not known" so the caller re-sends.
async fn already_known(client: &dyn RpcCollaborator, signature: &Signature) -> bool {
    match client
        .signature_status(signature, CommitmentConfig::processed())
        .await
    {
        Ok(SignatureStatus::Pending) => false,
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(signature = %signature, error = %e, "Signature lookup failed before re-send");
            false
        }
    }
}

fn broadcast_error(err: RetryError<RpcFailure>) -> TransferError {
    match err {
        RetryError::Permanent(RpcFailure::Rejected(reason)) => TransferError::BroadcastRejected(reason),
        RetryError::Permanent(RpcFailure::Transient(reason)) => TransferError::NetworkUnavailable {
            attempts: 1,
            last_error: reason,
        },
        RetryError::Exhausted { attempts, last } => TransferError::NetworkUnavailable {
            attempts,
            last_error: last.to_string(),
        },
        RetryError::Cancelled { attempts } => TransferError::Cancelled { attempts },
    }
}
