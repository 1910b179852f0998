//! End-to-end transfer pipeline.
//!
//! Composes key loading, building, submission and classification into one
//! call that always yields a [`TransferReport`]. Printing and exit codes
//! are left to the caller (see `report.rs`).

use std::str::FromStr;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::{
    BlockReference, ErrorClassifier, RpcCollaborator, RpcFailure, SecretKeyMaterial,
    SubmissionResult, Submitter, SubmitterConfig, TransactionBuilder, TransferError,
    TransferRequest, TransferResult, UnsignedTransfer, Wallet,
};
use crate::config::TransferConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::{retry_with_backoff, RetryError, RetryPolicy};

/// Everything the boundary layer needs to report a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub run_id: Uuid,
    /// Known once the key has been loaded.
    pub payer: Option<Pubkey>,
    /// Known once the request has been formed.
    pub request: Option<TransferRequest>,
    pub result: SubmissionResult,
    /// Explorer link for the signature, on success.
    pub explorer_url: Option<String>,
}

impl TransferReport {
    /// Process exit code: 0 on success, the category's code otherwise.
    pub fn exit_code(&self) -> u8 {
        match &self.result {
            SubmissionResult::Success { .. } => 0,
            SubmissionResult::Failure(classified) => classified.category.exit_code(),
        }
    }
}

#[derive(Default)]
struct RunDetails {
    payer: Option<Pubkey>,
    request: Option<TransferRequest>,
}

/// One configured transfer pipeline.
pub struct TransferPipeline {
    config: TransferConfig,
    client: Arc<dyn RpcCollaborator>,
    builder: TransactionBuilder,
    submitter: Submitter,
    classifier: ErrorClassifier,
}

impl TransferPipeline {
    pub fn new(config: TransferConfig, client: Arc<dyn RpcCollaborator>) -> Self {
        let classifier = ErrorClassifier::new(&config.key_env_var, &config.network);
        let submitter = Submitter::new(client.clone(), SubmitterConfig::from_config(&config))
            .with_classifier(classifier.clone());

        Self {
            builder: TransactionBuilder::from_params(&config.transfer),
            config,
            client,
            submitter,
            classifier,
        }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Run one transfer with the key read from the configured variable.
    pub async fn run_from_env(&self, shutdown: &ShutdownSignal) -> TransferReport {
        let key = SecretKeyMaterial::from_env(&self.config.key_env_var);
        self.run_with_key(key, shutdown).await
    }

    /// Run one transfer.
    ///
    /// `raw_key` is the value of the key variable as looked up by the caller;
    /// `None` means the variable is unset. Key and request problems are
    /// reported before any network call is made.
    pub async fn run(&self, raw_key: Option<&str>, shutdown: &ShutdownSignal) -> TransferReport {
        let key = SecretKeyMaterial::from_lookup(&self.config.key_env_var, raw_key);
        self.run_with_key(key, shutdown).await
    }

    async fn run_with_key(
        &self,
        key: TransferResult<SecretKeyMaterial>,
        shutdown: &ShutdownSignal,
    ) -> TransferReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("transfer", %run_id);

        async {
            let mut details = RunDetails::default();

            let result = match self.prepare(key, shutdown, &mut details).await {
                Ok((unsigned, wallet)) => self.submitter.submit(unsigned, &wallet, shutdown).await,
                Err(e) => SubmissionResult::Failure(self.classifier.classify(&e)),
            };

            let explorer_url = match &result {
                SubmissionResult::Success { signature } => {
                    let url = self.config.network.explorer_url(&signature.to_string());
                    tracing::info!(signature = %signature, explorer_url = %url, "Transfer succeeded");
                    Some(url)
                }
                SubmissionResult::Failure(classified) => {
                    tracing::error!(
                        category = %classified.category,
                        error = %classified.message,
                        "Transfer failed"
                    );
                    None
                }
            };

            metrics::record_outcome(match &result {
                SubmissionResult::Success { .. } => "Success",
                SubmissionResult::Failure(classified) => classified.category.as_str(),
            });

            TransferReport {
                run_id,
                payer: details.payer,
                request: details.request,
                result,
                explorer_url,
            }
        }
        .instrument(span)
        .await
    }

    /// Everything up to a built, unsigned transfer and the wallet to sign it.
    async fn prepare(
        &self,
        key: TransferResult<SecretKeyMaterial>,
        shutdown: &ShutdownSignal,
        details: &mut RunDetails,
    ) -> TransferResult<(UnsignedTransfer, Wallet)> {
        let wallet = Wallet::from_key_material(key?)?;
        let payer = wallet.pubkey();
        details.payer = Some(payer);

        let request = TransferRequest {
            from: payer,
            to: self.recipient(payer)?,
            lamports: self.config.transfer.lamports,
        };
        request.validate()?;
        details.request = Some(request);

        tracing::info!(
            payer = %payer,
            recipient = %request.to,
            lamports = request.lamports,
            "Preparing transfer"
        );

        let block = self.fetch_block_reference(shutdown).await?;
        let unsigned = self.builder.build(request, block)?;

        Ok((unsigned, wallet))
    }

    fn recipient(&self, payer: Pubkey) -> TransferResult<Pubkey> {
        let recipient = self.config.transfer.recipient.trim();
        if recipient.is_empty() {
            return Ok(payer);
        }
        Pubkey::from_str(recipient).map_err(|_| TransferError::InvalidRecipient(recipient.to_string()))
    }

    async fn fetch_block_reference(&self, shutdown: &ShutdownSignal) -> TransferResult<BlockReference> {
        let policy = RetryPolicy::from(&self.config.retries);
        let client = &self.client;

        retry_with_backoff(&policy, shutdown, "getLatestBlockhash", |_| client.latest_block_reference())
            .await
            .map_err(|e| match e {
                RetryError::Permanent(RpcFailure::Rejected(reason))
                | RetryError::Permanent(RpcFailure::Transient(reason)) => {
                    TransferError::NetworkUnavailable {
                        attempts: 1,
                        last_error: reason,
                    }
                }
                RetryError::Exhausted { attempts, last } => TransferError::NetworkUnavailable {
                    attempts,
                    last_error: last.to_string(),
                },
                RetryError::Cancelled { .. } => TransferError::Cancelled { attempts: 0 },
            })
    }
}
