//! Shared utilities for integration tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use devnet_transfer::blockchain::{
    BlockReference, RpcCollaborator, RpcFailure, SignatureStatus, TransactionBuilder,
    TransferRequest, UnsignedTransfer, Wallet,
};
use devnet_transfer::config::TransferConfig;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::Transaction;

/// How the stub answers `sendTransaction`.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum SendBehavior {
    Accept,
    AlwaysTransient,
    /// Fail transiently this many times, then accept.
    TransientThenAccept(u32),
    Reject(String),
    /// The transaction lands but the response is lost.
    LandThenTransient,
}

/// How the stub answers status polls at the requested commitment.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum StatusBehavior {
    ConfirmImmediately,
    /// Report pending for this many polls, then confirmed.
    ConfirmAfter(u32),
    NeverConfirm,
    FailOnChain(String),
    /// Every status call takes this long, then reports pending.
    SlowPending(Duration),
}

/// Programmable RPC collaborator that counts every call.
pub struct StubRpc {
    send: SendBehavior,
    status: StatusBehavior,
    blockhash_available: bool,
    blockhash: Hash,
    landed: Mutex<HashSet<Signature>>,
    pub sent: Mutex<Vec<Signature>>,
    pub blockhash_calls: AtomicU32,
    pub send_calls: AtomicU32,
    pub lookup_calls: AtomicU32,
    pub poll_calls: AtomicU32,
}

#[allow(dead_code)]
impl StubRpc {
    pub fn new(send: SendBehavior, status: StatusBehavior) -> Arc<Self> {
        Arc::new(Self::build(send, status, true))
    }

    /// A stub whose `getLatestBlockhash` always fails transiently.
    pub fn without_blockhash() -> Arc<Self> {
        Arc::new(Self::build(
            SendBehavior::Accept,
            StatusBehavior::ConfirmImmediately,
            false,
        ))
    }

    fn build(send: SendBehavior, status: StatusBehavior, blockhash_available: bool) -> Self {
        Self {
            send,
            status,
            blockhash_available,
            blockhash: Hash::new_unique(),
            landed: Mutex::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
            blockhash_calls: AtomicU32::new(0),
            send_calls: AtomicU32::new(0),
            lookup_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
        }
    }

    pub fn sends(&self) -> u32 {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u32 {
        self.blockhash_calls.load(Ordering::SeqCst)
            + self.send_calls.load(Ordering::SeqCst)
            + self.lookup_calls.load(Ordering::SeqCst)
            + self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn block_reference(&self) -> BlockReference {
        BlockReference {
            blockhash: self.blockhash,
            last_valid_block_height: 150,
        }
    }

    fn land(&self, signature: Signature) {
        self.landed.lock().unwrap().insert(signature);
    }
}

#[async_trait]
impl RpcCollaborator for StubRpc {
    async fn latest_block_reference(&self) -> Result<BlockReference, RpcFailure> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        if self.blockhash_available {
            Ok(self.block_reference())
        } else {
            Err(RpcFailure::Transient("connection refused".to_string()))
        }
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, RpcFailure> {
        let call = self.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let signature = tx.signatures[0];

        match &self.send {
            SendBehavior::Accept => {}
            SendBehavior::AlwaysTransient => {
                return Err(RpcFailure::Transient("connection reset by peer".to_string()))
            }
            SendBehavior::TransientThenAccept(failures) if call <= *failures => {
                return Err(RpcFailure::Transient("503 Service Unavailable".to_string()))
            }
            SendBehavior::TransientThenAccept(_) => {}
            SendBehavior::Reject(reason) => return Err(RpcFailure::Rejected(reason.clone())),
            SendBehavior::LandThenTransient => {
                self.land(signature);
                return Err(RpcFailure::Transient("request timed out".to_string()));
            }
        }

        self.land(signature);
        self.sent.lock().unwrap().push(signature);
        Ok(signature)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<SignatureStatus, RpcFailure> {
        let landed = self.landed.lock().unwrap().contains(signature);

        if commitment.commitment == CommitmentLevel::Processed {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(if landed {
                SignatureStatus::Confirmed
            } else {
                SignatureStatus::Pending
            });
        }

        let poll = self.poll_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let StatusBehavior::SlowPending(delay) = &self.status {
            tokio::time::sleep(*delay).await;
            return Ok(SignatureStatus::Pending);
        }
        if !landed {
            return Ok(SignatureStatus::Pending);
        }
        Ok(match &self.status {
            StatusBehavior::ConfirmImmediately => SignatureStatus::Confirmed,
            StatusBehavior::ConfirmAfter(pending) if poll > *pending => SignatureStatus::Confirmed,
            StatusBehavior::ConfirmAfter(_)
            | StatusBehavior::NeverConfirm
            | StatusBehavior::SlowPending(_) => SignatureStatus::Pending,
            StatusBehavior::FailOnChain(reason) => SignatureStatus::Failed(reason.clone()),
        })
    }
}

/// Config with deterministic backoff.
#[allow(dead_code)]
pub fn test_config() -> TransferConfig {
    let mut config = TransferConfig::default();
    config.retries.jitter = false;
    config
}

/// A fresh key encoded the way the key variable holds it.
#[allow(dead_code)]
pub fn key_json(keypair: &Keypair) -> String {
    serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap()
}

/// A wallet plus a self-transfer built against the stub's blockhash.
#[allow(dead_code)]
pub fn transfer_setup(stub: &StubRpc) -> (Wallet, UnsignedTransfer) {
    let wallet = Wallet::from_keypair(Keypair::new());
    let request = TransferRequest::to_self(wallet.pubkey(), 1_000_000);
    let unsigned = TransactionBuilder::default()
        .build(request, stub.block_reference())
        .unwrap();
    (wallet, unsigned)
}
