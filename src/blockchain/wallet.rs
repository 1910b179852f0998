//! Wallet management and transaction signing.
//!
//! # Security
//! - Key material comes ONLY from the key loader (environment variable)
//! - Keys are never logged or serialized
//! - The wallet is not `Clone`; one run owns exactly one keypair

use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::signer::keypair::keypair_from_seed;
use solana_sdk::transaction::Transaction;

use crate::blockchain::key_loader::SecretKeyMaterial;
use crate::blockchain::types::{TransferError, TransferResult};

/// Signing wallet derived from 64 bytes of key material.
pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    /// Derive the keypair from the 32-byte seed, consuming the key material.
    ///
    /// Fails when the public half does not belong to the secret half.
    pub fn from_key_material(material: SecretKeyMaterial) -> TransferResult<Self> {
        let bytes = material.expose();
        let keypair = keypair_from_seed(&bytes[..32])
            .map_err(|e| TransferError::InvalidKeypair(e.to_string()))?;

        if keypair.pubkey().to_bytes()[..] != bytes[32..] {
            return Err(TransferError::InvalidKeypair(
                "public key does not match secret key".to_string(),
            ));
        }

        tracing::info!(pubkey = %keypair.pubkey(), "Wallet initialized");

        Ok(Self { keypair })
    }

    /// Wrap an existing keypair.
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Get the wallet's public key.
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Sign `message` against `blockhash`.
    ///
    /// Fails when this wallet is not a required signer of the message.
    pub fn sign(&self, message: Message, blockhash: Hash) -> TransferResult<Transaction> {
        let mut tx = Transaction::new_unsigned(message);
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|e| TransferError::SigningFailed(e.to_string()))?;
        Ok(tx)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
