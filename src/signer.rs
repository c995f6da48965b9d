use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::VersionedTransaction;
use tracing::info;

use crate::error::{Result, SwapError};
use crate::ledger::Ledger;

/// The wallet side of the pipeline: signs a prepared transaction and
/// broadcasts it, returning the signature or failing.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    async fn sign_and_broadcast(&self, transaction: VersionedTransaction, ledger: &dyn Ledger) -> Result<Signature>;
}

/// Signs with a local keypair. Used by the headless driver.
#[derive(Clone)]
pub struct KeypairSigner {
    keypair: Arc<Keypair>,
}

impl std::fmt::Debug for KeypairSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish()
    }
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Builds a signer from a base58-encoded 64-byte secret key.
    pub fn from_base58(wallet_private_key_bs58: &str) -> Result<Self> {
        let private_key_bytes = bs58::decode(wallet_private_key_bs58)
            .into_vec()
            .map_err(|e| SwapError::ConfigError(format!("Invalid base58 private key: {}", e)))?;

        let keypair = Keypair::from_bytes(&private_key_bytes)
            .map_err(|e| SwapError::ConfigError(format!("Failed to create keypair from bytes: {}", e)))?;

        info!(signer_pubkey = %keypair.pubkey(), "Keypair signer initialized");
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_and_broadcast(&self, transaction: VersionedTransaction, ledger: &dyn Ledger) -> Result<Signature> {
        let signed = VersionedTransaction::try_new(transaction.message, &[self.keypair.as_ref()])
            .map_err(|e| SwapError::Signing(format!("Failed to sign transaction: {}", e)))?;
        info!(signature = %signed.signatures[0], "Transaction signed");
        ledger.send(&signed).await
    }
}
