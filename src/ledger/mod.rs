//! Ledger access used by the swap pipeline.
//!
//! Everything the pipeline needs from the chain goes through [`Ledger`], so
//! the holdings aggregator and the swap executor can run against the RPC
//! client in production and an in-memory double in tests.

mod rpc;

pub use rpc::RpcLedger;

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};

use crate::error::Result;

/// A token account as reported by the parsed-accounts listing.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAccountBalance {
    pub mint: String,
    /// `uiAmount` reported by the ledger, 0 when it reports none
    pub ui_amount: f64,
}

/// Outcome of a transaction simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

impl SimulationReport {
    pub fn succeeded(&self) -> bool {
        self.err.is_none()
    }
}

/// Final state of a broadcast transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Finalization {
    Finalized,
    Failed(String),
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Native balance of `owner`, in lamports.
    async fn native_balance(&self, owner: &Pubkey) -> Result<u64>;

    /// Parsed token accounts held by `owner` under one token program.
    async fn token_accounts_by_owner(&self, owner: &Pubkey, program_id: &Pubkey) -> Result<Vec<TokenAccountBalance>>;

    /// Owning program of `address`, `None` if the account does not exist.
    async fn account_owner(&self, address: &Pubkey) -> Result<Option<Pubkey>>;

    async fn latest_blockhash(&self) -> Result<Hash>;

    async fn simulate(&self, transaction: &VersionedTransaction) -> Result<SimulationReport>;

    async fn send(&self, transaction: &VersionedTransaction) -> Result<Signature>;

    /// Waits until `signature` reaches finalized commitment, or until
    /// `recent_blockhash` expires with the signature still unknown.
    async fn await_finalization(&self, signature: &Signature, recent_blockhash: &Hash) -> Result<Finalization>;

    /// Log lines recorded for a landed transaction.
    async fn transaction_logs(&self, signature: &Signature) -> Result<Vec<String>>;

    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        Ok(self.account_owner(address).await?.is_some())
    }
}
