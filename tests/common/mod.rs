// Shared test doubles for the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::prelude::*;
use parking_lot::Mutex;
use serde_json::json;
use solana_sdk::hash::Hash;
use solana_sdk::message::{Message, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::VersionedTransaction;
use spl_associated_token_account::get_associated_token_address_with_program_id;
use swapdeck::{
    Finalization, KeypairSigner, Ledger, ProgramVariant, Result, SimulationReport, SwapError, TokenAccountBalance,
    TokenInfo, TokenMetadataSource, TransactionSigner,
};

/// In-memory ledger. Simulations succeed unless a report is queued, and
/// every sent transaction finalizes unless told otherwise.
pub struct MockLedger {
    pub blockhash: Hash,
    lamports: Mutex<u64>,
    accounts: Mutex<HashMap<Pubkey, Vec<TokenAccountBalance>>>,
    owners: Mutex<HashMap<Pubkey, Pubkey>>,
    fail_listing: Mutex<bool>,
    simulations: Mutex<VecDeque<SimulationReport>>,
    finalization: Mutex<Finalization>,
    logs: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<VersionedTransaction>>,
    pub simulated: Mutex<Vec<VersionedTransaction>>,
    /// `(signature, recent_blockhash)` for every finalization wait.
    pub awaited: Mutex<Vec<(Signature, Hash)>>,
    pub listing_calls: AtomicUsize,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self {
            blockhash: Hash::new_unique(),
            lamports: Mutex::new(0),
            accounts: Mutex::new(HashMap::new()),
            owners: Mutex::new(HashMap::new()),
            fail_listing: Mutex::new(false),
            simulations: Mutex::new(VecDeque::new()),
            finalization: Mutex::new(Finalization::Finalized),
            logs: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            simulated: Mutex::new(Vec::new()),
            awaited: Mutex::new(Vec::new()),
            listing_calls: AtomicUsize::new(0),
        }
    }
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_lamports(&self, lamports: u64) {
        *self.lamports.lock() = lamports;
    }

    pub fn add_token_account(&self, variant: ProgramVariant, mint: &str, ui_amount: f64) {
        self.accounts
            .lock()
            .entry(variant.program_id())
            .or_default()
            .push(TokenAccountBalance {
                mint: mint.to_string(),
                ui_amount,
            });
    }

    pub fn set_owner(&self, address: Pubkey, owner: Pubkey) {
        self.owners.lock().insert(address, owner);
    }

    /// Registers `mint` under `variant` and, when `with_account` is set, the
    /// wallet's associated account for it.
    pub fn add_mint(&self, wallet: &Pubkey, mint: &Pubkey, variant: ProgramVariant, with_account: bool) -> Pubkey {
        let program_id = variant.program_id();
        self.set_owner(*mint, program_id);
        let ata = get_associated_token_address_with_program_id(wallet, mint, &program_id);
        if with_account {
            self.set_owner(ata, program_id);
        }
        ata
    }

    pub fn fail_listings(&self) {
        *self.fail_listing.lock() = true;
    }

    pub fn restore_listings(&self) {
        *self.fail_listing.lock() = false;
    }

    pub fn queue_simulation(&self, report: SimulationReport) {
        self.simulations.lock().push_back(report);
    }

    pub fn fail_next_simulation(&self, err: &str, logs: &[&str]) {
        self.queue_simulation(SimulationReport {
            err: Some(err.to_string()),
            logs: logs.iter().map(|l| l.to_string()).collect(),
            units_consumed: None,
        });
    }

    pub fn set_finalization(&self, finalization: Finalization, logs: &[&str]) {
        *self.finalization.lock() = finalization;
        *self.logs.lock() = logs.iter().map(|l| l.to_string()).collect();
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn native_balance(&self, _owner: &Pubkey) -> Result<u64> {
        if *self.fail_listing.lock() {
            return Err(SwapError::Rpc("connection refused".to_string()));
        }
        Ok(*self.lamports.lock())
    }

    async fn token_accounts_by_owner(&self, _owner: &Pubkey, program_id: &Pubkey) -> Result<Vec<TokenAccountBalance>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_listing.lock() {
            return Err(SwapError::Rpc("connection refused".to_string()));
        }
        Ok(self.accounts.lock().get(program_id).cloned().unwrap_or_default())
    }

    async fn account_owner(&self, address: &Pubkey) -> Result<Option<Pubkey>> {
        Ok(self.owners.lock().get(address).copied())
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.blockhash)
    }

    async fn simulate(&self, transaction: &VersionedTransaction) -> Result<SimulationReport> {
        self.simulated.lock().push(transaction.clone());
        Ok(self.simulations.lock().pop_front().unwrap_or(SimulationReport {
            err: None,
            logs: vec!["Program log: ok".to_string()],
            units_consumed: Some(42_000),
        }))
    }

    async fn send(&self, transaction: &VersionedTransaction) -> Result<Signature> {
        self.sent.lock().push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn await_finalization(&self, signature: &Signature, recent_blockhash: &Hash) -> Result<Finalization> {
        self.awaited.lock().push((*signature, *recent_blockhash));
        Ok(self.finalization.lock().clone())
    }

    async fn transaction_logs(&self, _signature: &Signature) -> Result<Vec<String>> {
        Ok(self.logs.lock().clone())
    }
}

/// Keypair signer that counts calls and can be told to refuse.
pub struct CountingSigner {
    inner: KeypairSigner,
    pub calls: AtomicUsize,
    reject: bool,
}

impl CountingSigner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: KeypairSigner::new(Keypair::new()),
            calls: AtomicUsize::new(0),
            reject: false,
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            inner: KeypairSigner::new(Keypair::new()),
            calls: AtomicUsize::new(0),
            reject: true,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSigner for CountingSigner {
    fn pubkey(&self) -> Pubkey {
        self.inner.pubkey()
    }

    async fn sign_and_broadcast(&self, transaction: VersionedTransaction, ledger: &dyn Ledger) -> Result<Signature> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(SwapError::Signing("User rejected the request".to_string()));
        }
        self.inner.sign_and_broadcast(transaction, ledger).await
    }
}

/// Metadata keyed by mint; anything else resolves to the fallback.
#[derive(Default)]
pub struct StaticMetadata {
    entries: HashMap<String, TokenInfo>,
}

impl StaticMetadata {
    pub fn with(mut self, mint: &str, symbol: &str, decimals: u8) -> Self {
        self.entries.insert(
            mint.to_string(),
            TokenInfo {
                name: format!("{} Token", symbol),
                symbol: symbol.to_string(),
                address: mint.to_string(),
                decimals,
            },
        );
        self
    }
}

#[async_trait]
impl TokenMetadataSource for StaticMetadata {
    async fn resolve(&self, mint: &str) -> TokenInfo {
        self.entries.get(mint).cloned().unwrap_or_else(TokenInfo::unknown)
    }
}

/// A transfer paid for by `fee_payer`, encoded the way the swap endpoint
/// returns transactions.
pub fn encoded_swap_transaction(fee_payer: &Pubkey) -> String {
    let ix = solana_sdk::system_instruction::transfer(fee_payer, &Pubkey::new_unique(), 1);
    let tx = VersionedTransaction {
        signatures: vec![Signature::default()],
        message: VersionedMessage::Legacy(Message::new(&[ix], Some(fee_payer))),
    };
    BASE64_STANDARD.encode(bincode::serialize(&tx).unwrap())
}

pub fn quote_body(input_mint: &str, output_mint: &str, in_amount: u64, out_amount: u64, fee_mint: &str) -> String {
    json!({
        "inputMint": input_mint,
        "inAmount": in_amount.to_string(),
        "outputMint": output_mint,
        "outAmount": out_amount.to_string(),
        "otherAmountThreshold": out_amount.to_string(),
        "slippageBps": 50,
        "routePlan": [
            {
                "swapInfo": {"ammKey": "amm1", "label": "Whirlpool", "feeAmount": "5000", "feeMint": fee_mint},
                "percent": 100
            }
        ]
    })
    .to_string()
}

pub fn swap_body(fee_payer: &Pubkey) -> String {
    json!({"swapTransaction": encoded_swap_transaction(fee_payer), "lastValidBlockHeight": 1000}).to_string()
}
