use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use solana_account_decoder::UiAccountData;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcSimulateTransactionConfig, RpcTransactionConfig};
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::UiTransactionEncoding;
use tracing::{debug, warn};

use super::{Finalization, Ledger, SimulationReport, TokenAccountBalance};
use crate::error::{Result, SwapError};

#[derive(Deserialize)]
struct ParsedTokenAccount {
    info: ParsedTokenAccountInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenAccountInfo {
    mint: String,
    token_amount: ParsedTokenAmount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenAmount {
    ui_amount: Option<f64>,
}

/// Reads the `jsonParsed` body of a token account.
pub(crate) fn parse_token_account_value(parsed: &Value) -> Option<TokenAccountBalance> {
    let account: ParsedTokenAccount = serde_json::from_value(parsed.clone()).ok()?;
    Some(TokenAccountBalance {
        mint: account.info.mint,
        ui_amount: account.info.token_amount.ui_amount.unwrap_or(0.0),
    })
}

/// Delay between signature status polls while waiting for finalization.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// [`Ledger`] backed by a Solana JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcLedger {
    rpc_client: Arc<RpcClient>,
    poll_interval: Duration,
}

impl std::fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedger")
            .field("rpc_url", &self.rpc_client.url())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl RpcLedger {
    pub fn new(rpc_url: &str, timeout: Duration) -> Self {
        let rpc_client = RpcClient::new_with_timeout_and_commitment(
            rpc_url.to_string(),
            timeout,
            CommitmentConfig::confirmed(),
        );
        Self::from_client(Arc::new(rpc_client))
    }

    pub fn from_client(rpc_client: Arc<RpcClient>) -> Self {
        Self {
            rpc_client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn native_balance(&self, owner: &Pubkey) -> Result<u64> {
        self.rpc_client
            .get_balance(owner)
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get balance for {}: {}", owner, e)))
    }

    async fn token_accounts_by_owner(&self, owner: &Pubkey, program_id: &Pubkey) -> Result<Vec<TokenAccountBalance>> {
        let accounts = self
            .rpc_client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(*program_id))
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to list token accounts under {}: {}", program_id, e)))?;

        let mut balances = Vec::with_capacity(accounts.len());
        for keyed in accounts {
            let parsed = match &keyed.account.data {
                UiAccountData::Json(parsed) => parse_token_account_value(&parsed.parsed),
                _ => None,
            };
            match parsed {
                Some(balance) => balances.push(balance),
                None => warn!(account = %keyed.pubkey, "Skipping token account without parsed data"),
            }
        }
        debug!(%owner, %program_id, count = balances.len(), "Fetched token accounts");
        Ok(balances)
    }

    async fn account_owner(&self, address: &Pubkey) -> Result<Option<Pubkey>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, self.rpc_client.commitment())
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get account {}: {}", address, e)))?;
        Ok(response.value.map(|account| account.owner))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.rpc_client
            .get_latest_blockhash()
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to get latest blockhash: {}", e)))
    }

    async fn simulate(&self, transaction: &VersionedTransaction) -> Result<SimulationReport> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: false,
            commitment: Some(self.rpc_client.commitment()),
            ..Default::default()
        };
        let result = self
            .rpc_client
            .simulate_transaction_with_config(transaction, config)
            .await
            .map_err(|e| SwapError::Rpc(format!("RPC simulation failed: {}", e)))?;

        Ok(SimulationReport {
            err: result.value.err.map(|err| err.to_string()),
            logs: result.value.logs.unwrap_or_default(),
            units_consumed: result.value.units_consumed,
        })
    }

    async fn send(&self, transaction: &VersionedTransaction) -> Result<Signature> {
        self.rpc_client
            .send_transaction(transaction)
            .await
            .map_err(|e| SwapError::Signing(format!("Broadcast failed: {}", e)))
    }

    async fn await_finalization(&self, signature: &Signature, recent_blockhash: &Hash) -> Result<Finalization> {
        let finalized = CommitmentConfig::finalized();
        let mut polls = 0u32;
        loop {
            // Validity is read before the status: once the finalized bank
            // rejects the blockhash, any landing is already visible there.
            let blockhash_valid = self
                .rpc_client
                .is_blockhash_valid(recent_blockhash, finalized)
                .await
                .map_err(|e| SwapError::confirmation(signature, e.to_string(), Vec::new()))?;

            let status = self
                .rpc_client
                .get_signature_status_with_commitment(signature, finalized)
                .await
                .map_err(|e| SwapError::confirmation(signature, e.to_string(), Vec::new()))?;
            polls += 1;

            match status {
                Some(Ok(())) => {
                    debug!(%signature, polls, "Transaction finalized");
                    return Ok(Finalization::Finalized);
                }
                Some(Err(err)) => return Ok(Finalization::Failed(err.to_string())),
                None if !blockhash_valid => {
                    warn!(%signature, %recent_blockhash, polls, "Blockhash expired before the transaction finalized");
                    return Ok(Finalization::Failed(format!(
                        "transaction expired: blockhash {} is no longer valid",
                        recent_blockhash
                    )));
                }
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }

    async fn transaction_logs(&self, signature: &Signature) -> Result<Vec<String>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };
        let transaction = self
            .rpc_client
            .get_transaction_with_config(signature, config)
            .await
            .map_err(|e| SwapError::Rpc(format!("Failed to fetch transaction {}: {}", signature, e)))?;

        let logs = match transaction.transaction.meta.map(|meta| meta.log_messages) {
            Some(OptionSerializer::Some(logs)) => logs,
            _ => Vec::new(),
        };
        Ok(logs)
    }
}
