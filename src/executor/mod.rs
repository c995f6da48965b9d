mod attempt;
mod destination;

use std::sync::Arc;

use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use swapdeck_types::{Quote, SwapAttemptEvent, SwapRequest, SwapStage};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, SwapError};
use crate::jupiter_client::JupiterClient;
use crate::ledger::{Finalization, Ledger};
use crate::quote::QuoteEngine;
use crate::signer::TransactionSigner;
use crate::tokens::parse_pubkey;
use attempt::SwapAttempt;
use destination::ensure_destination_account;

/// Result of a successful swap.
#[derive(Debug, Clone)]
pub struct SwapReceipt {
    pub signature: Signature,
    pub quote: Quote,
    /// Associated account created for the destination mint, if one was needed
    pub created_destination: Option<Pubkey>,
    pub compute_units_consumed: Option<u64>,
}

/// Everything an attempt produced, success or not.
#[derive(Debug)]
pub struct SwapOutcome {
    pub attempt_id: Uuid,
    pub events: Vec<SwapAttemptEvent>,
    /// Stage the attempt failed in, `None` on success
    pub failed_stage: Option<SwapStage>,
    pub result: Result<SwapReceipt>,
}

impl SwapOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    pub fn final_stage(&self) -> SwapStage {
        if self.succeeded() {
            SwapStage::Succeeded
        } else {
            SwapStage::Failed
        }
    }
}

/// Waits for finalization; on failure the transaction's logs are fetched
/// and attached to the error.
pub(crate) async fn confirm_finalized(ledger: &dyn Ledger, signature: &Signature, recent_blockhash: &Hash) -> Result<()> {
    let failure = match ledger.await_finalization(signature, recent_blockhash).await {
        Ok(Finalization::Finalized) => return Ok(()),
        Ok(Finalization::Failed(message)) => message,
        Err(SwapError::Confirmation { message, .. }) => message,
        Err(e) => e.to_string(),
    };

    let logs = match ledger.transaction_logs(signature).await {
        Ok(logs) => logs,
        Err(e) => {
            warn!(%signature, error = %e, "Could not fetch logs for failed transaction");
            Vec::new()
        }
    };
    Err(SwapError::confirmation(signature, failure, logs))
}

/// Runs swap attempts end to end. Nothing is retried; every failure ends
/// the attempt and the user starts over.
#[derive(Clone)]
pub struct SwapExecutor {
    ledger: Arc<dyn Ledger>,
    signer: Arc<dyn TransactionSigner>,
    jupiter: Arc<JupiterClient>,
    quotes: QuoteEngine,
}

impl std::fmt::Debug for SwapExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapExecutor")
            .field("owner", &self.signer.pubkey())
            .finish()
    }
}

impl SwapExecutor {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        signer: Arc<dyn TransactionSigner>,
        jupiter: Arc<JupiterClient>,
        quotes: QuoteEngine,
    ) -> Self {
        Self {
            ledger,
            signer,
            jupiter,
            quotes,
        }
    }

    pub fn owner(&self) -> Pubkey {
        self.signer.pubkey()
    }

    /// Runs one attempt for `request`.
    pub async fn execute(&self, request: &SwapRequest) -> SwapOutcome {
        let mut attempt = SwapAttempt::new(request.clone());
        let result = self.run(&mut attempt).await;

        let failed_stage = match &result {
            Ok(receipt) => {
                attempt.succeed(&receipt.signature);
                None
            }
            Err(e) => Some(attempt.fail(e)),
        };

        SwapOutcome {
            attempt_id: attempt.id(),
            events: attempt.into_events(),
            failed_stage,
            result,
        }
    }

    async fn run(&self, attempt: &mut SwapAttempt) -> Result<SwapReceipt> {
        let request = attempt.request().clone();
        if !request.can_submit() {
            return Err(SwapError::InvalidRequest(
                "source and destination must be set, distinct, and an amount entered".to_string(),
            ));
        }
        let owner = self.signer.pubkey();
        let to_mint = parse_pubkey(&request.to_mint)?;

        attempt.enter(SwapStage::EnsuringDestinationAccount);
        let created_destination =
            ensure_destination_account(self.ledger.as_ref(), self.signer.as_ref(), &owner, &to_mint).await?;

        attempt.enter(SwapStage::FetchingQuote);
        let estimate = self
            .quotes
            .get_quote(&request.from_mint, &request.to_mint, &request.human_amount)
            .await?;

        attempt.enter(SwapStage::FetchingTransactionPayload);
        let mut transaction = self
            .jupiter
            .swap_transaction(&estimate.quote.route_payload, &owner)
            .await?;

        attempt.enter(SwapStage::Simulating);
        self.prepare(&mut transaction, &owner).await?;
        let report = self.ledger.simulate(&transaction).await?;
        if let Some(err) = report.err {
            return Err(SwapError::simulation(SwapStage::Simulating, err, report.logs));
        }
        info!(units_consumed = ?report.units_consumed, "Swap simulation passed");

        attempt.enter(SwapStage::AwaitingSignatureAndBroadcast);
        let recent_blockhash = *transaction.message.recent_blockhash();
        let signature = self
            .signer
            .sign_and_broadcast(transaction, self.ledger.as_ref())
            .await?;

        attempt.enter(SwapStage::Confirming);
        confirm_finalized(self.ledger.as_ref(), &signature, &recent_blockhash).await?;

        Ok(SwapReceipt {
            signature,
            quote: estimate.quote,
            created_destination,
            compute_units_consumed: report.units_consumed,
        })
    }

    /// Attaches a fresh blockhash and checks the fee payer is the owner.
    async fn prepare(&self, transaction: &mut VersionedTransaction, owner: &Pubkey) -> Result<()> {
        let fee_payer = transaction.message.static_account_keys().first().copied();
        if fee_payer != Some(*owner) {
            return Err(SwapError::Aggregator(format!(
                "swap transaction fee payer {:?} does not match wallet {}",
                fee_payer, owner
            )));
        }

        let blockhash = self.ledger.latest_blockhash().await?;
        transaction.message.set_recent_blockhash(blockhash);
        // Signatures over the old blockhash are void; the signer fills these in.
        transaction.signatures =
            vec![Signature::default(); transaction.message.header().num_required_signatures as usize];
        Ok(())
    }
}
