use solana_sdk::message::{Message, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_associated_token_account::instruction::create_associated_token_account;
use swapdeck_types::SwapStage;
use tracing::{info, warn};

use super::confirm_finalized;
use crate::error::{Result, SwapError};
use crate::ledger::Ledger;
use crate::signer::TransactionSigner;
use crate::tokens::classify;

/// Makes sure `owner` has an associated account for `mint`, creating it
/// when absent. Returns the address when it had to be created.
///
/// The creation transaction is simulated first and only broadcast if the
/// simulation is clean; it must finalize before the swap may proceed.
pub(crate) async fn ensure_destination_account(
    ledger: &dyn Ledger,
    signer: &dyn TransactionSigner,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Option<Pubkey>> {
    let variant = classify(ledger, mint).await?;
    let program_id = variant.program_id();
    let destination = get_associated_token_address_with_program_id(owner, mint, &program_id);

    if ledger.account_exists(&destination).await? {
        info!(%destination, %mint, "Destination account exists");
        return Ok(None);
    }

    info!(%destination, %mint, %variant, "Creating destination account");
    let instruction = create_associated_token_account(owner, owner, mint, &program_id);
    let blockhash = ledger.latest_blockhash().await?;
    let message = Message::new_with_blockhash(&[instruction], Some(owner), &blockhash);
    let transaction = VersionedTransaction {
        signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
        message: VersionedMessage::Legacy(message),
    };

    let report = ledger.simulate(&transaction).await?;
    if let Some(err) = report.err {
        warn!(%destination, error = %err, "Destination account creation failed simulation");
        return Err(SwapError::simulation(SwapStage::EnsuringDestinationAccount, err, report.logs));
    }

    let signature = signer.sign_and_broadcast(transaction, ledger).await?;
    confirm_finalized(ledger, &signature, &blockhash).await?;
    info!(%destination, %signature, "Destination account created");
    Ok(Some(destination))
}
