use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use swapdeck::config::Settings;
use swapdeck::error::{log_error, Result as SwapResult, SwapError};
use swapdeck::monitoring::{check_log_directory, init_logging, rotate_logs};
use swapdeck::{
    CachedMetadata, HoldingsAggregator, JupiterClient, KeypairSigner, Ledger, QuoteEngine, RpcLedger, SwapExecutor,
    SwapSession, TokenMetadataSource, TransactionSigner,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> SwapResult<()> {
    // Load .env file first
    dotenv().ok();

    let settings = Settings::from_env()?;

    let console_level = std::env::var("RUST_LOG").unwrap_or_else(|_| settings.log_level.clone());
    let _guard = init_logging(&settings.log_dir, "debug", &console_level)?;
    if let Err(e) = rotate_logs(&settings.log_dir).and_then(|_| check_log_directory(&settings.log_dir)) {
        warn!(error = %e, "Log directory maintenance failed");
    }

    info!("Starting swapdeck...");
    info!(rpc = %settings.solana_rpc_url, quote_api = %settings.quote_api_url, "Configuration loaded");

    let private_key = settings
        .wallet_private_key
        .as_deref()
        .ok_or_else(|| SwapError::ConfigError("WALLET_PRIVATE_KEY is required".to_string()))?;
    let signer: Arc<dyn TransactionSigner> = Arc::new(KeypairSigner::from_base58(private_key)?);

    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let ledger: Arc<dyn Ledger> = Arc::new(RpcLedger::new(&settings.solana_rpc_url, timeout));
    let jupiter = Arc::new(JupiterClient::new(
        &settings.quote_api_url,
        &settings.token_api_url,
        settings.slippage_bps,
        timeout,
    )?);
    let metadata: Arc<dyn TokenMetadataSource> = Arc::new(CachedMetadata::new(jupiter.clone()));

    let quotes = QuoteEngine::new(jupiter.clone(), metadata.clone());
    let session = SwapSession::new(
        HoldingsAggregator::new(ledger.clone(), metadata),
        quotes.clone(),
        SwapExecutor::new(ledger, signer, jupiter, quotes),
    );
    info!(wallet = %session.owner(), "Wallet connected");

    if session.refresh_holdings().await.is_ok() {
        for token in session.snapshot().holdings.unwrap_or_default() {
            info!(symbol = %token.symbol, mint = %token.address, balance = token.balance, "Holding");
        }
    }

    let Some(request) = settings.configured_swap() else {
        info!("No swap configured (SWAP_FROM_MINT, SWAP_TO_MINT, SWAP_AMOUNT); exiting");
        return Ok(());
    };

    session.set_request(request).await;
    let snapshot = session.snapshot();
    match (&snapshot.quote.estimate, &snapshot.quote.error) {
        (Some(estimate), _) => info!(
            out_amount = estimate.out_amount,
            fee = ?estimate.fee,
            "Quote for {} {} -> {}",
            snapshot.request.human_amount,
            snapshot.request.from_mint,
            snapshot.request.to_mint
        ),
        (None, Some(message)) => warn!(%message, "Quote unavailable"),
        (None, None) => warn!("No quote for the configured request"),
    }
    if let Some(validation) = snapshot.validation {
        warn!(%validation, "Swap blocked by validation");
        return Ok(());
    }

    if !settings.execute_swap {
        info!("EXECUTE_SWAP is false; not submitting");
        return Ok(());
    }

    let outcome = session.submit_swap().await?;
    match &outcome.result {
        Ok(receipt) => info!(
            attempt_id = %outcome.attempt_id,
            signature = %receipt.signature,
            created_destination = ?receipt.created_destination,
            "Swap finalized"
        ),
        Err(e) => {
            log_error(e, "Swap");
            for line in e.logs() {
                error!(target: "swap_attempt", attempt_id = %outcome.attempt_id, "{}", line);
            }
        }
    }

    info!("swapdeck shutting down...");
    Ok(())
}
