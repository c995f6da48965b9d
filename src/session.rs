//! State behind the swap form.
//!
//! Each piece of state has one writer and is replaced whole: the holdings
//! snapshot by [`SwapSession::refresh_holdings`], the quote display by the
//! [`QuoteTracker`], the validation result by `revalidate`. Swap attempts
//! run one at a time and always end with a holdings refresh.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use solana_sdk::pubkey::Pubkey;
use swapdeck_types::{SwapRequest, SwapStage, Token};
use tracing::{info, warn};

use crate::error::{log_error, Result, SwapError, ValidationError};
use crate::executor::{SwapExecutor, SwapOutcome};
use crate::holdings::HoldingsAggregator;
use crate::quote::{QuoteDisplay, QuoteEngine, QuoteTracker};
use crate::tokens::filtered_to_tokens;
use crate::validation::validate;

/// Short record of the last finished attempt, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapSummary {
    pub stage: SwapStage,
    pub signature: Option<String>,
    pub message: Option<String>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    holdings: Option<Vec<Token>>,
    holdings_unavailable: bool,
    holdings_loaded_at: Option<DateTime<Utc>>,
    request: SwapRequest,
    validation: Option<ValidationError>,
    last_swap: Option<SwapSummary>,
}

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub owner: Pubkey,
    /// `None` until the first successful load
    pub holdings: Option<Vec<Token>>,
    pub holdings_unavailable: bool,
    pub holdings_loaded_at: Option<DateTime<Utc>>,
    pub request: SwapRequest,
    pub quote: QuoteDisplay,
    pub validation: Option<ValidationError>,
    pub swap_in_flight: bool,
    pub last_swap: Option<SwapSummary>,
}

impl SessionSnapshot {
    pub fn can_submit(&self) -> bool {
        self.request.can_submit() && self.validation.is_none() && !self.swap_in_flight
    }
}

/// Clears the in-flight flag however the attempt ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SwapSession {
    holdings: HoldingsAggregator,
    quotes: QuoteEngine,
    tracker: QuoteTracker,
    executor: SwapExecutor,
    owner: Pubkey,
    state: RwLock<SessionState>,
    in_flight: AtomicBool,
}

impl SwapSession {
    pub fn new(holdings: HoldingsAggregator, quotes: QuoteEngine, executor: SwapExecutor) -> Self {
        let owner = executor.owner();
        Self {
            holdings,
            quotes,
            tracker: QuoteTracker::new(),
            executor,
            owner,
            state: RwLock::new(SessionState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn owner(&self) -> Pubkey {
        self.owner
    }

    /// Reloads the wallet's holdings. On failure the previous snapshot is
    /// kept and marked unavailable.
    pub async fn refresh_holdings(&self) -> Result<()> {
        match self.holdings.load_holdings(&self.owner).await {
            Ok(tokens) => {
                {
                    let mut state = self.state.write();
                    state.holdings = Some(tokens);
                    state.holdings_unavailable = false;
                    state.holdings_loaded_at = Some(Utc::now());
                }
                self.revalidate();
                Ok(())
            }
            Err(e) => {
                log_error(&e, "Loading wallet holdings");
                self.state.write().holdings_unavailable = true;
                Err(e)
            }
        }
    }

    pub async fn set_from_mint(&self, mint: &str) {
        self.state.write().request.from_mint = mint.to_string();
        self.on_request_changed().await;
    }

    pub async fn set_to_mint(&self, mint: &str) {
        self.state.write().request.to_mint = mint.to_string();
        self.on_request_changed().await;
    }

    pub async fn set_amount(&self, human_amount: &str) {
        self.state.write().request.human_amount = human_amount.to_string();
        self.on_request_changed().await;
    }

    pub async fn set_request(&self, request: SwapRequest) {
        self.state.write().request = request;
        self.on_request_changed().await;
    }

    async fn on_request_changed(&self) {
        self.revalidate();
        let request = self.state.read().request.clone();
        if !request.is_complete() {
            self.tracker.reset();
            return;
        }
        if self.tracker.refresh(&self.quotes, &request).await.is_some() {
            // The fee may have changed with the new quote.
            self.revalidate();
        }
    }

    fn revalidate(&self) {
        let display = self.tracker.display();
        let mut state = self.state.write();
        // Only a fee quoted for exactly these inputs applies.
        let fee = display
            .fee()
            .filter(|_| display.request.as_ref() == Some(&state.request));
        let holdings = state.holdings.as_deref().unwrap_or(&[]);
        state.validation = validate(holdings, &state.request, fee);
    }

    /// Tokens the user can swap into: every holding except the source.
    pub fn destinations(&self) -> Vec<Token> {
        let state = self.state.read();
        filtered_to_tokens(state.holdings.as_deref().unwrap_or(&[]), &state.request.from_mint)
    }

    /// Runs one swap attempt for the current request.
    ///
    /// Refuses while another attempt is in flight or while the form has a
    /// validation error. Holdings are refreshed once the attempt ends,
    /// whatever its result.
    pub async fn submit_swap(&self) -> Result<SwapOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SwapError::SwapInProgress);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let (request, validation) = {
            let state = self.state.read();
            (state.request.clone(), state.validation)
        };
        if let Some(v) = validation {
            return Err(SwapError::Validation(v));
        }
        if !request.can_submit() {
            return Err(SwapError::InvalidRequest(
                "choose two different tokens and an amount".to_string(),
            ));
        }

        info!(from = %request.from_mint, to = %request.to_mint, amount = %request.human_amount, "Submitting swap");
        let outcome = self.executor.execute(&request).await;

        let summary = match &outcome.result {
            Ok(receipt) => SwapSummary {
                stage: SwapStage::Succeeded,
                signature: Some(receipt.signature.to_string()),
                message: None,
                finished_at: Utc::now(),
            },
            Err(e) => {
                log_error(e, "Swap attempt");
                SwapSummary {
                    stage: SwapStage::Failed,
                    signature: None,
                    message: Some(e.user_message()),
                    finished_at: Utc::now(),
                }
            }
        };
        self.state.write().last_swap = Some(summary);

        if let Err(e) = self.refresh_holdings().await {
            warn!(error = %e, "Holdings refresh after swap failed");
        }
        Ok(outcome)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let quote = self.tracker.display();
        let state = self.state.read();
        SessionSnapshot {
            owner: self.owner,
            holdings: state.holdings.clone(),
            holdings_unavailable: state.holdings_unavailable,
            holdings_loaded_at: state.holdings_loaded_at,
            request: state.request.clone(),
            quote,
            validation: state.validation,
            swap_in_flight: self.in_flight.load(Ordering::SeqCst),
            last_swap: state.last_swap.clone(),
        }
    }
}
