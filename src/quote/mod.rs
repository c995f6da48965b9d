mod tracker;

pub use tracker::{QuoteDisplay, QuoteTicket, QuoteTracker};

use std::sync::Arc;

use swapdeck_types::{Quote, QuoteFee};
use tracing::{debug, info};

use crate::error::{Result, SwapError};
use crate::jupiter_client::{JupiterClient, RoutePlan};
use crate::tokens::units;
use crate::tokens::TokenMetadataSource;

/// Fee in human units of its own mint.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeEstimate {
    pub amount: f64,
    pub mint: String,
}

/// A quote together with its human-unit figures.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteEstimate {
    pub quote: Quote,
    pub out_amount: f64,
    pub fee: Option<FeeEstimate>,
}

/// Fee of the first hop, or `None` when there is no route plan.
fn first_hop_fee(route_plan: Option<&[RoutePlan]>) -> Result<Option<QuoteFee>> {
    let Some(hop) = route_plan.and_then(|plan| plan.first()) else {
        return Ok(None);
    };
    let amount_units = hop
        .swap_info
        .fee_amount
        .parse::<u64>()
        .map_err(|e| SwapError::Aggregator(format!("Invalid feeAmount '{}': {}", hop.swap_info.fee_amount, e)))?;
    Ok(Some(QuoteFee {
        amount_units,
        mint: hop.swap_info.fee_mint.clone(),
    }))
}

/// Turns a human-entered amount into a priced quote.
#[derive(Clone)]
pub struct QuoteEngine {
    jupiter: Arc<JupiterClient>,
    metadata: Arc<dyn TokenMetadataSource>,
}

impl QuoteEngine {
    pub fn new(jupiter: Arc<JupiterClient>, metadata: Arc<dyn TokenMetadataSource>) -> Self {
        Self { jupiter, metadata }
    }

    pub fn metadata(&self) -> &Arc<dyn TokenMetadataSource> {
        &self.metadata
    }

    /// Fetches a quote for `human_amount` of `from_mint` into `to_mint`.
    ///
    /// The input is scaled with the source mint's decimals, the output with
    /// the destination's, and the fee with the decimals of the fee's own mint.
    pub async fn get_quote(&self, from_mint: &str, to_mint: &str, human_amount: &str) -> Result<QuoteEstimate> {
        let in_amount_units = units::to_base_units(self.metadata.as_ref(), from_mint, human_amount).await?;
        let response = self.jupiter.fetch_quote(from_mint, to_mint, in_amount_units).await?;
        let fee = first_hop_fee(response.route_plan.as_deref())?;

        let out_amount = units::to_human_amount(self.metadata.as_ref(), to_mint, response.out_amount).await;
        let fee_estimate = match &fee {
            Some(fee) => Some(FeeEstimate {
                amount: units::to_human_amount(self.metadata.as_ref(), &fee.mint, fee.amount_units).await,
                mint: fee.mint.clone(),
            }),
            None => {
                debug!(from_mint, to_mint, "Quote has no route plan, no fee reported");
                None
            }
        };

        info!(
            from_mint,
            to_mint,
            in_amount_units,
            out_amount_units = response.out_amount,
            out_amount,
            "Quote received"
        );

        Ok(QuoteEstimate {
            quote: Quote {
                input_mint: from_mint.to_string(),
                output_mint: to_mint.to_string(),
                in_amount_units,
                out_amount_units: response.out_amount,
                fee,
                route_payload: response.payload,
            },
            out_amount,
            fee: fee_estimate,
        })
    }
}
