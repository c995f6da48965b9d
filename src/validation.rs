use swapdeck_types::{SwapRequest, Token};

use crate::error::ValidationError;
use crate::quote::FeeEstimate;
use crate::tokens::{token_balance, units::parse_human_amount};

/// Checks the requested amount, plus any fee charged in the same asset,
/// against the wallet's balance of the source mint.
///
/// A fee denominated in another mint is paid from that mint's balance and
/// does not count here. An amount outside the `digits[.digits]` grammar
/// yields no error; the quote path reports it instead.
pub fn validate(holdings: &[Token], request: &SwapRequest, fee: Option<&FeeEstimate>) -> Option<ValidationError> {
    let amount = parse_human_amount(&request.human_amount)?;
    let balance = token_balance(holdings, &request.from_mint);

    if amount > balance {
        return Some(ValidationError::InsufficientBalance);
    }

    let fee_in_source = fee
        .filter(|fee| fee.mint == request.from_mint)
        .map(|fee| fee.amount)
        .unwrap_or(0.0);
    let required = amount + fee_in_source;
    if required > balance {
        return Some(ValidationError::InsufficientForFeesAndAmount);
    }

    None
}
