//! Conversion between human decimal amounts and integer base units.

use swapdeck_types::{NATIVE_DECIMALS, NATIVE_MINT};

use super::metadata::TokenMetadataSource;
use crate::error::{Result, SwapError};

/// Decimals for `mint`. The native mint never goes through the resolver;
/// any other mint takes whatever the resolver returns, including the
/// fallback sentinel's 9.
pub async fn decimals_for(resolver: &dyn TokenMetadataSource, mint: &str) -> u8 {
    if mint == NATIVE_MINT {
        return NATIVE_DECIMALS;
    }
    resolver.resolve(mint).await.decimals
}

pub async fn to_base_units(resolver: &dyn TokenMetadataSource, mint: &str, human_amount: &str) -> Result<u64> {
    let decimals = decimals_for(resolver, mint).await;
    scale_to_base_units(human_amount, decimals)
}

pub async fn to_human_amount(resolver: &dyn TokenMetadataSource, mint: &str, base_units: u64) -> f64 {
    let decimals = decimals_for(resolver, mint).await;
    scale_to_human(base_units, decimals)
}

/// Splits `digits[.digits]` into its whole and fraction parts. Signs,
/// exponents and anything else are rejected, as is a lone `.`.
fn split_plain_decimal(human_amount: &str) -> Option<(&str, &str)> {
    let trimmed = human_amount.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    (digits_only(whole) && digits_only(fraction)).then_some((whole, fraction))
}

/// Parses a non-negative decimal string into base units.
///
/// The string is scaled digit by digit so no floating-point rounding is
/// involved. Fraction digits beyond `decimals` are dropped.
pub fn scale_to_base_units(human_amount: &str, decimals: u8) -> Result<u64> {
    let (whole, fraction) = split_plain_decimal(human_amount)
        .ok_or_else(|| SwapError::InvalidAmount(format!("'{}' is not a non-negative decimal", human_amount)))?;

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    if fraction.len() >= decimals {
        digits.push_str(&fraction[..decimals]);
    } else {
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(decimals - fraction.len()));
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    digits
        .parse::<u64>()
        .map_err(|_| SwapError::InvalidAmount(format!("'{}' exceeds the representable range", human_amount)))
}

pub fn scale_to_human(base_units: u64, decimals: u8) -> f64 {
    base_units as f64 / 10f64.powi(decimals as i32)
}

/// Approximate value of an amount for display-side checks. Accepts exactly
/// what [`scale_to_base_units`] accepts, `None` for everything else.
pub fn parse_human_amount(human_amount: &str) -> Option<f64> {
    split_plain_decimal(human_amount)?;
    human_amount.trim().parse::<f64>().ok()
}
