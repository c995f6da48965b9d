pub mod metadata;
pub mod program;
pub mod units;

pub use metadata::{CachedMetadata, TokenMetadataSource};
pub use program::{classify, parse_pubkey, ProgramVariant};

use swapdeck_types::Token;

/// Destination choices for a swap: every token except the source mint.
pub fn filtered_to_tokens(available: &[Token], from_mint: &str) -> Vec<Token> {
    available
        .iter()
        .filter(|token| token.address != from_mint)
        .cloned()
        .collect()
}

/// Balance held for `mint`, 0 when the wallet has no entry for it.
pub fn token_balance(tokens: &[Token], mint: &str) -> f64 {
    tokens
        .iter()
        .find(|token| token.address == mint)
        .map(|token| token.balance)
        .unwrap_or(0.0)
}
