use serde::{Deserialize, Serialize};

/// Mint of the wrapped native asset. The holdings list uses it as the
/// address of the native balance entry.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// Fixed exponent of the native asset (lamports per SOL).
pub const NATIVE_DECIMALS: u8 = 9;

/// Symbol carried by the metadata fallback sentinel.
pub const UNKNOWN_SYMBOL: &str = "UNK";

/// A balance held by the connected wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Mint identifier, natural key of the entry
    pub address: String,
    pub symbol: String,
    /// Human-unit snapshot taken at load time
    pub balance: f64,
    pub decimals: u8,
}

impl Token {
    pub fn native(lamports: u64) -> Self {
        Self {
            address: NATIVE_MINT.to_string(),
            symbol: "SOL".to_string(),
            balance: lamports as f64 / 10f64.powi(NATIVE_DECIMALS as i32),
            decimals: NATIVE_DECIMALS,
        }
    }

    pub fn is_native(&self) -> bool {
        self.address == NATIVE_MINT
    }
}

/// Resolved metadata for a mint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
}

impl TokenInfo {
    /// Sentinel returned whenever metadata cannot be obtained.
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            symbol: UNKNOWN_SYMBOL.to_string(),
            address: String::new(),
            decimals: NATIVE_DECIMALS,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.symbol == UNKNOWN_SYMBOL
    }
}
