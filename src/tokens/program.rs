use std::fmt;
use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::error::{Result, SwapError};
use crate::ledger::Ledger;

/// The two token programs a mint can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramVariant {
    /// The legacy SPL Token program
    Standard,
    /// Token-2022 (token extensions)
    Extended,
}

impl ProgramVariant {
    pub const ALL: [ProgramVariant; 2] = [ProgramVariant::Standard, ProgramVariant::Extended];

    pub fn program_id(&self) -> Pubkey {
        match self {
            Self::Standard => spl_token::ID,
            Self::Extended => spl_token_2022::ID,
        }
    }

    pub fn from_owner(owner: &Pubkey) -> Option<Self> {
        Self::ALL.into_iter().find(|variant| variant.program_id() == *owner)
    }
}

impl fmt::Display for ProgramVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "spl-token"),
            Self::Extended => write!(f, "spl-token-2022"),
        }
    }
}

pub fn parse_pubkey(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|e| SwapError::InvalidPubkey(format!("{}: {}", value, e)))
}

/// Determines which token program owns `mint`.
///
/// Fails with [`SwapError::UnknownProgram`] when the mint account is missing
/// or owned by anything else; token instructions cannot be built safely
/// without knowing the program.
pub async fn classify(ledger: &dyn Ledger, mint: &Pubkey) -> Result<ProgramVariant> {
    let owner = ledger.account_owner(mint).await?;
    let variant = owner.as_ref().and_then(ProgramVariant::from_owner);
    match variant {
        Some(variant) => {
            debug!(%mint, %variant, "Classified mint");
            Ok(variant)
        }
        None => Err(SwapError::UnknownProgram {
            mint: mint.to_string(),
            owner: owner.map(|o| o.to_string()),
        }),
    }
}
