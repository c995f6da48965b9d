use std::sync::Arc;

use futures::future::join_all;
use solana_sdk::pubkey::Pubkey;
use swapdeck_types::Token;
use tracing::{debug, info};

use crate::error::Result;
use crate::ledger::{Ledger, TokenAccountBalance};
use crate::tokens::{ProgramVariant, TokenMetadataSource};

/// Builds the wallet's token list from the ledger and the metadata source.
#[derive(Clone)]
pub struct HoldingsAggregator {
    ledger: Arc<dyn Ledger>,
    metadata: Arc<dyn TokenMetadataSource>,
}

impl HoldingsAggregator {
    pub fn new(ledger: Arc<dyn Ledger>, metadata: Arc<dyn TokenMetadataSource>) -> Self {
        Self { ledger, metadata }
    }

    /// Loads every balance `owner` holds: native first, then Standard-program
    /// accounts, then Extended-program accounts.
    ///
    /// A failure of the balance or account-list queries fails the whole load.
    /// A mint whose metadata cannot be resolved is dropped from the list.
    pub async fn load_holdings(&self, owner: &Pubkey) -> Result<Vec<Token>> {
        let standard_id = ProgramVariant::Standard.program_id();
        let extended_id = ProgramVariant::Extended.program_id();

        let (lamports, standard, extended) = tokio::try_join!(
            self.ledger.native_balance(owner),
            self.ledger.token_accounts_by_owner(owner, &standard_id),
            self.ledger.token_accounts_by_owner(owner, &extended_id),
        )?;
        debug!(
            %owner,
            standard = standard.len(),
            extended = extended.len(),
            "Fetched wallet accounts"
        );

        let accounts: Vec<TokenAccountBalance> = standard.into_iter().chain(extended).collect();
        // join_all keeps input order, so the fixed concatenation order survives the fan-out.
        let resolved = join_all(accounts.iter().map(|account| self.to_token(account))).await;

        let mut tokens = Vec::with_capacity(resolved.len() + 1);
        tokens.push(Token::native(lamports));
        tokens.extend(resolved.into_iter().flatten());

        info!(%owner, count = tokens.len(), "Loaded wallet holdings");
        Ok(tokens)
    }

    async fn to_token(&self, account: &TokenAccountBalance) -> Option<Token> {
        let info = self.metadata.resolve(&account.mint).await;
        if info.is_unknown() {
            debug!(mint = %account.mint, "Dropping holding with unknown metadata");
            return None;
        }
        Some(Token {
            address: account.mint.clone(),
            symbol: info.symbol,
            balance: account.ui_amount,
            decimals: info.decimals,
        })
    }
}
