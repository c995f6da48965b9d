// Public modules that are part of the API
pub mod config;
pub mod error;
pub mod executor;
pub mod holdings;
pub mod jupiter_client;
pub mod ledger;
pub mod monitoring;
pub mod quote;
pub mod session;
pub mod signer;
pub mod tokens;
pub mod validation;

// Re-export common types
pub use swapdeck_types::{
    AttemptStatus, Quote, QuoteFee, RoutePayload, SwapAttemptEvent, SwapRequest, SwapStage, Token, TokenInfo,
    NATIVE_DECIMALS, NATIVE_MINT, UNKNOWN_SYMBOL,
};

pub use error::{Result, SwapError, ValidationError};
pub use executor::{SwapExecutor, SwapOutcome, SwapReceipt};
pub use holdings::HoldingsAggregator;
pub use jupiter_client::JupiterClient;
pub use ledger::{Finalization, Ledger, RpcLedger, SimulationReport, TokenAccountBalance};
pub use quote::{FeeEstimate, QuoteEngine, QuoteEstimate, QuoteTracker};
pub use session::{SessionSnapshot, SwapSession};
pub use signer::{KeypairSigner, TransactionSigner};
pub use tokens::{CachedMetadata, ProgramVariant, TokenMetadataSource};
