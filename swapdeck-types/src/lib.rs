pub mod events;
pub mod quote;
pub mod request;
pub mod token;

pub use events::{AttemptStatus, SwapAttemptEvent, SwapStage};
pub use quote::{Quote, QuoteFee, RoutePayload};
pub use request::SwapRequest;
pub use token::{Token, TokenInfo, NATIVE_DECIMALS, NATIVE_MINT, UNKNOWN_SYMBOL};
