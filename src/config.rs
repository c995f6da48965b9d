use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    // Solana Configuration
    pub solana_rpc_url: String,
    pub wallet_private_key: Option<String>,

    // Aggregator endpoints
    pub quote_api_url: String,
    pub token_api_url: String,
    pub slippage_bps: u16,
    pub request_timeout_secs: u64,

    // Logging
    pub log_level: String,
    pub log_dir: String,

    // Headless driver: the pair to quote, and whether to actually swap it
    pub swap_from_mint: Option<String>,
    pub swap_to_mint: Option<String>,
    pub swap_amount: Option<String>,
    pub execute_swap: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ::config::ConfigError> {
        // Load optional .env file
        if dotenv::dotenv().is_ok() {
            info!("Loaded configuration from .env file");
        }

        let config_builder = ::config::Config::builder()
            .add_source(::config::Environment::default().separator("__"))
            .set_default("solana_rpc_url", "https://api.devnet.solana.com")?
            .set_default("quote_api_url", "https://quote-api.jup.ag/v6")?
            .set_default("token_api_url", "https://tokens.jup.ag")?
            .set_default("slippage_bps", 50)?
            .set_default("request_timeout_secs", 30)?
            .set_default("log_level", "info")?
            .set_default("log_dir", "./logs")?
            .set_default("execute_swap", false)?;

        let settings = config_builder.build()?;
        settings.try_deserialize()
    }

    /// The configured pair, when all three driver fields are present.
    pub fn configured_swap(&self) -> Option<swapdeck_types::SwapRequest> {
        match (&self.swap_from_mint, &self.swap_to_mint, &self.swap_amount) {
            (Some(from), Some(to), Some(amount)) => Some(swapdeck_types::SwapRequest::new(
                from.clone(),
                to.clone(),
                amount.clone(),
            )),
            _ => None,
        }
    }
}
