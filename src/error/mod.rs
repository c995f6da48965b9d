use std::fmt;

use reqwest::StatusCode;
use swapdeck_types::SwapStage;
use thiserror::Error;

mod utils;
pub use utils::*;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Solana RPC error: {0}")]
    Rpc(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {status} - {message}")]
    Http {
        status: StatusCode,
        message: String,
    },

    #[error("Aggregator error: {0}")]
    Aggregator(String),

    #[error("Mint {mint} is owned by an unknown token program ({})", .owner.as_deref().unwrap_or("no account"))]
    UnknownProgram {
        mint: String,
        owner: Option<String>,
    },

    #[error("Simulation failed while {stage}: {message}")]
    Simulation {
        stage: SwapStage,
        message: String,
        logs: Vec<String>,
    },

    #[error("Signing or broadcast failed: {0}")]
    Signing(String),

    #[error("Transaction {signature} did not finalize: {message}")]
    Confirmation {
        signature: String,
        message: String,
        logs: Vec<String>,
    },

    #[error("Validation error: {0}")]
    Validation(ValidationError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid swap request: {0}")]
    InvalidRequest(String),

    #[error("Invalid public key: {0}")]
    InvalidPubkey(String),

    #[error("A swap attempt is already in flight")]
    SwapInProgress,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Advisory checks that block submission without failing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InsufficientBalance,
    InsufficientForFeesAndAmount,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientBalance => write!(f, "Insufficient balance"),
            Self::InsufficientForFeesAndAmount => write!(f, "Insufficient balance for amount plus fees"),
        }
    }
}

pub type Result<T> = std::result::Result<T, SwapError>;

impl SwapError {
    pub fn simulation(stage: SwapStage, message: impl Into<String>, logs: Vec<String>) -> Self {
        SwapError::Simulation {
            stage,
            message: message.into(),
            logs,
        }
    }

    pub fn confirmation(signature: impl ToString, message: impl Into<String>, logs: Vec<String>) -> Self {
        SwapError::Confirmation {
            signature: signature.to_string(),
            message: message.into(),
            logs,
        }
    }

    /// Pipeline stage an error of this kind ends an attempt in, when the
    /// kind alone determines it.
    pub fn stage(&self) -> Option<SwapStage> {
        match self {
            SwapError::UnknownProgram { .. } => Some(SwapStage::EnsuringDestinationAccount),
            SwapError::Simulation { stage, .. } => Some(*stage),
            SwapError::Signing(_) => Some(SwapStage::AwaitingSignatureAndBroadcast),
            SwapError::Confirmation { .. } => Some(SwapStage::Confirming),
            _ => None,
        }
    }

    /// Log lines attached to simulation or confirmation failures.
    pub fn logs(&self) -> &[String] {
        match self {
            SwapError::Simulation { logs, .. } | SwapError::Confirmation { logs, .. } => logs,
            _ => &[],
        }
    }

    /// Single line shown to the user when a swap attempt ends in error.
    pub fn user_message(&self) -> String {
        match self {
            SwapError::Simulation { stage: SwapStage::EnsuringDestinationAccount, .. } => {
                "Could not create the destination token account".to_string()
            }
            SwapError::Simulation { .. } => "Swap transaction failed simulation".to_string(),
            SwapError::Signing(_) => "Wallet rejected or failed to send the transaction".to_string(),
            SwapError::Confirmation { signature, .. } => format!("Transaction {} failed to finalize", signature),
            SwapError::UnknownProgram { .. } => "Destination token uses an unsupported token program".to_string(),
            SwapError::Validation(v) => v.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for SwapError {
    fn from(err: ValidationError) -> Self {
        SwapError::Validation(err)
    }
}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SwapError::Http {
                status,
                message: err.to_string(),
            }
        } else {
            SwapError::Network(err.to_string())
        }
    }
}

impl From<solana_client::client_error::ClientError> for SwapError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        SwapError::Rpc(err.to_string())
    }
}
