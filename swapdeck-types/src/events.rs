use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stages of a single swap attempt, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapStage {
    Idle,
    EnsuringDestinationAccount,
    FetchingQuote,
    FetchingTransactionPayload,
    Simulating,
    AwaitingSignatureAndBroadcast,
    Confirming,
    Succeeded,
    Failed,
}

impl SwapStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for SwapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::EnsuringDestinationAccount => write!(f, "ensuring destination account"),
            Self::FetchingQuote => write!(f, "fetching quote"),
            Self::FetchingTransactionPayload => write!(f, "fetching transaction payload"),
            Self::Simulating => write!(f, "simulating"),
            Self::AwaitingSignatureAndBroadcast => write!(f, "awaiting signature and broadcast"),
            Self::Confirming => write!(f, "confirming"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptStatus {
    Entered,
    Completed,
    Failed,
}

/// One stage transition of a swap attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapAttemptEvent {
    pub attempt_id: Uuid,
    pub stage: SwapStage,
    pub status: AttemptStatus,
    pub signature: Option<String>,
    pub details: String, // e.g. error message or mint involved
    pub timestamp: DateTime<Utc>,
}

impl SwapAttemptEvent {
    pub fn new(attempt_id: Uuid, stage: SwapStage, status: AttemptStatus, details: impl Into<String>) -> Self {
        Self {
            attempt_id,
            stage,
            status,
            signature: None,
            details: details.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}
