use serde::{Deserialize, Serialize};

/// The swap form as edited by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapRequest {
    pub from_mint: String,
    pub to_mint: String,
    /// Decimal string exactly as typed
    pub human_amount: String,
}

impl SwapRequest {
    pub fn new(
        from_mint: impl Into<String>,
        to_mint: impl Into<String>,
        human_amount: impl Into<String>,
    ) -> Self {
        Self {
            from_mint: from_mint.into(),
            to_mint: to_mint.into(),
            human_amount: human_amount.into(),
        }
    }

    /// True when every field needed for a quote is filled in.
    pub fn is_complete(&self) -> bool {
        !self.from_mint.is_empty() && !self.to_mint.is_empty() && !self.human_amount.trim().is_empty()
    }

    /// Submission additionally requires distinct mints.
    pub fn can_submit(&self) -> bool {
        self.is_complete() && self.from_mint != self.to_mint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness() {
        assert!(!SwapRequest::default().is_complete());
        assert!(!SwapRequest::new("A", "B", "  ").is_complete());
        assert!(SwapRequest::new("A", "B", "1.5").is_complete());
    }

    #[test]
    fn test_same_mint_blocks_submission() {
        let request = SwapRequest::new("A", "A", "1");
        assert!(request.is_complete());
        assert!(!request.can_submit());
        assert!(SwapRequest::new("A", "B", "1").can_submit());
    }
}
