use solana_sdk::signature::Signature;
use swapdeck_types::{AttemptStatus, SwapAttemptEvent, SwapRequest, SwapStage};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::SwapError;

/// State of one swap attempt. Created per submission, owned by the
/// executor for its duration and dropped when the attempt ends.
#[derive(Debug)]
pub(crate) struct SwapAttempt {
    id: Uuid,
    request: SwapRequest,
    stage: SwapStage,
    events: Vec<SwapAttemptEvent>,
}

impl SwapAttempt {
    pub(crate) fn new(request: SwapRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            stage: SwapStage::Idle,
            events: Vec::new(),
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn request(&self) -> &SwapRequest {
        &self.request
    }

    #[cfg(test)]
    pub(crate) fn stage(&self) -> SwapStage {
        self.stage
    }

    fn record(&mut self, event: SwapAttemptEvent) {
        self.events.push(event);
    }

    /// Moves to `stage`, closing out the previous one.
    pub(crate) fn enter(&mut self, stage: SwapStage) {
        if self.stage != SwapStage::Idle {
            self.record(SwapAttemptEvent::new(self.id, self.stage, AttemptStatus::Completed, ""));
        }
        self.stage = stage;
        info!(
            target: "swap_attempt",
            attempt_id = %self.id,
            stage = %stage,
            from_mint = %self.request.from_mint,
            to_mint = %self.request.to_mint,
            "Entering stage"
        );
        self.record(SwapAttemptEvent::new(self.id, stage, AttemptStatus::Entered, ""));
    }

    pub(crate) fn succeed(&mut self, signature: &Signature) {
        self.record(
            SwapAttemptEvent::new(self.id, self.stage, AttemptStatus::Completed, "")
                .with_signature(signature.to_string()),
        );
        self.stage = SwapStage::Succeeded;
        info!(target: "swap_attempt", attempt_id = %self.id, %signature, "Swap succeeded");
        self.record(
            SwapAttemptEvent::new(self.id, SwapStage::Succeeded, AttemptStatus::Completed, "")
                .with_signature(signature.to_string()),
        );
    }

    /// Records `err` against the current stage and ends the attempt.
    /// Returns the stage the failure happened in.
    pub(crate) fn fail(&mut self, err: &SwapError) -> SwapStage {
        let failed_in = self.stage;
        self.record(SwapAttemptEvent::new(self.id, failed_in, AttemptStatus::Failed, err.to_string()));
        self.stage = SwapStage::Failed;
        error!(target: "swap_attempt", attempt_id = %self.id, stage = %failed_in, error = %err, "Swap failed");
        self.record(SwapAttemptEvent::new(self.id, SwapStage::Failed, AttemptStatus::Failed, err.user_message()));
        failed_in
    }

    pub(crate) fn into_events(self) -> Vec<SwapAttemptEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_transitions_are_recorded() {
        let mut attempt = SwapAttempt::new(SwapRequest::new("A", "B", "1"));
        attempt.enter(SwapStage::EnsuringDestinationAccount);
        attempt.enter(SwapStage::FetchingQuote);
        let failed_in = attempt.fail(&SwapError::Network("timeout".to_string()));

        assert_eq!(failed_in, SwapStage::FetchingQuote);
        assert_eq!(attempt.stage(), SwapStage::Failed);

        let events = attempt.into_events();
        let stages: Vec<(SwapStage, AttemptStatus)> = events.iter().map(|e| (e.stage, e.status)).collect();
        assert_eq!(
            stages,
            vec![
                (SwapStage::EnsuringDestinationAccount, AttemptStatus::Entered),
                (SwapStage::EnsuringDestinationAccount, AttemptStatus::Completed),
                (SwapStage::FetchingQuote, AttemptStatus::Entered),
                (SwapStage::FetchingQuote, AttemptStatus::Failed),
                (SwapStage::Failed, AttemptStatus::Failed),
            ]
        );
    }

    #[test]
    fn test_success_carries_signature() {
        let mut attempt = SwapAttempt::new(SwapRequest::new("A", "B", "1"));
        attempt.enter(SwapStage::Confirming);
        let signature = Signature::new_unique();
        attempt.succeed(&signature);

        assert_eq!(attempt.stage(), SwapStage::Succeeded);
        let last = attempt.into_events().pop().unwrap();
        assert_eq!(last.stage, SwapStage::Succeeded);
        assert_eq!(last.signature, Some(signature.to_string()));
    }
}
