//! Keeps the displayed quote in step with the most recent request.
//!
//! Every evaluation takes a [`QuoteTicket`] stamped with a generation
//! number. A result is published only if no newer ticket has been issued
//! since, so a slow response for old inputs can never overwrite the quote
//! shown for the current ones.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use swapdeck_types::SwapRequest;
use tracing::debug;

use super::{FeeEstimate, QuoteEngine, QuoteEstimate};
use crate::error::{log_error, Result};

/// What the swap form shows for the current inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteDisplay {
    pub request: Option<SwapRequest>,
    pub estimate: Option<QuoteEstimate>,
    /// Set when the last evaluation failed; output and fee are cleared with it
    pub error: Option<String>,
}

impl QuoteDisplay {
    pub fn out_amount(&self) -> Option<f64> {
        self.estimate.as_ref().map(|e| e.out_amount)
    }

    pub fn fee(&self) -> Option<&FeeEstimate> {
        self.estimate.as_ref().and_then(|e| e.fee.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTicket {
    generation: u64,
    request: SwapRequest,
}

impl QuoteTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &SwapRequest {
        &self.request
    }
}

#[derive(Debug, Default)]
pub struct QuoteTracker {
    generation: AtomicU64,
    last_inputs: Mutex<Option<SwapRequest>>,
    display: RwLock<QuoteDisplay>,
}

impl QuoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket when `request` is complete and differs from the last
    /// evaluated inputs; returns `None` when nothing needs recomputing.
    pub fn on_inputs_changed(&self, request: &SwapRequest) -> Option<QuoteTicket> {
        if !request.is_complete() {
            return None;
        }
        let mut last = self.last_inputs.lock();
        if last.as_ref() == Some(request) {
            return None;
        }
        *last = Some(request.clone());
        // Issued while holding the lock so ticket order matches input order.
        Some(self.issue(request.clone()))
    }

    /// Unconditionally issues a ticket, superseding all earlier ones.
    pub fn issue(&self, request: SwapRequest) -> QuoteTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        QuoteTicket { generation, request }
    }

    pub fn is_current(&self, ticket: &QuoteTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Applies the outcome of `ticket`'s evaluation. Returns false, leaving
    /// the display untouched, when the ticket has been superseded.
    pub fn publish(&self, ticket: &QuoteTicket, outcome: Result<QuoteEstimate>) -> bool {
        let mut display = self.display.write();
        // Checked under the write lock so a newer publish cannot interleave.
        if !self.is_current(ticket) {
            debug!(generation = ticket.generation, "Discarding superseded quote result");
            return false;
        }
        *display = match outcome {
            Ok(estimate) => QuoteDisplay {
                request: Some(ticket.request.clone()),
                estimate: Some(estimate),
                error: None,
            },
            Err(e) => {
                log_error(&e, "Quote evaluation");
                QuoteDisplay {
                    request: Some(ticket.request.clone()),
                    estimate: None,
                    error: Some(e.user_message()),
                }
            }
        };
        true
    }

    /// Clears the display and invalidates every in-flight evaluation.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.last_inputs.lock() = None;
        *self.display.write() = QuoteDisplay::default();
    }

    pub fn display(&self) -> QuoteDisplay {
        self.display.read().clone()
    }

    /// Evaluates `request` if its inputs changed and publishes the result.
    pub async fn refresh(&self, engine: &QuoteEngine, request: &SwapRequest) -> Option<bool> {
        let ticket = self.on_inputs_changed(request)?;
        let outcome = engine
            .get_quote(&ticket.request.from_mint, &ticket.request.to_mint, &ticket.request.human_amount)
            .await;
        Some(self.publish(&ticket, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SwapError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use swapdeck_types::{Quote, RoutePayload};

    fn estimate(out_amount: f64) -> QuoteEstimate {
        QuoteEstimate {
            quote: Quote {
                input_mint: "A".to_string(),
                output_mint: "B".to_string(),
                in_amount_units: 1,
                out_amount_units: 1,
                fee: None,
                route_payload: RoutePayload::new(json!({})),
            },
            out_amount,
            fee: Some(FeeEstimate {
                amount: 0.1,
                mint: "A".to_string(),
            }),
        }
    }

    #[test]
    fn test_incomplete_or_unchanged_inputs_do_not_trigger() {
        let tracker = QuoteTracker::new();
        assert!(tracker.on_inputs_changed(&SwapRequest::new("A", "", "1")).is_none());

        let request = SwapRequest::new("A", "B", "1");
        assert!(tracker.on_inputs_changed(&request).is_some());
        assert!(tracker.on_inputs_changed(&request).is_none());
        assert!(tracker.on_inputs_changed(&SwapRequest::new("A", "B", "2")).is_some());
    }

    #[test]
    fn test_late_response_is_discarded() {
        let tracker = QuoteTracker::new();
        let first = tracker.on_inputs_changed(&SwapRequest::new("A", "B", "1")).unwrap();
        let second = tracker.on_inputs_changed(&SwapRequest::new("A", "B", "2")).unwrap();

        assert!(tracker.publish(&second, Ok(estimate(20.0))));
        assert!(!tracker.publish(&first, Ok(estimate(10.0))));

        let display = tracker.display();
        assert_eq!(display.out_amount(), Some(20.0));
        assert_eq!(display.request.unwrap().human_amount, "2");
    }

    #[test]
    fn test_failure_clears_output_and_fee() {
        let tracker = QuoteTracker::new();
        let first = tracker.on_inputs_changed(&SwapRequest::new("A", "B", "1")).unwrap();
        tracker.publish(&first, Ok(estimate(10.0)));
        assert!(tracker.display().fee().is_some());

        let second = tracker.on_inputs_changed(&SwapRequest::new("A", "B", "3")).unwrap();
        tracker.publish(&second, Err(SwapError::Network("connection reset".to_string())));

        let display = tracker.display();
        assert_eq!(display.out_amount(), None);
        assert!(display.fee().is_none());
        assert!(display.error.is_some());
    }

    #[test]
    fn test_reset_invalidates_in_flight() {
        let tracker = QuoteTracker::new();
        let ticket = tracker.on_inputs_changed(&SwapRequest::new("A", "B", "1")).unwrap();
        tracker.reset();
        assert!(!tracker.publish(&ticket, Ok(estimate(1.0))));
        assert_eq!(tracker.display(), QuoteDisplay::default());
        // Same inputs count as changed again after a reset.
        assert!(tracker.on_inputs_changed(&SwapRequest::new("A", "B", "1")).is_some());
    }
}
