use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Route object returned by the aggregation service.
///
/// It is stored and forwarded verbatim to the transaction-build endpoint;
/// nothing in the pipeline reads or edits its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePayload(Value);

impl RoutePayload {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Fee reported by the first hop of a route plan, in base units of `mint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFee {
    pub amount_units: u64,
    pub mint: String,
}

/// A priced route between two mints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount_units: u64,
    pub out_amount_units: u64,
    /// `None` when the service returned no route plan
    pub fee: Option<QuoteFee>,
    pub route_payload: RoutePayload,
}
