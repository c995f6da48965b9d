use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::VersionedTransaction;
use swapdeck_types::{RoutePayload, TokenInfo};
use tracing::{debug, warn};

use crate::error::{handle_reqwest_error, Result, SwapError};
use crate::tokens::TokenMetadataSource;

/// Entry of the tradable token list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TokenListEntry {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(rename = "logoURI")]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TokenInfoResponse {
    name: String,
    symbol: String,
    address: String,
    decimals: u8,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SwapInfo {
    #[serde(rename = "ammKey")]
    pub amm_key: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "feeAmount")]
    pub fee_amount: String,
    #[serde(rename = "feeMint")]
    pub fee_mint: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RoutePlan {
    #[serde(rename = "swapInfo")]
    pub swap_info: SwapInfo,
    pub percent: Option<i32>,
}

#[derive(Deserialize, Debug)]
struct QuoteBody {
    #[serde(rename = "inAmount")]
    in_amount: Option<String>,
    #[serde(rename = "outAmount")]
    out_amount: String,
    #[serde(rename = "routePlan")]
    route_plan: Option<Vec<RoutePlan>>,
}

/// Typed view of a quote, alongside the untouched response body.
#[derive(Debug, Clone)]
pub struct QuoteResponse {
    pub in_amount: Option<u64>,
    pub out_amount: u64,
    pub route_plan: Option<Vec<RoutePlan>>,
    pub payload: RoutePayload,
}

#[derive(Serialize)]
struct SwapRequest<'a> {
    #[serde(rename = "quoteResponse")]
    quote_response: &'a RoutePayload,
    #[serde(rename = "userPublicKey")]
    user_public_key: String,
    #[serde(rename = "wrapAndUnwrapSol")]
    wrap_and_unwrap_sol: bool,
}

#[derive(Deserialize, Debug)]
struct SwapResponse {
    #[serde(rename = "swapTransaction")]
    swap_transaction: String,
}

fn parse_units(field: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|e| SwapError::Aggregator(format!("Failed to parse {} '{}': {}", field, value, e)))
}

/// Client for the Jupiter quote, swap and token endpoints.
#[derive(Clone, Debug)]
pub struct JupiterClient {
    http: reqwest::Client,
    quote_api_url: String,
    token_api_url: String,
    slippage_bps: u16,
}

impl JupiterClient {
    pub fn new(quote_api_url: &str, token_api_url: &str, slippage_bps: u16, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwapError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            quote_api_url: quote_api_url.trim_end_matches('/').to_string(),
            token_api_url: token_api_url.trim_end_matches('/').to_string(),
            slippage_bps,
        })
    }

    /// Requests a route for `amount` base units of `input_mint`.
    pub async fn fetch_quote(&self, input_mint: &str, output_mint: &str, amount: u64) -> Result<QuoteResponse> {
        let url = format!("{}/quote", self.quote_api_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", input_mint.to_string()),
                ("outputMint", output_mint.to_string()),
                ("amount", amount.to_string()),
                ("slippageBps", self.slippage_bps.to_string()),
            ])
            .send()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter quote request"))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter quote response"))?;

        // The service reports failures through an `error` field, sometimes with a 2xx status.
        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
            return Err(SwapError::Aggregator(format!("Jupiter quote failed: {}", message)));
        }
        if !status.is_success() {
            return Err(SwapError::Http {
                status,
                message: format!("Jupiter quote failed: {}", body),
            });
        }

        let parsed: QuoteBody = serde_json::from_value(body.clone())
            .map_err(|e| SwapError::Aggregator(format!("Malformed quote response: {}", e)))?;

        let in_amount = parsed.in_amount.as_deref().map(|v| parse_units("inAmount", v)).transpose()?;
        let out_amount = parse_units("outAmount", &parsed.out_amount)?;
        debug!(input_mint, output_mint, amount, out_amount, "Received quote");

        Ok(QuoteResponse {
            in_amount,
            out_amount,
            route_plan: parsed.route_plan,
            payload: RoutePayload::new(body),
        })
    }

    /// Asks the service to build the swap transaction for a quoted route.
    pub async fn swap_transaction(&self, route: &RoutePayload, owner: &Pubkey) -> Result<VersionedTransaction> {
        let swap_request = SwapRequest {
            quote_response: route,
            user_public_key: owner.to_string(),
            wrap_and_unwrap_sol: true, // Wrap/unwrap SOL automatically
        };
        let raw_res = self
            .http
            .post(format!("{}/swap", self.quote_api_url))
            .json(&swap_request)
            .send()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter swap request"))?;

        if !raw_res.status().is_success() {
            let status = raw_res.status();
            let error_body = raw_res.text().await.unwrap_or_else(|_| "Unknown error body".to_string());
            return Err(SwapError::Http {
                status,
                message: format!("Jupiter swap API failed: {}", error_body),
            });
        }
        let response = raw_res
            .json::<SwapResponse>()
            .await
            .map_err(|e| SwapError::Aggregator(format!("Failed to parse Jupiter swap response: {}", e)))?;

        decode_transaction(&response.swap_transaction)
    }

    /// Metadata for one mint; `None` when the service has nothing for it.
    pub async fn token_info(&self, mint: &str) -> Result<Option<TokenInfo>> {
        let url = format!("{}/token/{}", self.token_api_url, mint);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter token request"))?;

        if !response.status().is_success() {
            return Err(SwapError::Http {
                status: response.status(),
                message: format!("Jupiter token lookup failed for {}", mint),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter token response"))?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        let info: TokenInfoResponse = serde_json::from_str(trimmed)?;
        Ok(Some(TokenInfo {
            name: info.name,
            symbol: info.symbol,
            address: info.address,
            decimals: info.decimals,
        }))
    }

    /// The community-tagged tradable token universe.
    pub async fn tradable_tokens(&self) -> Result<Vec<TokenListEntry>> {
        let url = format!("{}/tokens", self.token_api_url);
        let response = self
            .http
            .get(&url)
            .query(&[("tags", "community")])
            .send()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter token list request"))?
            .error_for_status()?;
        let tokens = response
            .json::<Vec<TokenListEntry>>()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter token list response"))?;
        Ok(tokens)
    }
}

#[async_trait]
impl TokenMetadataSource for JupiterClient {
    async fn resolve(&self, mint: &str) -> TokenInfo {
        match self.token_info(mint).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                debug!(mint, "No metadata for mint, using fallback");
                TokenInfo::unknown()
            }
            Err(e) => {
                warn!(mint, error = %e, "Metadata lookup failed, using fallback");
                TokenInfo::unknown()
            }
        }
    }
}

/// Decodes a base64 bincode-serialized versioned transaction.
pub fn decode_transaction(encoded: &str) -> Result<VersionedTransaction> {
    let decoded_tx = BASE64_STANDARD
        .decode(encoded)
        .map_err(|e| SwapError::Aggregator(format!("Failed to decode base64 swap transaction: {}", e)))?;
    bincode::deserialize(&decoded_tx)
        .map_err(|e| SwapError::Aggregator(format!("Failed to deserialize transaction: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn client(server: &mockito::Server) -> JupiterClient {
        JupiterClient::new(&server.url(), &server.url(), 50, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_token_info_copies_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/token/MockMintAccount")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"Test Token","symbol":"TT","address":"TestAddress","decimals":6}"#)
            .create_async()
            .await;

        let info = client(&server).resolve("MockMintAccount").await;
        assert_eq!(
            info,
            TokenInfo {
                name: "Test Token".to_string(),
                symbol: "TT".to_string(),
                address: "TestAddress".to_string(),
                decimals: 6,
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_info_empty_body_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/token/MockMintAccount")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;
        server
            .mock("GET", "/token/NullMint")
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;

        let jupiter = client(&server);
        assert_eq!(jupiter.resolve("MockMintAccount").await, TokenInfo::unknown());
        assert_eq!(jupiter.resolve("NullMint").await, TokenInfo::unknown());
    }

    #[tokio::test]
    async fn test_token_info_http_failure_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/token/Broken")
            .with_status(500)
            .create_async()
            .await;

        let jupiter = client(&server);
        assert!(matches!(jupiter.token_info("Broken").await, Err(SwapError::Http { .. })));
        assert!(jupiter.resolve("Broken").await.is_unknown());
    }

    #[tokio::test]
    async fn test_fetch_quote_sends_slippage_and_keeps_payload() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "inputMint": "MintA",
            "inAmount": "1000000",
            "outputMint": "MintB",
            "outAmount": "2500",
            "otherAmountThreshold": "2488",
            "routePlan": [
                {"swapInfo": {"ammKey": "amm1", "label": "Whirlpool", "feeAmount": "25", "feeMint": "MintA"}, "percent": 100}
            ],
            "contextSlot": 12
        });
        let mock = server
            .mock("GET", "/quote")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("inputMint".into(), "MintA".into()),
                Matcher::UrlEncoded("outputMint".into(), "MintB".into()),
                Matcher::UrlEncoded("amount".into(), "1000000".into()),
                Matcher::UrlEncoded("slippageBps".into(), "50".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let quote = client(&server).fetch_quote("MintA", "MintB", 1_000_000).await.unwrap();
        assert_eq!(quote.in_amount, Some(1_000_000));
        assert_eq!(quote.out_amount, 2500);
        assert_eq!(quote.route_plan.as_ref().unwrap()[0].swap_info.fee_amount, "25");
        assert_eq!(quote.payload.as_value(), &body);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_quote_error_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/quote")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":"Could not find any route","errorCode":"COULD_NOT_FIND_ANY_ROUTE"}"#)
            .create_async()
            .await;

        let err = client(&server).fetch_quote("MintA", "MintB", 1).await.unwrap_err();
        match err {
            SwapError::Aggregator(msg) => assert!(msg.contains("Could not find any route")),
            other => panic!("Expected Aggregator error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_quote_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/quote")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"inAmount":"1"}"#)
            .create_async()
            .await;

        let err = client(&server).fetch_quote("MintA", "MintB", 1).await.unwrap_err();
        assert!(matches!(err, SwapError::Aggregator(_)));
    }

    #[tokio::test]
    async fn test_swap_transaction_posts_route_verbatim() {
        use solana_sdk::message::{Message, VersionedMessage};
        use solana_sdk::signature::Signature;

        let owner = Pubkey::new_unique();
        let ix = solana_sdk::system_instruction::transfer(&owner, &Pubkey::new_unique(), 1);
        let tx = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(Message::new(&[ix], Some(&owner))),
        };
        let encoded = BASE64_STANDARD.encode(bincode::serialize(&tx).unwrap());

        let route = RoutePayload::new(json!({"outAmount": "5", "opaque": [1, 2, 3]}));
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/swap")
            .match_body(Matcher::Json(json!({
                "quoteResponse": {"outAmount": "5", "opaque": [1, 2, 3]},
                "userPublicKey": owner.to_string(),
                "wrapAndUnwrapSol": true
            })))
            .with_status(200)
            .with_body(json!({"swapTransaction": encoded, "lastValidBlockHeight": 100}).to_string())
            .create_async()
            .await;

        let decoded = client(&server).swap_transaction(&route, &owner).await.unwrap();
        assert_eq!(decoded, tx);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_tradable_tokens() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tokens")
            .match_query(Matcher::UrlEncoded("tags".into(), "community".into()))
            .with_status(200)
            .with_body(r#"[{"address":"MintA","symbol":"AAA","name":"A Token","decimals":6,"logoURI":null,"tags":["community"]}]"#)
            .create_async()
            .await;

        let tokens = client(&server).tradable_tokens().await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "AAA");
        assert_eq!(tokens[0].tags, vec!["community".to_string()]);
    }

    #[test]
    fn test_decode_transaction_rejects_garbage() {
        assert!(matches!(decode_transaction("***"), Err(SwapError::Aggregator(_))));
        assert!(matches!(decode_transaction("AAAA"), Err(SwapError::Aggregator(_))));
    }
}
