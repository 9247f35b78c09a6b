// src/client.rs

use crate::error::QueryError;
use crate::models::{CashFlowResponse, CompanyFundamentals, IncomeStatementResponse, OverviewResponse};
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

// Keys the provider uses in place of a payload when a call is rejected or throttled
const PROVIDER_MESSAGE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

#[derive(Debug, Validate)]
struct SymbolQuery {
    #[validate(length(min = 1, max = 10))]
    symbol: String,
}

/// Thin async client for the provider's `/query` endpoint.
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        AlphaVantageClient {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn income_statement(&self, symbol: &str) -> Result<IncomeStatementResponse, QueryError> {
        self.query("INCOME_STATEMENT", symbol).await
    }

    pub async fn cash_flow(&self, symbol: &str) -> Result<CashFlowResponse, QueryError> {
        self.query("CASH_FLOW", symbol).await
    }

    pub async fn overview(&self, symbol: &str) -> Result<OverviewResponse, QueryError> {
        self.query("OVERVIEW", symbol).await
    }

    /// Fetches the three documents a valuation needs, concurrently.
    pub async fn fundamentals(&self, symbol: &str) -> Result<CompanyFundamentals, QueryError> {
        let (income_statement, cash_flow, overview) = tokio::try_join!(
            self.income_statement(symbol),
            self.cash_flow(symbol),
            self.overview(symbol),
        )?;

        Ok(CompanyFundamentals {
            income_statement,
            cash_flow,
            overview,
        })
    }

    async fn query<T: DeserializeOwned>(&self, function: &str, symbol: &str) -> Result<T, QueryError> {
        let symbol = normalize_symbol(symbol)?;
        let url = format!("{}/query", self.base_url);
        debug!("Requesting {} for {} from {}", function, symbol, url);

        let body: Value = self
            .http
            .get(&url)
            .query(&[
                ("function", function),
                ("symbol", symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(message) = provider_message(&body) {
            warn!("{} request for {} rejected by provider: {}", function, symbol, message);
            return Err(QueryError::Provider(message));
        }

        Ok(serde_json::from_value(body)?)
    }
}

fn normalize_symbol(symbol: &str) -> Result<String, QueryError> {
    let query = SymbolQuery {
        symbol: symbol.trim().to_uppercase(),
    };
    let valid_chars = query
        .symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

    if query.validate().is_err() || !valid_chars {
        return Err(QueryError::InvalidSymbol(query.symbol));
    }

    Ok(query.symbol)
}

fn provider_message(body: &Value) -> Option<String> {
    let object = match body.as_object() {
        Some(object) => object,
        None => return Some("response is not a JSON object".to_string()),
    };

    // Unknown symbols come back as an empty object
    if object.is_empty() {
        return Some("no data for requested symbol".to_string());
    }

    PROVIDER_MESSAGE_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" ibm ").unwrap(), "IBM");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert!(matches!(normalize_symbol(""), Err(QueryError::InvalidSymbol(_))));
        assert!(matches!(normalize_symbol("IBM&x=1"), Err(QueryError::InvalidSymbol(_))));
        assert!(matches!(
            normalize_symbol("WAYTOOLONGSYMBOL"),
            Err(QueryError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn test_provider_message() {
        assert_eq!(
            provider_message(&json!({"Note": "Thank you for using Alpha Vantage!"})),
            Some("Thank you for using Alpha Vantage!".to_string())
        );
        assert_eq!(
            provider_message(&json!({})),
            Some("no data for requested symbol".to_string())
        );
        assert_eq!(provider_message(&json!({"symbol": "IBM", "annualReports": []})), None);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = AlphaVantageClient::new("http://localhost:1234/", "demo");
        assert_eq!(client.base_url(), "http://localhost:1234");
    }
}
