// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Custom function to convert a JSON string to i64
fn string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<i64>().map_err(serde::de::Error::custom)
}

// The provider reports unknown ratios as the literal string "None"
fn string_to_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    match s.as_deref() {
        None | Some("None") | Some("-") | Some("") => Ok(None),
        Some(value) => value.parse::<f64>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// One fiscal period of a statement as the provider sends it.
///
/// Every line item arrives as a string (numbers included, and `"None"` for
/// items the company did not report), so the items are kept keyed by their
/// provider field name and only converted once a caller asks for one.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnualReport {
    pub fiscal_date_ending: String,
    #[serde(default)]
    pub reported_currency: Option<String>,
    #[serde(flatten)]
    pub fields: HashMap<String, String>,
}

impl AnnualReport {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

// INCOME_STATEMENT and CASH_FLOW share the same envelope
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    pub symbol: String,
    #[serde(default)]
    pub annual_reports: Vec<AnnualReport>,
    #[serde(default)]
    pub quarterly_reports: Vec<AnnualReport>,
}

pub type IncomeStatementResponse = StatementResponse;
pub type CashFlowResponse = StatementResponse;

// Define Overview API structure, reduced to what the valuation needs
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OverviewResponse {
    pub symbol: String,
    #[serde(default)]
    pub currency: String,
    #[serde(deserialize_with = "string_to_i64")]
    pub market_capitalization: i64,
    #[serde(rename = "PERatio", default, deserialize_with = "string_to_optional_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(deserialize_with = "string_to_i64")]
    pub shares_outstanding: i64,
}

// Everything fetched for one ticker in a single analysis session
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CompanyFundamentals {
    pub income_statement: IncomeStatementResponse,
    pub cash_flow: CashFlowResponse,
    pub overview: OverviewResponse,
}
