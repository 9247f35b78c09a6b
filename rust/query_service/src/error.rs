// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid ticker symbol: {0}")]
    InvalidSymbol(String),
    #[error("Request to data provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response shape from data provider: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Data provider returned an error: {0}")]
    Provider(String),
}
