// src/lib.rs

pub mod client;
pub mod error;
pub mod models;

pub use client::AlphaVantageClient;
pub use error::QueryError;
