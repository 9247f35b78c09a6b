// src/error.rs

use thiserror::Error;

/// Coarse classification callers branch on: a parse failure aborts the
/// ticker, a division failure may be skipped for display-only figures, and an
/// invalid assumption is reported back before any arithmetic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Division,
    InvalidAssumption,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Field '{field}' for fiscal year {year} is missing or non-numeric: {reason}")]
    Parse {
        field: String,
        year: String,
        reason: String,
    },
    #[error("Invalid fiscal date '{0}', expected a date starting with a four digit year")]
    InvalidFiscalDate(String),
    #[error("Fiscal years out of step at position {index}: income statement reports {income}, cash flow reports {cash_flow}")]
    MisalignedYears {
        index: usize,
        income: String,
        cash_flow: String,
    },
    #[error("Fiscal year {year} appears more than once, again at index {index}")]
    DuplicateYear { index: usize, year: String },
    #[error("Income statement has {income} periods but cash flow statement has {cash_flow}")]
    PeriodCountMismatch { income: usize, cash_flow: usize },
    #[error("Division by zero while computing {context} at index {index}")]
    Division { context: &'static str, index: usize },
    #[error("Revenue changes sign between the latest year and {index} years back, growth rate is undefined")]
    UndefinedGrowth { index: usize },
    #[error("Invalid assumption: {0}")]
    InvalidAssumption(String),
    #[error("Series lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

impl ValuationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValuationError::Parse { .. }
            | ValuationError::InvalidFiscalDate(_)
            | ValuationError::MisalignedYears { .. }
            | ValuationError::DuplicateYear { .. }
            | ValuationError::PeriodCountMismatch { .. }
            | ValuationError::LengthMismatch { .. } => ErrorKind::Parse,
            ValuationError::Division { .. } | ValuationError::UndefinedGrowth { .. } => ErrorKind::Division,
            ValuationError::InvalidAssumption(_) => ErrorKind::InvalidAssumption,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
