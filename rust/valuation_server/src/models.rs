// src/models.rs

use crate::error::ValuationError;
use query_service::models::{CashFlowResponse, IncomeStatementResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One fiscal year's statement figures, as parsed from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialPeriod {
    pub fiscal_year: String,
    pub total_revenue: f64,
    pub net_income: f64,
    pub operating_cash_flow: f64,
    pub capital_expenditures: f64,
}

/// Statement figures aligned by fiscal year.
///
/// Every series is newest-first: index 0 is the most recent fiscal year, in
/// the order the provider reports them, and index `i` of every series refers
/// to `years[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualSeries {
    pub years: Vec<String>,
    pub revenue: Vec<f64>,
    pub net_income: Vec<f64>,
    pub operating_cash_flow: Vec<f64>,
    pub capital_expenditures: Vec<f64>,
}

impl AnnualSeries {
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn period(&self, index: usize) -> Option<FinancialPeriod> {
        Some(FinancialPeriod {
            fiscal_year: self.years.get(index)?.clone(),
            total_revenue: *self.revenue.get(index)?,
            net_income: *self.net_income.get(index)?,
            operating_cash_flow: *self.operating_cash_flow.get(index)?,
            capital_expenditures: *self.capital_expenditures.get(index)?,
        })
    }

    pub fn periods(&self) -> impl Iterator<Item = FinancialPeriod> + '_ {
        (0..self.len()).filter_map(move |index| self.period(index))
    }

    /// Revenue of the most recent fiscal year, the base for projections.
    pub fn base_revenue(&self) -> Option<f64> {
        self.revenue.first().copied()
    }
}

/// Valuation inputs as decimal fractions (0.08 for 8%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub years_of_analysis: u32,
    pub revenue_growth_rate: f64,
    pub profit_margin: f64,
    pub fcf_margin: f64,
    pub desired_return_rate: f64,
    pub terminal_pe: f64,
    pub terminal_pfcf: f64,
}

impl Assumptions {
    pub fn check(&self) -> Result<(), ValuationError> {
        if self.years_of_analysis == 0 {
            return Err(ValuationError::InvalidAssumption(
                "years of analysis must be at least 1".to_string(),
            ));
        }

        let named = [
            ("revenue growth rate", self.revenue_growth_rate),
            ("profit margin", self.profit_margin),
            ("free cash flow margin", self.fcf_margin),
            ("desired return rate", self.desired_return_rate),
            ("terminal P/E", self.terminal_pe),
            ("terminal P/FCF", self.terminal_pfcf),
        ];
        if let Some((name, value)) = named.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ValuationError::InvalidAssumption(format!(
                "{} must be a finite number, got {}",
                name, value
            )));
        }

        if self.desired_return_rate <= -1.0 {
            return Err(ValuationError::InvalidAssumption(format!(
                "desired return rate must be above -100%, got {}",
                self.desired_return_rate
            )));
        }

        if self.terminal_pe < 0.0 || self.terminal_pfcf < 0.0 {
            return Err(ValuationError::InvalidAssumption(
                "terminal multiples cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Assumptions as a user enters them: rates and margins in percent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssumptionsInput {
    #[validate(range(min = 1, max = 50))]
    pub years_of_analysis: u32,
    #[validate(range(min = -99.0, max = 1000.0))]
    pub revenue_growth: f64,
    #[validate(range(min = -1000.0, max = 1000.0))]
    pub profit_margin: f64,
    #[validate(range(min = -1000.0, max = 1000.0))]
    pub fcf_margin: f64,
    #[validate(range(min = -99.0, max = 1000.0))]
    pub desired_return: f64,
    #[validate(range(min = 0.0))]
    pub terminal_pe: f64,
    #[validate(range(min = 0.0))]
    pub terminal_pfcf: f64,
}

impl AssumptionsInput {
    pub fn to_assumptions(&self) -> Assumptions {
        fn percent_to_decimal(x: f64) -> f64 {
            x / 100.0
        }

        Assumptions {
            years_of_analysis: self.years_of_analysis,
            revenue_growth_rate: percent_to_decimal(self.revenue_growth),
            profit_margin: percent_to_decimal(self.profit_margin),
            fcf_margin: percent_to_decimal(self.fcf_margin),
            desired_return_rate: percent_to_decimal(self.desired_return),
            terminal_pe: self.terminal_pe,
            terminal_pfcf: self.terminal_pfcf,
        }
    }
}

/// Fair value per share under both methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub intrinsic_value_by_fcf: f64,
    pub intrinsic_value_by_earnings: f64,
}

// A percentage figure over a lookback window, plus its legacy display form ("50.0 %")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub horizon_years: usize,
    pub percent: f64,
    pub display: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub cagr_by_horizon: Vec<TrendPoint>,
    pub cumulative_average_fcf_margin: Vec<TrendPoint>,
    pub cumulative_average_profit_margin: Vec<TrendPoint>,
    pub current_pe: Option<f64>,
}

// Market multiples shown next to the trend table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub market_capitalization: f64,
    pub pe_ratio: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub price_to_fcf: Option<f64>,
}

#[derive(Deserialize, Serialize)]
pub struct ValuationRequest {
    pub base_revenue: f64,
    pub shares_outstanding: f64,
    pub low: AssumptionsInput,
    #[serde(default)]
    pub high: Option<AssumptionsInput>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioValuation {
    pub low: ValuationResult,
    pub high: Option<ValuationResult>,
}

#[derive(Deserialize, Serialize)]
pub struct TrendRequest {
    pub income_statement: IncomeStatementResponse,
    pub cash_flow: CashFlowResponse,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StockAnalysis {
    pub symbol: String,
    pub currency: String,
    pub years: Vec<String>,
    pub base_revenue: f64,
    pub shares_outstanding: f64,
    pub trend: TrendSummary,
    pub snapshot: MarketSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}
