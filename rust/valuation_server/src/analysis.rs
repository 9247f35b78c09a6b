// src/analysis.rs

use crate::engine::{historical_trend, market_snapshot};
use crate::error::ValuationError;
use crate::models::{AnnualSeries, StockAnalysis, TrendSummary};
use crate::parser::{annual_series, fcf_margins, profit_margins, TOTAL_REVENUE};
use log::info;
use query_service::models::CompanyFundamentals;

pub fn trend_for_series(series: &AnnualSeries, current_pe: Option<f64>) -> Result<TrendSummary, ValuationError> {
    historical_trend(
        &series.revenue,
        &fcf_margins(series)?,
        &profit_margins(series)?,
        current_pe,
    )
}

/// Everything the valuation screen shows for a freshly fetched ticker.
pub fn analyze_fundamentals(fundamentals: &CompanyFundamentals) -> Result<StockAnalysis, ValuationError> {
    let overview = &fundamentals.overview;
    let series = annual_series(
        &fundamentals.income_statement.annual_reports,
        &fundamentals.cash_flow.annual_reports,
    )?;

    let base_revenue = series.base_revenue().ok_or_else(|| ValuationError::Parse {
        field: TOTAL_REVENUE.to_string(),
        year: "latest".to_string(),
        reason: "no annual reports".to_string(),
    })?;
    let trend = trend_for_series(&series, overview.pe_ratio)?;
    let snapshot = market_snapshot(overview.market_capitalization as f64, overview.pe_ratio, &series)?;
    info!("Analyzed {} over {} fiscal years", overview.symbol, series.len());

    Ok(StockAnalysis {
        symbol: overview.symbol.clone(),
        currency: overview.currency.clone(),
        years: series.years,
        base_revenue,
        shares_outstanding: overview.shares_outstanding as f64,
        trend,
        snapshot,
    })
}
