// src/engine.rs

use crate::error::ValuationError;
use crate::models::{AnnualSeries, Assumptions, MarketSnapshot, TrendPoint, TrendSummary, ValuationResult};
use crate::parser::free_cash_flow;
use log::{debug, trace, warn};

/// Projects fair value per share from the latest revenue.
///
/// Margins are held constant and revenue compounds at the single net factor
/// `(1 + g) / (1 + r)`, so growth and discounting are applied together rather
/// than as separate nominal-growth and discount steps. Each year `t` in
/// `1..=years_of_analysis` contributes `base_revenue * margin * factor^t`, and
/// the terminal value is the final year's figure times the terminal multiple.
pub fn project(
    assumptions: &Assumptions,
    base_revenue: f64,
    shares_outstanding: f64,
) -> Result<ValuationResult, ValuationError> {
    assumptions.check()?;
    if !base_revenue.is_finite() {
        return Err(ValuationError::InvalidAssumption(format!(
            "base revenue must be a finite number, got {}",
            base_revenue
        )));
    }
    // Also rejects NaN
    if !(shares_outstanding > 0.0) {
        warn!("Cannot value per share with {} shares outstanding", shares_outstanding);
        return Err(ValuationError::Division {
            context: "per-share value",
            index: 0,
        });
    }

    let years = assumptions.years_of_analysis;
    let growth_discount_factor =
        (1.0 + assumptions.revenue_growth_rate) / (1.0 + assumptions.desired_return_rate);
    let base_fcf = base_revenue * assumptions.fcf_margin;
    let base_earnings = base_revenue * assumptions.profit_margin;
    debug!(
        "Projecting {} years from revenue {} with growth/discount factor {}",
        years, base_revenue, growth_discount_factor
    );

    let mut sum_fcf = 0.0;
    let mut sum_earnings = 0.0;
    for future_year in 1..=years {
        let compounding = growth_discount_factor.powf(f64::from(future_year));
        let period_fcf = base_fcf * compounding;
        let period_earnings = base_earnings * compounding;
        trace!("Year {}: fcf={} earnings={}", future_year, period_fcf, period_earnings);
        sum_fcf += period_fcf;
        sum_earnings += period_earnings;
    }

    let final_compounding = growth_discount_factor.powf(f64::from(years));
    let terminal_fcf_value = assumptions.terminal_pfcf * base_fcf * final_compounding;
    let terminal_earnings_value = assumptions.terminal_pe * base_earnings * final_compounding;

    let enterprise_value_fcf = sum_fcf + terminal_fcf_value;
    let enterprise_value_earnings = sum_earnings + terminal_earnings_value;

    Ok(ValuationResult {
        intrinsic_value_by_fcf: enterprise_value_fcf / shares_outstanding,
        intrinsic_value_by_earnings: enterprise_value_earnings / shares_outstanding,
    })
}

fn percent_point(horizon_years: usize, fraction: f64) -> TrendPoint {
    let percent = fraction * 100.0;
    TrendPoint {
        horizon_years,
        percent,
        display: format!("{:.1} %", percent),
    }
}

fn cumulative_averages(margins: &[f64]) -> Vec<TrendPoint> {
    let mut sum = 0.0;
    margins
        .iter()
        .enumerate()
        .map(|(j, margin)| {
            sum += margin;
            percent_point(j + 1, sum / (j + 1) as f64)
        })
        .collect()
}

/// Historical revenue growth and average margins over widening lookbacks.
///
/// All series are newest-first. Revenue CAGR is reported for every horizon
/// `j` in `1..N` comparing the latest year with the year `j` back; with fewer
/// than two years there is no horizon and the CAGR list is empty. Margin
/// averages cover the latest `j + 1` years for `j` in `0..N`.
pub fn historical_trend(
    revenue: &[f64],
    fcf_margin: &[f64],
    profit_margin: &[f64],
    current_pe: Option<f64>,
) -> Result<TrendSummary, ValuationError> {
    for other in [fcf_margin.len(), profit_margin.len()] {
        if other != revenue.len() {
            return Err(ValuationError::LengthMismatch {
                left: revenue.len(),
                right: other,
            });
        }
    }

    let mut cagr_by_horizon = Vec::with_capacity(revenue.len().saturating_sub(1));
    if let Some(latest) = revenue.first() {
        for (j, past) in revenue.iter().enumerate().skip(1) {
            if *past == 0.0 {
                warn!("Zero revenue {} years back, CAGR undefined", j);
                return Err(ValuationError::Division {
                    context: "revenue CAGR",
                    index: j,
                });
            }
            if (*latest < 0.0) != (*past < 0.0) {
                warn!("Revenue changes sign {} years back, CAGR undefined", j);
                return Err(ValuationError::UndefinedGrowth { index: j });
            }
            let growth = (latest / past).powf(1.0 / j as f64) - 1.0;
            if !growth.is_finite() {
                return Err(ValuationError::UndefinedGrowth { index: j });
            }
            cagr_by_horizon.push(percent_point(j, growth));
        }
    }
    debug!("Computed {} CAGR horizons over {} years", cagr_by_horizon.len(), revenue.len());

    Ok(TrendSummary {
        cagr_by_horizon,
        cumulative_average_fcf_margin: cumulative_averages(fcf_margin),
        cumulative_average_profit_margin: cumulative_averages(profit_margin),
        current_pe,
    })
}

/// Market multiples against the latest fiscal year.
///
/// These are display figures only, so a zero denominator leaves the ratio
/// empty instead of failing the whole snapshot.
pub fn market_snapshot(
    market_capitalization: f64,
    pe_ratio: Option<f64>,
    series: &AnnualSeries,
) -> Result<MarketSnapshot, ValuationError> {
    let ratio = |denominator: Option<f64>| match denominator {
        Some(value) if value != 0.0 => Some(market_capitalization / value),
        _ => None,
    };
    let latest_fcf = free_cash_flow(series)?.first().copied();

    Ok(MarketSnapshot {
        market_capitalization,
        pe_ratio,
        price_to_sales: ratio(series.base_revenue()),
        price_to_fcf: ratio(latest_fcf),
    })
}
