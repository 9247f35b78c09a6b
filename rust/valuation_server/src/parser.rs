// src/parser.rs
//
// Turns the provider's per-period statement records into aligned annual
// series. All output is newest-first, the order the provider reports in.

use crate::error::ValuationError;
use crate::models::AnnualSeries;
use log::{debug, warn};
use query_service::models::AnnualReport;
use std::collections::HashMap;

pub const TOTAL_REVENUE: &str = "totalRevenue";
pub const NET_INCOME: &str = "netIncome";
pub const OPERATING_CASH_FLOW: &str = "operatingCashflow";
pub const CAPITAL_EXPENDITURES: &str = "capitalExpenditures";

/// Income and cash flow records for one fiscal year.
#[derive(Debug, Clone, Copy)]
pub struct PairedPeriod<'a> {
    pub income: &'a AnnualReport,
    pub cash_flow: &'a AnnualReport,
}

#[derive(Debug, Clone, Default)]
pub struct AlignedStatements<'a> {
    pub periods_by_year: HashMap<String, PairedPeriod<'a>>,
    pub year_order: Vec<String>,
}

impl<'a> AlignedStatements<'a> {
    pub fn is_empty(&self) -> bool {
        self.year_order.is_empty()
    }
}

/// Which of the paired records a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Income,
    CashFlow,
}

fn year_label(fiscal_date_ending: &str) -> Result<String, ValuationError> {
    match fiscal_date_ending.get(..4) {
        Some(year) if year.chars().all(|c| c.is_ascii_digit()) => Ok(year.to_string()),
        _ => Err(ValuationError::InvalidFiscalDate(fiscal_date_ending.to_string())),
    }
}

/// Pairs income and cash flow reports that sit at the same position.
///
/// The provider lists both collections for the same fiscal years in the same
/// order; the pairing still checks that the year labels agree instead of
/// trusting position alone, and that no label repeats (a moved fiscal year
/// end can give two reports the same year). An empty collection on either
/// side yields an empty result.
pub fn align_by_year<'a>(
    income_reports: &'a [AnnualReport],
    cash_flow_reports: &'a [AnnualReport],
) -> Result<AlignedStatements<'a>, ValuationError> {
    if income_reports.is_empty() || cash_flow_reports.is_empty() {
        debug!("No periods to align: income={}, cash_flow={}", income_reports.len(), cash_flow_reports.len());
        return Ok(AlignedStatements::default());
    }

    if income_reports.len() != cash_flow_reports.len() {
        warn!(
            "Statement period counts differ: income={}, cash_flow={}",
            income_reports.len(),
            cash_flow_reports.len()
        );
        return Err(ValuationError::PeriodCountMismatch {
            income: income_reports.len(),
            cash_flow: cash_flow_reports.len(),
        });
    }

    let mut aligned = AlignedStatements::default();
    for (index, (income, cash_flow)) in income_reports.iter().zip(cash_flow_reports).enumerate() {
        let year = year_label(&income.fiscal_date_ending)?;
        let cash_flow_year = year_label(&cash_flow.fiscal_date_ending)?;
        if year != cash_flow_year {
            warn!("Fiscal years out of step at {}: {} vs {}", index, year, cash_flow_year);
            return Err(ValuationError::MisalignedYears {
                index,
                income: year,
                cash_flow: cash_flow_year,
            });
        }

        if aligned.periods_by_year.contains_key(&year) {
            warn!("Fiscal year {} reported twice, second time at {}", year, index);
            return Err(ValuationError::DuplicateYear { index, year });
        }

        aligned.year_order.push(year.clone());
        aligned.periods_by_year.insert(year, PairedPeriod { income, cash_flow });
    }

    debug!("Aligned {} fiscal years: {:?}", aligned.year_order.len(), aligned.year_order);
    Ok(aligned)
}

/// Reads one field for every year in `year_order`, in that order.
pub fn extract_series(
    field_name: &str,
    statement: Statement,
    periods_by_year: &HashMap<String, PairedPeriod<'_>>,
    year_order: &[String],
) -> Result<Vec<f64>, ValuationError> {
    year_order
        .iter()
        .map(|year| {
            let parse_error = |reason: String| ValuationError::Parse {
                field: field_name.to_string(),
                year: year.clone(),
                reason,
            };

            let period = periods_by_year
                .get(year)
                .ok_or_else(|| parse_error("no report for this year".to_string()))?;
            let report = match statement {
                Statement::Income => period.income,
                Statement::CashFlow => period.cash_flow,
            };
            let raw = report
                .field(field_name)
                .ok_or_else(|| parse_error("field absent".to_string()))?;

            // Amounts are whole currency units
            raw.trim()
                .parse::<i64>()
                .map(|amount| amount as f64)
                .map_err(|e| parse_error(format!("'{}': {}", raw, e)))
        })
        .collect()
}

/// Elementwise `numerator[i] / denominator[i]`.
pub fn compute_margin(numerator: &[f64], denominator: &[f64]) -> Result<Vec<f64>, ValuationError> {
    if numerator.len() != denominator.len() {
        return Err(ValuationError::LengthMismatch {
            left: numerator.len(),
            right: denominator.len(),
        });
    }

    numerator
        .iter()
        .zip(denominator)
        .enumerate()
        .map(|(index, (top, bottom))| {
            if *bottom == 0.0 {
                warn!("Zero denominator in margin at index {}", index);
                Err(ValuationError::Division { context: "margin", index })
            } else {
                Ok(top / bottom)
            }
        })
        .collect()
}

/// Operating cash flow minus capital expenditures, elementwise.
///
/// Both series keep the provider's signs, so the subtraction is applied as-is.
pub fn compute_free_cash_flow(
    operating_cash_flow: &[f64],
    capital_expenditures: &[f64],
) -> Result<Vec<f64>, ValuationError> {
    if operating_cash_flow.len() != capital_expenditures.len() {
        return Err(ValuationError::LengthMismatch {
            left: operating_cash_flow.len(),
            right: capital_expenditures.len(),
        });
    }

    Ok(operating_cash_flow
        .iter()
        .zip(capital_expenditures)
        .map(|(ocf, capex)| ocf - capex)
        .collect())
}

/// Aligns both statements and extracts every series the valuation uses.
pub fn annual_series(
    income_reports: &[AnnualReport],
    cash_flow_reports: &[AnnualReport],
) -> Result<AnnualSeries, ValuationError> {
    let aligned = align_by_year(income_reports, cash_flow_reports)?;
    let series = |field: &str, statement: Statement| {
        extract_series(field, statement, &aligned.periods_by_year, &aligned.year_order)
    };

    Ok(AnnualSeries {
        revenue: series(TOTAL_REVENUE, Statement::Income)?,
        net_income: series(NET_INCOME, Statement::Income)?,
        operating_cash_flow: series(OPERATING_CASH_FLOW, Statement::CashFlow)?,
        capital_expenditures: series(CAPITAL_EXPENDITURES, Statement::CashFlow)?,
        years: aligned.year_order.clone(),
    })
}

/// Net income over revenue, per year.
pub fn profit_margins(series: &AnnualSeries) -> Result<Vec<f64>, ValuationError> {
    compute_margin(&series.net_income, &series.revenue)
}

pub fn free_cash_flow(series: &AnnualSeries) -> Result<Vec<f64>, ValuationError> {
    compute_free_cash_flow(&series.operating_cash_flow, &series.capital_expenditures)
}

pub fn fcf_margins(series: &AnnualSeries) -> Result<Vec<f64>, ValuationError> {
    compute_margin(&free_cash_flow(series)?, &series.revenue)
}
