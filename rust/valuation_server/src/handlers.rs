// src/handlers.rs

use crate::analysis::{analyze_fundamentals, trend_for_series};
use crate::engine::project;
use crate::error::ValuationError;
use crate::models::{
    ApiResponse, AssumptionsInput, ScenarioValuation, StockAnalysis, TrendRequest, TrendSummary,
    ValuationRequest, ValuationResult,
};
use crate::parser::annual_series;
use actix_web::{get, post, web, HttpResponse, Responder};
use log::warn;
use query_service::{AlphaVantageClient, QueryError};
use serde::Serialize;
use validator::Validate;

/// Shared, read-only handler state.
pub struct AppState {
    pub client: AlphaVantageClient,
}

fn valuation_failure<T: Serialize>(err: &ValuationError) -> HttpResponse {
    warn!("Rejected request ({:?}): {}", err.kind(), err);
    HttpResponse::UnprocessableEntity().json(ApiResponse::<T>::failure(err.to_string()))
}

fn evaluate(
    label: &str,
    input: &AssumptionsInput,
    base_revenue: f64,
    shares_outstanding: f64,
) -> Result<ValuationResult, HttpResponse> {
    if let Err(errors) = input.validate() {
        return Err(HttpResponse::BadRequest().json(ApiResponse::<ScenarioValuation>::failure(
            format!("Invalid {} scenario: {}", label, errors),
        )));
    }

    project(&input.to_assumptions(), base_revenue, shares_outstanding)
        .map_err(|err| valuation_failure::<ScenarioValuation>(&err))
}

#[post("/valuation")]
pub async fn valuation(request: web::Json<ValuationRequest>) -> impl Responder {
    let low = match evaluate("low", &request.low, request.base_revenue, request.shares_outstanding) {
        Ok(result) => result,
        Err(response) => return response,
    };

    // Each scenario is an independent evaluation
    let high = match &request.high {
        Some(input) => match evaluate("high", input, request.base_revenue, request.shares_outstanding) {
            Ok(result) => Some(result),
            Err(response) => return response,
        },
        None => None,
    };

    HttpResponse::Ok().json(ApiResponse::ok(
        ScenarioValuation { low, high },
        "Valuation succeeded",
    ))
}

#[post("/trend")]
pub async fn trend(request: web::Json<TrendRequest>) -> impl Responder {
    let series = match annual_series(
        &request.income_statement.annual_reports,
        &request.cash_flow.annual_reports,
    ) {
        Ok(series) => series,
        Err(err) => return valuation_failure::<TrendSummary>(&err),
    };

    match trend_for_series(&series, request.pe_ratio) {
        Ok(summary) => HttpResponse::Ok().json(ApiResponse::ok(
            summary,
            format!("Trend computed over {} fiscal years", series.len()),
        )),
        Err(err) => valuation_failure::<TrendSummary>(&err),
    }
}

#[get("/stocks/{symbol}")]
pub async fn stock(state: web::Data<AppState>, symbol: web::Path<String>) -> impl Responder {
    let fundamentals = match state.client.fundamentals(&symbol).await {
        Ok(fundamentals) => fundamentals,
        Err(QueryError::InvalidSymbol(symbol)) => {
            return HttpResponse::BadRequest().json(ApiResponse::<StockAnalysis>::failure(format!(
                "Invalid ticker symbol: {}",
                symbol
            )))
        }
        Err(err) => {
            warn!("Fetching {} failed: {}", symbol, err);
            return HttpResponse::BadGateway().json(ApiResponse::<StockAnalysis>::failure(err.to_string()));
        }
    };

    match analyze_fundamentals(&fundamentals) {
        Ok(analysis) => HttpResponse::Ok().json(ApiResponse::ok(analysis, "Analysis succeeded")),
        Err(err) => valuation_failure::<StockAnalysis>(&err),
    }
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}
