// tests/integration_tests.rs

use actix_web::{test, web, App};
use mockito::{mock, Matcher};
use more_asserts::assert_gt;
use query_service::models::{AnnualReport, StatementResponse};
use query_service::AlphaVantageClient;
use valuation_server::handlers::{health_check, stock, trend, valuation, AppState};
use valuation_server::models::{
    ApiResponse, AssumptionsInput, ScenarioValuation, StockAnalysis, TrendRequest, TrendSummary,
    ValuationRequest,
};

fn low_scenario() -> AssumptionsInput {
    AssumptionsInput {
        years_of_analysis: 5,
        revenue_growth: 8.0,
        profit_margin: 12.0,
        fcf_margin: 10.0,
        desired_return: 10.0,
        terminal_pe: 16.0,
        terminal_pfcf: 14.0,
    }
}

fn report(date: &str, fields: &[(&str, &str)]) -> AnnualReport {
    AnnualReport {
        fiscal_date_ending: date.to_string(),
        reported_currency: Some("USD".to_string()),
        fields: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[actix_rt::test]
async fn test_valuation_endpoint_success() {
    let mut app = test::init_service(App::new().service(valuation)).await;

    let request = ValuationRequest {
        base_revenue: 1_000_000.0,
        shares_outstanding: 100_000.0,
        low: low_scenario(),
        high: Some(AssumptionsInput {
            revenue_growth: 15.0,
            ..low_scenario()
        }),
    };

    let req = test::TestRequest::post()
        .uri("/valuation")
        .set_json(&request)
        .to_request();

    let resp = test::call_service(&mut app, req).await;

    assert!(resp.status().is_success());

    let response_body = test::read_body(resp).await;
    let result: ApiResponse<ScenarioValuation> = serde_json::from_slice(&response_body).unwrap();

    assert!(result.success);
    assert_eq!(result.message, "Valuation succeeded");

    let scenarios = result.data.unwrap();
    assert!((scenarios.low.intrinsic_value_by_fcf - 17.506514661815).abs() < 1e-6);
    assert!((scenarios.low.intrinsic_value_by_earnings - 23.197426714469).abs() < 1e-6);

    let high = scenarios.high.unwrap();
    assert_gt!(high.intrinsic_value_by_fcf, scenarios.low.intrinsic_value_by_fcf);
}

#[actix_rt::test]
async fn test_valuation_rejects_zero_shares() {
    let mut app = test::init_service(App::new().service(valuation)).await;

    let request = ValuationRequest {
        base_revenue: 1_000_000.0,
        shares_outstanding: 0.0,
        low: low_scenario(),
        high: None,
    };

    let req = test::TestRequest::post()
        .uri("/valuation")
        .set_json(&request)
        .to_request();

    let resp = test::call_service(&mut app, req).await;

    assert_eq!(resp.status(), 422);

    let response_body = test::read_body(resp).await;
    let result: ApiResponse<ScenarioValuation> = serde_json::from_slice(&response_body).unwrap();

    assert!(!result.success);
    assert!(result.data.is_none());
    assert_eq!(
        result.message,
        "Division by zero while computing per-share value at index 0"
    );
}

#[actix_rt::test]
async fn test_valuation_bad_request() {
    let mut app = test::init_service(App::new().service(valuation)).await;

    // Prepare invalid test data (no years to project)
    let request = ValuationRequest {
        base_revenue: 1_000_000.0,
        shares_outstanding: 100_000.0,
        low: low_scenario(),
        high: Some(AssumptionsInput {
            years_of_analysis: 0,
            ..low_scenario()
        }),
    };

    let req = test::TestRequest::post()
        .uri("/valuation")
        .set_json(&request)
        .to_request();

    let resp = test::call_service(&mut app, req).await;

    assert_eq!(resp.status(), 400);

    let response_body = test::read_body(resp).await;
    let result: ApiResponse<ScenarioValuation> = serde_json::from_slice(&response_body).unwrap();

    assert!(!result.success);
    assert!(result.message.starts_with("Invalid high scenario"));
    assert!(result.message.contains("years_of_analysis"));
}

#[actix_rt::test]
async fn test_trend_endpoint() {
    let mut app = test::init_service(App::new().service(trend)).await;

    let request = TrendRequest {
        income_statement: StatementResponse {
            symbol: "IBM".to_string(),
            annual_reports: vec![
                report("2023-12-31", &[("totalRevenue", "150"), ("netIncome", "15")]),
                report("2022-12-31", &[("totalRevenue", "100"), ("netIncome", "10")]),
            ],
            quarterly_reports: vec![],
        },
        cash_flow: StatementResponse {
            symbol: "IBM".to_string(),
            annual_reports: vec![
                report("2023-12-31", &[("operatingCashflow", "30"), ("capitalExpenditures", "15")]),
                report("2022-12-31", &[("operatingCashflow", "20"), ("capitalExpenditures", "10")]),
            ],
            quarterly_reports: vec![],
        },
        pe_ratio: Some(23.7),
    };

    let req = test::TestRequest::post()
        .uri("/trend")
        .set_json(&request)
        .to_request();

    let resp = test::call_service(&mut app, req).await;

    assert!(resp.status().is_success());

    let response_body = test::read_body(resp).await;
    let result: ApiResponse<TrendSummary> = serde_json::from_slice(&response_body).unwrap();

    assert!(result.success);
    let summary = result.data.unwrap();
    assert_eq!(summary.cagr_by_horizon.len(), 1);
    assert_eq!(summary.cagr_by_horizon[0].display, "50.0 %");
    assert_eq!(summary.cumulative_average_profit_margin[1].display, "10.0 %");
    assert_eq!(summary.cumulative_average_fcf_margin[0].display, "10.0 %");
    assert_eq!(summary.current_pe, Some(23.7));
}

#[actix_rt::test]
async fn test_trend_endpoint_misaligned_years() {
    let mut app = test::init_service(App::new().service(trend)).await;

    let request = TrendRequest {
        income_statement: StatementResponse {
            symbol: "IBM".to_string(),
            annual_reports: vec![report("2023-12-31", &[("totalRevenue", "150"), ("netIncome", "15")])],
            quarterly_reports: vec![],
        },
        cash_flow: StatementResponse {
            symbol: "IBM".to_string(),
            annual_reports: vec![report(
                "2022-12-31",
                &[("operatingCashflow", "30"), ("capitalExpenditures", "15")],
            )],
            quarterly_reports: vec![],
        },
        pe_ratio: None,
    };

    let req = test::TestRequest::post()
        .uri("/trend")
        .set_json(&request)
        .to_request();

    let resp = test::call_service(&mut app, req).await;

    assert_eq!(resp.status(), 422);

    let response_body = test::read_body(resp).await;
    let result: ApiResponse<TrendSummary> = serde_json::from_slice(&response_body).unwrap();
    assert!(!result.success);
    assert!(result.message.contains("out of step"));
}

fn query_matcher(function: &str, symbol: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("function".into(), function.into()),
        Matcher::UrlEncoded("symbol".into(), symbol.into()),
        Matcher::UrlEncoded("apikey".into(), "demo".into()),
    ])
}

#[actix_rt::test]
async fn test_stock_endpoint_fetches_and_analyzes() {
    let _income = mock("GET", "/query")
        .match_query(query_matcher("INCOME_STATEMENT", "IBM"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"symbol": "IBM", "annualReports": [
                {"fiscalDateEnding": "2023-12-31", "totalRevenue": "61860000000", "netIncome": "7502000000"},
                {"fiscalDateEnding": "2022-12-31", "totalRevenue": "60530000000", "netIncome": "1639000000"}
            ]}"#,
        )
        .create();
    let _cash_flow = mock("GET", "/query")
        .match_query(query_matcher("CASH_FLOW", "IBM"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"symbol": "IBM", "annualReports": [
                {"fiscalDateEnding": "2023-12-31", "operatingCashflow": "13931000000", "capitalExpenditures": "1690000000"},
                {"fiscalDateEnding": "2022-12-31", "operatingCashflow": "10435000000", "capitalExpenditures": "1346000000"}
            ]}"#,
        )
        .create();
    let _overview = mock("GET", "/query")
        .match_query(query_matcher("OVERVIEW", "IBM"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"Symbol": "IBM", "Currency": "USD", "MarketCapitalization": "197991563000",
                "PERatio": "23.7", "SharesOutstanding": "921148000"}"#,
        )
        .create();

    let state = web::Data::new(AppState {
        client: AlphaVantageClient::new(mockito::server_url(), "demo"),
    });
    let mut app = test::init_service(App::new().app_data(state).service(stock)).await;

    let req = test::TestRequest::get().uri("/stocks/IBM").to_request();
    let resp = test::call_service(&mut app, req).await;

    assert!(resp.status().is_success());

    let response_body = test::read_body(resp).await;
    let result: ApiResponse<StockAnalysis> = serde_json::from_slice(&response_body).unwrap();

    assert!(result.success);
    let analysis = result.data.unwrap();
    assert_eq!(analysis.symbol, "IBM");
    assert_eq!(analysis.currency, "USD");
    assert_eq!(analysis.years, vec!["2023", "2022"]);
    assert_eq!(analysis.base_revenue, 61860000000.0);
    assert_eq!(analysis.shares_outstanding, 921148000.0);
    assert_eq!(analysis.trend.cagr_by_horizon[0].display, "2.2 %");
    assert_eq!(analysis.trend.current_pe, Some(23.7));
    assert_eq!(analysis.snapshot.pe_ratio, Some(23.7));
    assert_gt!(analysis.snapshot.price_to_fcf.unwrap(), 0.0);
}

#[actix_rt::test]
async fn test_stock_endpoint_provider_error() {
    let _income = mock("GET", "/query")
        .match_query(query_matcher("INCOME_STATEMENT", "DEMO2"))
        .with_status(200)
        .with_body(r#"{"Error Message": "Invalid API call."}"#)
        .create();
    let _cash_flow = mock("GET", "/query")
        .match_query(query_matcher("CASH_FLOW", "DEMO2"))
        .with_status(200)
        .with_body(r#"{"Error Message": "Invalid API call."}"#)
        .create();
    let _overview = mock("GET", "/query")
        .match_query(query_matcher("OVERVIEW", "DEMO2"))
        .with_status(200)
        .with_body(r#"{"Error Message": "Invalid API call."}"#)
        .create();

    let state = web::Data::new(AppState {
        client: AlphaVantageClient::new(mockito::server_url(), "demo"),
    });
    let mut app = test::init_service(App::new().app_data(state).service(stock)).await;

    let req = test::TestRequest::get().uri("/stocks/DEMO2").to_request();
    let resp = test::call_service(&mut app, req).await;

    assert_eq!(resp.status(), 502);

    let response_body = test::read_body(resp).await;
    let result: ApiResponse<StockAnalysis> = serde_json::from_slice(&response_body).unwrap();
    assert!(!result.success);
    assert!(result.message.contains("Invalid API call."));
}

#[actix_rt::test]
async fn test_health_check() {
    let mut app = test::init_service(
        App::new().service(health_check)
    ).await;

    let req = test::TestRequest::get()
        .uri("/health")
        .to_request();

    let resp = test::call_service(&mut app, req).await;

    assert!(resp.status().is_success());
    let response_body = test::read_body(resp).await;
    assert_eq!(response_body, "OK");
}
