// src/lib.rs

pub mod analysis;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod settings;

use handlers::AppState;
use query_service::AlphaVantageClient;
use settings::Settings;

pub async fn run_server(settings: Settings) -> std::io::Result<()> {
    use actix_web::middleware::Logger;
    use actix_web::{web, App, HttpServer};
    use handlers::{health_check, stock, trend, valuation};

    let state = web::Data::new(AppState {
        client: AlphaVantageClient::new(settings.provider.base_url, settings.provider.api_key),
    });

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(valuation)
            .service(trend)
            .service(stock)
            .service(health_check)
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await
}
