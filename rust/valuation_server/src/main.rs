// src/main.rs

use log::{error, info};
use valuation_server::run_server;
use valuation_server::settings::load_settings;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            error!("{}", err);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()));
        }
    };

    info!(
        "Starting valuation server at http://{}:{}",
        settings.server.host, settings.server.port
    );
    run_server(settings).await
}
