// src/settings.rs

use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use query_service::client::DEFAULT_BASE_URL;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("provider.base_url", DEFAULT_BASE_URL)?
        // The provider's public demo key only serves a handful of tickers
        .set_default("provider.api_key", "demo")?)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings = builder.build()?.try_deserialize::<Settings>()?;

    if settings.provider.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("provider.api_key is empty".to_string()));
    }
    Ok(settings)
}

/// Loads settings from defaults, then `valuation.toml` if present, then
/// `VALUATION__*` environment variables (e.g. `VALUATION__PROVIDER__API_KEY`).
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = defaults()?
        .add_source(File::with_name("valuation").required(false))
        .add_source(
            Environment::with_prefix("VALUATION")
                .separator("__")
                .try_parsing(true),
        );
    finish(builder)
}
