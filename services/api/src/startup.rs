//! services/api/src/startup.rs
//!
//! Process-level plumbing shared by every binary: logging, outbound clients,
//! CORS, and the serve loop.

use std::net::SocketAddr;

use async_openai::{config::OpenAIConfig, Client};
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, ConfigError};
use crate::error::ApiError;

/// Installs the global `tracing` subscriber at the configured level.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Client for the generative text and vision models.
pub fn generative_client(config: &Config) -> Client<OpenAIConfig> {
    let openai_config = OpenAIConfig::new()
        .with_api_key(&config.generative_api_key)
        .with_api_base(&config.generative_api_base);
    Client::with_config(openai_config)
}

/// Client for the speech API, which always lives at OpenAI.
pub fn speech_client(config: &Config) -> Result<Client<OpenAIConfig>, ApiError> {
    let key = config
        .openai_api_key
        .as_ref()
        .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
    Ok(Client::with_config(OpenAIConfig::new().with_api_key(key)))
}

/// Shared HTTP client for the model server, translation and telephony.
pub fn http_client() -> Result<reqwest::Client, ApiError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("krushi/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Any origin when `CORS_ORIGIN` is unset, otherwise exactly that origin.
pub fn cors_layer(config: &Config) -> Result<CorsLayer, ConfigError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    match &config.cors_origin {
        None => Ok(layer.allow_origin(Any)),
        Some(origin) => {
            let value = origin.parse::<HeaderValue>().map_err(|e| {
                ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
            })?;
            Ok(layer.allow_origin(value))
        }
    }
}

/// Binds `address` and serves `app` until the process is stopped.
pub async fn serve(name: &str, address: SocketAddr, app: Router) -> Result<(), ApiError> {
    info!("Starting {} on {}", name, address);
    info!("Swagger UI available at http://{}/swagger-ui", address);
    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
