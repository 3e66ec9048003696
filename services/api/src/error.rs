//! services/api/src/error.rs
//!
//! Defines the primary error type for the HTTP services and how each variant
//! is rendered to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use krushi_core::ports::PortError;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `krushi_api` services.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request itself is unusable (missing file, non-numeric field, ...).
    #[error("{0}")]
    InvalidInput(String),

    /// A model or third-party API failed while serving the request.
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        source: PortError,
    },

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error building an outbound HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    /// Attaches an endpoint-specific headline to a port failure. Invalid input
    /// stays a client error whatever the context.
    pub fn upstream(context: &'static str) -> impl FnOnce(PortError) -> ApiError {
        move |source| match source {
            PortError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            source => ApiError::Upstream { context, source },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(msg) | ApiError::Port(PortError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Upstream { context, source } => {
                error!(error = %source, "{}", context);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": context, "details": source.to_string() })),
                )
                    .into_response()
            }
            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": other.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
