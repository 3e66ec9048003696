pub mod chat;
pub mod classify;
pub mod crop;
pub mod rest;
pub mod state;
pub mod voice;

use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use rest::ApiDoc;

/// Uploads above this size are rejected before reaching a handler.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Wraps a service router with Swagger UI and the middleware every service shares.
pub fn with_common_layers(router: Router, cors: CorsLayer) -> Router {
    Router::new()
        .merge(router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
}

/// Turns axum's JSON body rejection into our `{error}` shape.
pub(crate) fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidInput(rejection.body_text())
}
