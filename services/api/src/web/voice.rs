//! services/api/src/web/voice.rs
//!
//! Handlers of the voice service: spoken questions in, short translated
//! answers and MP3 files out.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa::ToSchema;

use super::bad_json;
use super::state::VoiceState;
use crate::error::ApiError;

#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    pub query: Option<String>,
    /// Language code of the answer, `en` when absent.
    pub lang: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AskResponse {
    /// Short answer in the requested language; this is what the audio says.
    pub translated: String,
    /// The full English answer.
    pub full: String,
    /// Audio file under `/static`, absent when speech synthesis failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Audio is served with caching disabled so a replayed answer is never stale.
pub fn router(state: Arc<VoiceState>) -> Router {
    let audio = Router::new()
        .nest_service("/static", ServeDir::new(&state.audio_dir))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ));

    Router::new()
        .route("/ask", post(ask_handler))
        .with_state(state)
        .merge(audio)
}

/// Answer a spoken crop question with text and audio.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer, with an audio file name when synthesis worked", body = AskResponse),
        (status = 500, description = "Failed to generate answer")
    )
)]
pub async fn ask_handler(
    State(state): State<Arc<VoiceState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;
    let answer = state
        .responder
        .respond(
            request.query.as_deref().unwrap_or_default(),
            request.lang.as_deref().unwrap_or("en"),
        )
        .await
        .map_err(ApiError::upstream("Failed to generate answer"))?;

    Ok(Json(AskResponse {
        translated: answer.translated,
        full: answer.full,
        filename: answer.filename,
    }))
}
