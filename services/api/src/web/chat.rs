//! services/api/src/web/chat.rs
//!
//! Handlers of the chat service: the text chatbot, its speech-friendly
//! variant, and the list of animals the watcher has detected.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::SecondsFormat;
use krushi_core::domain::{ChatQuery, DetectionRecord};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::bad_json;
use super::state::ChatState;
use crate::error::ApiError;

//=========================================================================================
// API Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: Option<String>,
    /// Language code of the answer, `en` when absent.
    pub language: Option<String>,
}

impl ChatRequest {
    fn into_query(self) -> ChatQuery {
        ChatQuery {
            message: self.message.unwrap_or_default(),
            language: self.language.unwrap_or_else(|| "en".to_string()),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Serialize, ToSchema)]
pub struct VoiceChatResponse {
    pub response: String,
    /// The answer before translation.
    pub original: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedAnimal {
    pub frame: String,
    pub animal_type: String,
    /// RFC 3339 timestamp.
    pub detected_at: String,
}

impl From<DetectionRecord> for DetectedAnimal {
    fn from(record: DetectionRecord) -> Self {
        Self {
            frame: record.frame,
            animal_type: record.animal,
            detected_at: record.detected_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

//=========================================================================================
// Router
//=========================================================================================

pub fn router(state: Arc<ChatState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/voice-chat", post(voice_chat_handler))
        .route("/api/detected-animals", get(detected_animals_handler))
        .with_state(state)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Short, practical answer to a farming question.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer in the requested language", body = ChatResponse),
        (status = 400, description = "No message provided"),
        (status = 500, description = "Failed to generate response")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<ChatState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;
    let answer = state
        .chat
        .answer(&request.into_query())
        .await
        .map_err(ApiError::upstream("Failed to generate response"))?;
    Ok(Json(ChatResponse {
        response: answer.response,
    }))
}

/// Detailed answer phrased to be read aloud.
#[utoipa::path(
    post,
    path = "/api/voice-chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Spoken-style answer", body = VoiceChatResponse),
        (status = 400, description = "No message provided"),
        (status = 500, description = "Failed to generate voice response")
    )
)]
pub async fn voice_chat_handler(
    State(state): State<Arc<ChatState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<VoiceChatResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;
    let answer = state
        .chat
        .answer_spoken(&request.into_query())
        .await
        .map_err(ApiError::upstream("Failed to generate voice response"))?;
    Ok(Json(VoiceChatResponse {
        response: answer.response,
        original: answer.original,
    }))
}

/// Animals recorded by the watcher, oldest first.
#[utoipa::path(
    get,
    path = "/api/detected-animals",
    responses(
        (status = 200, description = "Detection log", body = [DetectedAnimal]),
        (status = 500, description = "Failed to read detection log")
    )
)]
pub async fn detected_animals_handler(
    State(state): State<Arc<ChatState>>,
) -> Result<Json<Vec<DetectedAnimal>>, ApiError> {
    let records = state
        .detections
        .list()
        .await
        .map_err(ApiError::upstream("Failed to read detection log"))?;
    Ok(Json(records.into_iter().map(DetectedAnimal::from).collect()))
}
