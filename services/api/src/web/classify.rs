//! services/api/src/web/classify.rs
//!
//! Handlers of the plant-disease service: image upload and classification,
//! serving uploads back, and treatment advice for a detected disease.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    response::Json,
    routing::post,
    Router,
};
use bytes::Bytes;
use krushi_core::domain::{Preference, TreatmentQuery};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::info;
use utoipa::ToSchema;

use super::bad_json;
use super::state::ClassifierState;
use crate::error::ApiError;

//=========================================================================================
// API Payloads
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct PredictionResponse {
    /// The sanitized name the upload was stored under.
    pub filename: String,
    /// Exactly one `[label, confidence]` pair, confidence in percent.
    #[schema(value_type = Vec<Vec<Object>>)]
    pub predictions: Vec<(String, f32)>,
}

#[derive(Deserialize, ToSchema)]
pub struct MoreInfoRequest {
    pub disease: Option<String>,
    /// Language code, `en` when absent.
    pub lang: Option<String>,
    /// `organic`, `inorganic` or `best` (default).
    pub preference: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MoreInfoResponse {
    pub info: String,
}

//=========================================================================================
// Router
//=========================================================================================

pub fn router(state: Arc<ClassifierState>) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);
    Router::new()
        .route("/", post(predict_handler))
        .route("/more-info", post(more_info_handler))
        .with_state(state)
        .nest_service("/static/uploads", uploads)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Classify an uploaded leaf image.
#[utoipa::path(
    post,
    path = "/",
    request_body(content_type = "multipart/form-data", description = "The image, in a part named `file`."),
    responses(
        (status = 200, description = "Top-1 prediction", body = PredictionResponse),
        (status = 400, description = "No file, or the file is not an image"),
        (status = 500, description = "Model server failure")
    )
)]
pub async fn predict_handler(
    State(state): State<Arc<ClassifierState>>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResponse>, ApiError> {
    let (original_name, data) = read_file_field(&mut multipart).await?;
    let filename = secure_filename(&original_name)
        .ok_or_else(|| ApiError::InvalidInput("No file selected".to_string()))?;

    tokio::fs::create_dir_all(&state.upload_dir).await?;
    tokio::fs::write(state.upload_dir.join(&filename), &data).await?;
    info!(filename = %filename, bytes = data.len(), "Upload stored");

    let result = state
        .classifier
        .classify(&data)
        .await
        .map_err(ApiError::upstream("Prediction failed"))?;

    Ok(Json(PredictionResponse {
        filename,
        predictions: vec![(result.label, result.confidence)],
    }))
}

/// Ask for pesticide advice for a detected disease.
#[utoipa::path(
    post,
    path = "/more-info",
    request_body = MoreInfoRequest,
    responses(
        (status = 200, description = "Treatment advice", body = MoreInfoResponse),
        (status = 400, description = "No disease provided"),
        (status = 500, description = "Generative service error")
    )
)]
pub async fn more_info_handler(
    State(state): State<Arc<ClassifierState>>,
    payload: Result<Json<MoreInfoRequest>, JsonRejection>,
) -> Result<Json<MoreInfoResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;
    let query = TreatmentQuery {
        disease: request.disease.unwrap_or_default(),
        language: request.lang.unwrap_or_else(|| "en".to_string()),
        preference: request
            .preference
            .as_deref()
            .map(Preference::parse)
            .unwrap_or_default(),
    };

    let info = state
        .treatment
        .recommend(&query)
        .await
        .map_err(ApiError::upstream("Generative service error"))?;
    Ok(Json(MoreInfoResponse { info }))
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Returns the client-side file name and bytes of the `file` part.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("No file selected".to_string()));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(format!("Failed to read file bytes: {e}")))?;
        return Ok((name, data));
    }
    Err(ApiError::InvalidInput("No file uploaded".to_string()))
}

/// Reduces a client-supplied name to `[A-Za-z0-9._-]`, with path separators
/// and whitespace runs turned into `_`, and no leading or trailing dots or
/// underscores.
/// `None` when nothing usable remains.
pub fn secure_filename(name: &str) -> Option<String> {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
