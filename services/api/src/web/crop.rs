//! services/api/src/web/crop.rs

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::post,
    Router,
};
use krushi_core::domain::CropQuery;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use utoipa::ToSchema;

use super::bad_json;
use super::state::CropState;
use crate::error::ApiError;

/// Soil and climate readings. The web form posts them as strings, so each
/// field accepts a number or a numeric string.
#[derive(Deserialize, ToSchema)]
pub struct CropRequest {
    #[serde(rename = "N")]
    #[schema(value_type = Option<f64>)]
    pub n: Option<Value>,
    #[serde(rename = "P")]
    #[schema(value_type = Option<f64>)]
    pub p: Option<Value>,
    #[serde(rename = "K")]
    #[schema(value_type = Option<f64>)]
    pub k: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub temperature: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub humidity: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub ph: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub rainfall: Option<Value>,
}

#[derive(Serialize, ToSchema)]
pub struct CropResponse {
    pub crop: String,
    pub explanation: String,
}

impl CropRequest {
    fn into_query(self) -> Result<CropQuery, ApiError> {
        Ok(CropQuery {
            n: reading("N", self.n)?,
            p: reading("P", self.p)?,
            k: reading("K", self.k)?,
            temperature: reading("temperature", self.temperature)?,
            humidity: reading("humidity", self.humidity)?,
            ph: reading("ph", self.ph)?,
            rainfall: reading("rainfall", self.rainfall)?,
        })
    }
}

fn reading(name: &str, value: Option<Value>) -> Result<f64, ApiError> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::InvalidInput(format!("Missing or non-numeric field: {name}")))
}

/// `/predict1` is the documented path; the web form posts to `/predict`.
pub fn router(state: Arc<CropState>) -> Router {
    Router::new()
        .route("/predict1", post(predict_crop_handler))
        .route("/predict", post(predict_crop_handler))
        .with_state(state)
}

/// Recommend a crop for the given soil and climate readings.
#[utoipa::path(
    post,
    path = "/predict1",
    request_body = CropRequest,
    responses(
        (status = 200, description = "Recommended crop", body = CropResponse),
        (status = 400, description = "A reading is missing or not numeric"),
        (status = 500, description = "Crop recommendation failed")
    )
)]
pub async fn predict_crop_handler(
    State(state): State<Arc<CropState>>,
    payload: Result<Json<CropRequest>, JsonRejection>,
) -> Result<Json<CropResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;
    let query = request.into_query()?;
    info!(?query, "Crop recommendation requested");

    let result = state
        .advisor
        .recommend(&query)
        .await
        .map_err(ApiError::upstream("Crop recommendation failed"))?;
    Ok(Json(CropResponse {
        crop: result.crop,
        explanation: result.explanation,
    }))
}
