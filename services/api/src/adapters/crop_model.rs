//! services/api/src/adapters/crop_model.rs
//!
//! Tabular crop recommender hosted on the model server. The instance is the
//! seven readings in training column order.

use async_trait::async_trait;
use krushi_core::domain::CropQuery;
use krushi_core::labels::crop_label;
use krushi_core::ports::{CropModel, PortError, PortResult};
use serde::Deserialize;
use tracing::debug;

use super::model_server::ModelServerClient;

/// Exported models differ in what they emit: a label, a class id, or one
/// score per class.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CropPrediction {
    Label(String),
    Index(usize),
    Scores(Vec<f64>),
}

impl CropPrediction {
    fn into_crop(self) -> PortResult<String> {
        match self {
            CropPrediction::Label(label) => Ok(label),
            CropPrediction::Index(index) => crop_label(index).map(str::to_string),
            CropPrediction::Scores(scores) => {
                let best = scores
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_finite())
                    .min_by(|a, b| b.1.total_cmp(a.1))
                    .map(|(i, _)| i)
                    .ok_or_else(|| PortError::Upstream("Crop model returned no scores.".to_string()))?;
                crop_label(best).map(str::to_string)
            }
        }
    }
}

#[derive(Clone)]
pub struct ModelServerCropModel {
    server: ModelServerClient,
    model: String,
}

impl ModelServerCropModel {
    pub fn new(server: ModelServerClient, model: String) -> Self {
        Self { server, model }
    }
}

#[async_trait]
impl CropModel for ModelServerCropModel {
    async fn predict(&self, query: &CropQuery) -> PortResult<String> {
        let predictions: Vec<CropPrediction> =
            self.server.predict(&self.model, &[query.features()]).await?;
        let prediction = predictions
            .into_iter()
            .next()
            .ok_or_else(|| PortError::Upstream("Crop model returned no prediction.".to_string()))?;
        debug!(?prediction, "Crop model replied");
        prediction.into_crop()
    }
}
