//! services/api/src/adapters/plant_model.rs
//!
//! Plant-disease classifier backed by the model server. Images are decoded,
//! resized and normalized here, then sent as a single `[224][224][3]` instance.

use async_trait::async_trait;
use image::imageops::FilterType;
use krushi_core::domain::Classification;
use krushi_core::labels::top_disease;
use krushi_core::ports::{PlantDiseaseClassifier, PortError, PortResult};
use tracing::info;

use super::model_server::ModelServerClient;

/// Side length of the square input the classifier was trained on.
pub const INPUT_SIZE: u32 = 224;

type ImageTensor = Vec<Vec<[f32; 3]>>;

/// Decodes an image, resizes it to `INPUT_SIZE` (nearest neighbour) and
/// scales every RGB channel into `[0, 1]`.
pub fn preprocess(bytes: &[u8]) -> PortResult<ImageTensor> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| PortError::InvalidInput(format!("Uploaded file is not a readable image: {e}")))?;
    let rgb = decoded
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Nearest)
        .to_rgb8();

    Ok((0..INPUT_SIZE)
        .map(|y| {
            (0..INPUT_SIZE)
                .map(|x| {
                    let [r, g, b] = rgb.get_pixel(x, y).0;
                    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
                })
                .collect()
        })
        .collect())
}

#[derive(Clone)]
pub struct ModelServerPlantClassifier {
    server: ModelServerClient,
    model: String,
}

impl ModelServerPlantClassifier {
    pub fn new(server: ModelServerClient, model: String) -> Self {
        Self { server, model }
    }

    /// Startup check: the service must not come up without its model.
    pub async fn ensure_ready(&self) -> PortResult<()> {
        self.server.ensure_available(&self.model).await
    }
}

#[async_trait]
impl PlantDiseaseClassifier for ModelServerPlantClassifier {
    async fn classify(&self, image: &[u8]) -> PortResult<Classification> {
        let bytes = image.to_vec();
        let tensor = tokio::task::spawn_blocking(move || preprocess(&bytes))
            .await
            .map_err(|e| PortError::Unexpected(format!("Preprocessing task failed: {e}")))??;

        let predictions: Vec<Vec<f32>> = self.server.predict(&self.model, &[tensor]).await?;
        let scores = predictions
            .into_iter()
            .next()
            .ok_or_else(|| PortError::Upstream("Classifier returned no prediction.".to_string()))?;

        let result = top_disease(&scores)?;
        info!(label = %result.label, confidence = result.confidence, "Image classified");
        Ok(result)
    }
}
