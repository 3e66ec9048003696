//! services/api/src/bin/crop.rs
//!
//! Crop recommendation service.

use std::sync::Arc;

use krushi_api::{
    adapters::{ModelServerClient, ModelServerCropModel, OpenAiTextAdapter},
    config::Config,
    error::ApiError,
    startup,
    web::{self, crop, state::CropState},
};
use krushi_core::{ports::CropModel, CropAdvisor};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    startup::init_tracing(&config);
    info!("Configuration loaded. Starting crop service...");

    // Without a local model every request takes the generative route.
    let model: Option<Arc<dyn CropModel>> = match &config.crop_model_name {
        Some(name) => {
            let server = ModelServerClient::new(startup::http_client()?, config.model_server_url.clone());
            if let Err(e) = server.ensure_available(name).await {
                warn!(error = %e, model = %name, "Crop model not available yet; requests will fall back until it is");
            }
            let model: Arc<dyn CropModel> = Arc::new(ModelServerCropModel::new(server, name.clone()));
            Some(model)
        }
        None => {
            warn!("CROP_MODEL_NAME is not set; using generative crop prediction only");
            None
        }
    };

    let llm = Arc::new(OpenAiTextAdapter::new(
        startup::generative_client(&config),
        config.advisor_model.clone(),
    ));
    let state = Arc::new(CropState {
        advisor: CropAdvisor::new(model, llm),
    });

    let app = web::with_common_layers(crop::router(state), startup::cors_layer(&config)?);
    startup::serve("crop service", config.crop_bind_address, app).await
}
