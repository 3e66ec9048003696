//! services/api/src/bin/classifier.rs
//!
//! Plant-disease service: image classification and treatment advice.

use std::sync::Arc;

use krushi_api::{
    adapters::{ModelServerClient, ModelServerPlantClassifier, OpenAiTextAdapter},
    config::Config,
    error::ApiError,
    startup,
    web::{self, classify, state::ClassifierState},
};
use krushi_core::TreatmentAdvisor;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    startup::init_tracing(&config);
    info!("Configuration loaded. Starting classifier service...");

    // --- 2. Make Sure the Model Is Served ---
    let http = startup::http_client()?;
    let classifier = ModelServerPlantClassifier::new(
        ModelServerClient::new(http, config.model_server_url.clone()),
        config.disease_model_name.clone(),
    );
    if let Err(e) = classifier.ensure_ready().await {
        error!(error = %e, model = %config.disease_model_name, "Disease model is not available");
        return Err(e.into());
    }

    // --- 3. Initialize Service Adapters ---
    let llm = Arc::new(OpenAiTextAdapter::new(
        startup::generative_client(&config),
        config.advisor_model.clone(),
    ));

    // --- 4. Build the Shared State ---
    let state = Arc::new(ClassifierState {
        classifier: Arc::new(classifier),
        treatment: TreatmentAdvisor::new(llm),
        upload_dir: config.upload_dir.clone(),
    });

    // --- 5. Create the Web Router & Serve ---
    let app = web::with_common_layers(classify::router(state), startup::cors_layer(&config)?);
    startup::serve("classifier service", config.classifier_bind_address, app).await
}
