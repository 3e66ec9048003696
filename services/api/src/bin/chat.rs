//! services/api/src/bin/chat.rs
//!
//! Farming chatbot service, also serving the animal detection log.

use std::sync::Arc;

use krushi_api::{
    adapters::{CsvDetectionLog, GoogleTranslateAdapter, OpenAiTextAdapter},
    config::Config,
    error::ApiError,
    startup,
    web::{self, chat, state::ChatState},
};
use krushi_core::FarmChat;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    startup::init_tracing(&config);
    info!("Configuration loaded. Starting chat service...");

    if config.translate_api_key.is_none() {
        warn!("TRANSLATE_API_KEY is not set; answers in other languages will stay in English");
    }
    let translator = Arc::new(GoogleTranslateAdapter::new(
        startup::http_client()?,
        config.translate_api_base.clone(),
        config.translate_api_key.clone(),
    ));
    let llm = Arc::new(OpenAiTextAdapter::new(
        startup::generative_client(&config),
        config.chat_model.clone(),
    ));

    let state = Arc::new(ChatState {
        chat: FarmChat::new(llm, translator),
        detections: Arc::new(CsvDetectionLog::new(config.detection_log.clone())),
    });

    let app = web::with_common_layers(chat::router(state), startup::cors_layer(&config)?);
    startup::serve("chat service", config.chat_bind_address, app).await
}
