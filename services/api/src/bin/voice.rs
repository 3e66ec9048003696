//! services/api/src/bin/voice.rs
//!
//! Voice question service: text answer, translation and speech.

use std::sync::Arc;

use krushi_api::{
    adapters::{
        FileConversationLog, FsAudioStore, GoogleTranslateAdapter, OpenAiTextAdapter,
        OpenAiTtsAdapter,
    },
    config::Config,
    error::ApiError,
    startup,
    web::{self, state::VoiceState, voice},
};
use krushi_core::VoiceResponder;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    startup::init_tracing(&config);
    info!("Configuration loaded. Starting voice service...");

    // --- 2. Initialize Service Adapters ---
    let llm = Arc::new(OpenAiTextAdapter::new(
        startup::generative_client(&config),
        config.advisor_model.clone(),
    ));
    let translator = Arc::new(GoogleTranslateAdapter::new(
        startup::http_client()?,
        config.translate_api_base.clone(),
        config.translate_api_key.clone(),
    ));
    let speech = Arc::new(OpenAiTtsAdapter::new(
        startup::speech_client(&config)?,
        OpenAiTtsAdapter::model_from_name(&config.tts_model),
    ));
    let audio = Arc::new(FsAudioStore::new(config.audio_dir.clone()));
    let log = Arc::new(FileConversationLog::new(config.conversation_log.clone()));

    // --- 3. Build the Shared State ---
    let state = Arc::new(VoiceState {
        responder: VoiceResponder::new(llm, translator, speech, audio, log),
        audio_dir: config.audio_dir.clone(),
    });

    // --- 4. Create the Web Router & Serve ---
    let app = web::with_common_layers(voice::router(state), startup::cors_layer(&config)?);
    startup::serve("voice service", config.voice_bind_address, app).await
}
