pub mod audio_store;
pub mod conversation_log;
pub mod crop_model;
pub mod detection_log;
pub mod model_server;
pub mod plant_model;
pub mod text_llm;
pub mod translate;
pub mod tts;
pub mod twilio;
pub mod vision_llm;

pub use audio_store::FsAudioStore;
pub use conversation_log::FileConversationLog;
pub use crop_model::ModelServerCropModel;
pub use detection_log::CsvDetectionLog;
pub use model_server::ModelServerClient;
pub use plant_model::ModelServerPlantClassifier;
pub use text_llm::OpenAiTextAdapter;
pub use translate::GoogleTranslateAdapter;
pub use tts::OpenAiTtsAdapter;
pub use twilio::TwilioAlertAdapter;
pub use vision_llm::OpenAiVisionAdapter;

use async_openai::error::OpenAIError;
use krushi_core::ports::PortError;

/// Maps an OpenAI-compatible client error onto the port error taxonomy.
/// Quota and 429 responses become `RateLimited` so callers can back off.
pub(crate) fn map_openai_error(e: OpenAIError) -> PortError {
    let message = e.to_string();
    let lowered = message.to_lowercase();
    if lowered.contains("429")
        || lowered.contains("rate limit")
        || lowered.contains("resource_exhausted")
        || lowered.contains("resourceexhausted")
        || lowered.contains("quota")
    {
        PortError::RateLimited(message)
    } else {
        PortError::Upstream(message)
    }
}
