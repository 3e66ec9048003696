//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification covering every HTTP
//! service.

use utoipa::OpenApi;

use super::{chat, classify, crop, voice};

#[derive(OpenApi)]
#[openapi(
    paths(
        classify::predict_handler,
        classify::more_info_handler,
        crop::predict_crop_handler,
        chat::chat_handler,
        chat::voice_chat_handler,
        chat::detected_animals_handler,
        voice::ask_handler,
    ),
    components(
        schemas(
            classify::PredictionResponse,
            classify::MoreInfoRequest,
            classify::MoreInfoResponse,
            crop::CropRequest,
            crop::CropResponse,
            chat::ChatRequest,
            chat::ChatResponse,
            chat::VoiceChatResponse,
            chat::DetectedAnimal,
            voice::AskRequest,
            voice::AskResponse,
        )
    ),
    tags(
        (name = "Krushi API", description = "Plant disease, crop, chat and voice services for farmers.")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_path_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/more-info",
            "/predict1",
            "/api/chat",
            "/api/voice-chat",
            "/api/detected-animals",
            "/ask",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
