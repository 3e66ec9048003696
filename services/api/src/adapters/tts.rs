//! services/api/src/adapters/tts.rs
//!
//! This module contains the adapter for OpenAI's Text-to-Speech (TTS) service.
//! It implements the `TextToSpeechService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::audio::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use krushi_core::language::VoiceProfile;
use krushi_core::ports::{PortResult, TextToSpeechService};

use super::map_openai_error;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TextToSpeechService` port using the OpenAI TTS API.
#[derive(Clone)]
pub struct OpenAiTtsAdapter {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
}

impl OpenAiTtsAdapter {
    /// Creates a new `OpenAiTtsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: SpeechModel) -> Self {
        Self { client, model }
    }

    /// Parses a model name from configuration; unknown names are passed through.
    pub fn model_from_name(name: &str) -> SpeechModel {
        match name.to_lowercase().as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    /// The voice table: one voice per supported language, English otherwise.
    fn voice_for(profile: VoiceProfile) -> Voice {
        match profile {
            VoiceProfile::English => Voice::Alloy,
            VoiceProfile::Hindi => Voice::Nova,
            VoiceProfile::Marathi => Voice::Shimmer,
        }
    }
}

//=========================================================================================
// `TextToSpeechService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextToSpeechService for OpenAiTtsAdapter {
    /// Generates MP3 audio (`Vec<u8>`) for the given text.
    async fn generate_audio(&self, text: &str, voice: VoiceProfile) -> PortResult<Vec<u8>> {
        let request = CreateSpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice: Self::voice_for(voice),
            ..Default::default()
        };

        let response = self
            .client
            .audio()
            .speech()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        Ok(response.bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_language_gets_its_own_voice() {
        let voices = [
            OpenAiTtsAdapter::voice_for(VoiceProfile::English),
            OpenAiTtsAdapter::voice_for(VoiceProfile::Hindi),
            OpenAiTtsAdapter::voice_for(VoiceProfile::Marathi),
        ];
        assert_ne!(voices[0], voices[1]);
        assert_ne!(voices[1], voices[2]);
        assert_ne!(voices[0], voices[2]);
    }

    #[test]
    fn known_model_names_are_recognised() {
        assert_eq!(OpenAiTtsAdapter::model_from_name("TTS-1"), SpeechModel::Tts1);
        assert_eq!(
            OpenAiTtsAdapter::model_from_name("gpt-4o-mini-tts"),
            SpeechModel::Other("gpt-4o-mini-tts".to_string())
        );
    }
}
