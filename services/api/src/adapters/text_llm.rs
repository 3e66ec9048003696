//! services/api/src/adapters/text_llm.rs
//!
//! This module contains the adapter for the generative text model (Gemini by
//! default, through its OpenAI-compatible endpoint).
//! It implements the `TextGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use krushi_core::ports::{PortError, PortResult, TextGenerationService};
use tracing::debug;

use super::map_openai_error;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTextAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTextAdapter {
    /// Creates a new `OpenAiTextAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for OpenAiTextAdapter {
    /// Sends the prompt as a single user message and returns the first choice's text.
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling generative model");

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        // Extract the text content from the first choice in the response.
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                PortError::Upstream("Generative model returned no text content.".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> OpenAiTextAdapter {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(server.uri());
        OpenAiTextAdapter::new(Client::with_config(config), "gemini-test".to_string())
    }

    #[tokio::test]
    async fn returns_first_choice_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gemini-test",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "Spray neem oil weekly." },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let text = adapter(&server).generate("aphids?").await.unwrap();
        assert_eq!(text, "Spray neem oil weekly.");
    }

    #[tokio::test]
    async fn empty_choices_are_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-2",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gemini-test",
                "choices": []
            })))
            .mount(&server)
            .await;

        let err = adapter(&server).generate("aphids?").await.unwrap_err();
        assert!(matches!(err, PortError::Upstream(_)));
    }
}
