//! services/api/src/adapters/vision_llm.rs
//!
//! Adapter for the vision-capable generative model used by the animal watcher.
//! It implements the `FrameInspector` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use krushi_core::ports::{FrameInspector, PortError, PortResult};

use super::map_openai_error;

#[derive(Clone)]
pub struct OpenAiVisionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiVisionAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl FrameInspector for OpenAiVisionAdapter {
    /// Sends the instruction and the frame (inlined as a base64 data URL) in one user turn.
    async fn inspect(&self, jpeg: &[u8], instruction: &str) -> PortResult<String> {
        let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg));

        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(instruction)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(data_url)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            )
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(vec![text_part.into(), image_part.into()])
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| PortError::Upstream("Vision model returned no text content.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> OpenAiVisionAdapter {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(server.uri());
        OpenAiVisionAdapter::new(Client::with_config(config), "gemini-vision-test".to_string())
    }

    #[tokio::test]
    async fn frame_is_sent_as_a_data_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("data:image/jpeg;base64,ZnJhbWU="))
            .and(body_string_contains("Is there an animal?"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-v1",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gemini-vision-test",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": " Cow\n" },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = adapter(&server)
            .inspect(b"frame", "Is there an animal?")
            .await
            .unwrap();
        assert_eq!(reply, "Cow");
    }

    #[tokio::test]
    async fn exhausted_quota_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {
                    "message": "Resource has been exhausted (e.g. check quota).",
                    "type": "insufficient_quota",
                    "param": null,
                    "code": "RESOURCE_EXHAUSTED"
                }
            })))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .inspect(b"frame", "Is there an animal?")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::RateLimited(_)), "got {err:?}");
    }
}
