//! services/api/src/adapters/translate.rs
//!
//! Adapter for the Google Cloud Translation v2 REST API.
//! It implements the `TranslationService` port from the `core` crate.

use async_trait::async_trait;
use krushi_core::ports::{PortError, PortResult, TranslationService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Translates with automatic source-language detection.
#[derive(Clone)]
pub struct GoogleTranslateAdapter {
    client: Client,
    base_url: String,
    /// Without a key every call fails, which callers treat as "keep the original text".
    api_key: Option<String>,
}

impl GoogleTranslateAdapter {
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl TranslationService for GoogleTranslateAdapter {
    async fn translate(&self, text: &str, target: &str) -> PortResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PortError::Upstream("Translation API key is not configured.".to_string()))?;

        debug!(language = %target, chars = text.len(), "Requesting translation");
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("key", api_key)])
            .json(&TranslateRequest {
                q: text,
                target,
                format: "text",
            })
            .send()
            .await
            .map_err(|e| PortError::Upstream(format!("Translation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Upstream(format!(
                "Translation API returned {status}: {body}"
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| PortError::Upstream(format!("Malformed translation response: {e}")))?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| PortError::Upstream("Translation API returned no translations.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer, key: Option<&str>) -> GoogleTranslateAdapter {
        GoogleTranslateAdapter::new(
            Client::new(),
            format!("{}/language/translate/v2", server.uri()),
            key.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn returns_first_translation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .and(query_param("key", "secret"))
            .and(body_partial_json(serde_json::json!({ "q": "Water early.", "target": "ta" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "translations": [
                    { "translatedText": "சீக்கிரம் தண்ணீர் பாய்ச்சவும்.", "detectedSourceLanguage": "en" }
                ] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = adapter(&server, Some("secret"))
            .translate("Water early.", "ta")
            .await
            .unwrap();
        assert_eq!(text, "சீக்கிரம் தண்ணீர் பாய்ச்சவும்.");
    }

    #[tokio::test]
    async fn http_errors_become_upstream_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = adapter(&server, Some("bad")).translate("hi", "ta").await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = adapter(&server, None).translate("hi", "ta").await.unwrap_err();
        assert!(matches!(err, PortError::Upstream(_)));
    }
}
