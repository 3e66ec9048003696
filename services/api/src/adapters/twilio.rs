//! services/api/src/adapters/twilio.rs
//!
//! Adapter for the Twilio REST API (SMS + programmable voice).
//! It implements the `AlertService` port from the `core` crate.

use async_trait::async_trait;
use krushi_core::ports::{AlertService, PortError, PortResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Account credentials and the two phone numbers involved in every alert.
#[derive(Clone, Debug)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub owner_number: String,
}

#[derive(Deserialize)]
struct CreatedResource {
    sid: String,
}

#[derive(Clone)]
pub struct TwilioAlertAdapter {
    client: Client,
    base_url: String,
    credentials: TwilioCredentials,
}

impl TwilioAlertAdapter {
    pub fn new(client: Client, base_url: impl Into<String>, credentials: TwilioCredentials) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// POSTs a form to `Accounts/{sid}/{resource}` and returns the new resource's sid.
    async fn create(&self, resource: &str, form: &[(&str, &str)]) -> PortResult<String> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/{}",
            self.base_url, self.credentials.account_sid, resource
        );
        debug!(%url, "Calling Twilio");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(form)
            .send()
            .await
            .map_err(|e| PortError::Upstream(format!("Twilio request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(PortError::RateLimited("Twilio returned 429".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Upstream(format!("Twilio returned {status}: {body}")));
        }

        let created: CreatedResource = response
            .json()
            .await
            .map_err(|e| PortError::Upstream(format!("Malformed Twilio response: {e}")))?;
        Ok(created.sid)
    }
}

#[async_trait]
impl AlertService for TwilioAlertAdapter {
    async fn send_sms(&self, body: &str) -> PortResult<String> {
        let creds = &self.credentials;
        self.create(
            "Messages.json",
            &[
                ("To", creds.owner_number.as_str()),
                ("From", creds.from_number.as_str()),
                ("Body", body),
            ],
        )
        .await
    }

    async fn place_call(&self, twiml: &str) -> PortResult<String> {
        let creds = &self.credentials;
        self.create(
            "Calls.json",
            &[
                ("To", creds.owner_number.as_str()),
                ("From", creds.from_number.as_str()),
                ("Twiml", twiml),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> TwilioAlertAdapter {
        TwilioAlertAdapter::new(
            Client::new(),
            server.uri(),
            TwilioCredentials {
                account_sid: "AC123".to_string(),
                auth_token: "token".to_string(),
                from_number: "+15550001111".to_string(),
                owner_number: "+919800000000".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn sms_is_sent_to_the_owner() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("To=%2B919800000000"))
            .and(body_string_contains("Body=Elephant"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "SM42", "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sid = adapter(&server).send_sms("Elephant").await.unwrap();
        assert_eq!(sid, "SM42");
    }

    #[tokio::test]
    async fn call_carries_twiml() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Calls.json"))
            .and(body_string_contains("Twiml=%3CResponse%3E"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "sid": "CA7" })))
            .expect(1)
            .mount(&server)
            .await;

        let sid = adapter(&server)
            .place_call("<Response><Say>Hi</Say></Response>")
            .await
            .unwrap();
        assert_eq!(sid, "CA7");
    }

    #[tokio::test]
    async fn rejected_credentials_are_upstream_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Authenticate"))
            .mount(&server)
            .await;

        let err = adapter(&server).send_sms("Cow").await.unwrap_err();
        assert!(matches!(err, PortError::Upstream(_)));
    }
}
