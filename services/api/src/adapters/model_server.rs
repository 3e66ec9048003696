//! services/api/src/adapters/model_server.rs
//!
//! A small client for a TensorFlow-Serving compatible REST model server,
//! shared by the plant-disease and crop model adapters.

use krushi_core::ports::{PortError, PortResult};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Serialize)]
struct PredictRequest<'a, I> {
    instances: &'a [I],
}

#[derive(Deserialize)]
struct PredictResponse<P> {
    predictions: Vec<P>,
}

#[derive(Deserialize)]
struct ModelStatus {
    #[serde(default)]
    model_version_status: Vec<VersionStatus>,
}

#[derive(Deserialize)]
struct VersionStatus {
    version: String,
    state: String,
}

#[derive(Clone)]
pub struct ModelServerClient {
    client: Client,
    base_url: String,
}

impl ModelServerClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Succeeds only when at least one version of `model` is `AVAILABLE`.
    pub async fn ensure_available(&self, model: &str) -> PortResult<()> {
        let url = format!("{}/v1/models/{}", self.base_url, model);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PortError::Upstream(format!("Model server unreachable at {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::NotFound(format!(
                "Model '{model}' status request returned {status}: {body}"
            )));
        }

        let parsed: ModelStatus = response
            .json()
            .await
            .map_err(|e| PortError::Upstream(format!("Malformed model status: {e}")))?;

        match parsed
            .model_version_status
            .iter()
            .find(|v| v.state.eq_ignore_ascii_case("AVAILABLE"))
        {
            Some(v) => {
                info!(model, version = %v.version, "Model is available");
                Ok(())
            }
            None => Err(PortError::NotFound(format!(
                "Model '{model}' has no AVAILABLE version"
            ))),
        }
    }

    /// Runs `model` on `instances` and returns one prediction per instance.
    pub async fn predict<I, P>(&self, model: &str, instances: &[I]) -> PortResult<Vec<P>>
    where
        I: Serialize + Sync,
        P: DeserializeOwned,
    {
        let url = format!("{}/v1/models/{}:predict", self.base_url, model);
        debug!(model, instances = instances.len(), "Calling model server");

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { instances })
            .send()
            .await
            .map_err(|e| PortError::Upstream(format!("Model server request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Upstream(format!(
                "Model server returned {status}: {body}"
            )));
        }

        let parsed: PredictResponse<P> = response
            .json()
            .await
            .map_err(|e| PortError::Upstream(format!("Malformed prediction response: {e}")))?;

        if parsed.predictions.len() != instances.len() {
            return Err(PortError::Upstream(format!(
                "Model server returned {} predictions for {} instances",
                parsed.predictions.len(),
                instances.len()
            )));
        }
        Ok(parsed.predictions)
    }
}
