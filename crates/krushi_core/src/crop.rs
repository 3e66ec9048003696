//! crates/krushi_core/src/crop.rs
//!
//! Crop recommendation: local tabular model first, generative model as fallback,
//! and a generative rationale in both cases.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{CropQuery, CropResult};
use crate::ports::{CropModel, PortError, PortResult, TextGenerationService};
use crate::prompts::{crop_prediction_prompt, crop_rationale_prompt};
use crate::text::{split_crop_reply, strip_emphasis, MISSING_EXPLANATION};

#[derive(Clone)]
pub struct CropAdvisor {
    model: Option<Arc<dyn CropModel>>,
    llm: Arc<dyn TextGenerationService>,
}

impl CropAdvisor {
    /// `model` is `None` when no local model is deployed; every request then
    /// goes through the generative fallback.
    pub fn new(model: Option<Arc<dyn CropModel>>, llm: Arc<dyn TextGenerationService>) -> Self {
        Self { model, llm }
    }

    pub async fn recommend(&self, query: &CropQuery) -> PortResult<CropResult> {
        match self.local_prediction(query).await {
            Some(crop) => {
                info!(crop = %crop, "Local crop model prediction");
                let explanation = self.rationale(query, &crop).await;
                Ok(CropResult { crop, explanation })
            }
            None => {
                info!("Falling back to generative crop prediction");
                let reply = self.llm.generate(&crop_prediction_prompt(query)).await?;
                let result = split_crop_reply(&reply);
                if result.crop.is_empty() {
                    return Err(PortError::Upstream(
                        "Generative model did not name a crop.".to_string(),
                    ));
                }
                Ok(result)
            }
        }
    }

    /// Any model failure, including a blank label, counts as "no local result".
    async fn local_prediction(&self, query: &CropQuery) -> Option<String> {
        let model = self.model.as_ref()?;
        match model.predict(query).await {
            Ok(crop) if !crop.trim().is_empty() => Some(crop.trim().to_string()),
            Ok(_) => {
                warn!("Local crop model returned an empty label");
                None
            }
            Err(e) => {
                warn!(error = %e, "Local crop model failed");
                None
            }
        }
    }

    async fn rationale(&self, query: &CropQuery, crop: &str) -> String {
        match self.llm.generate(&crop_rationale_prompt(query, crop)).await {
            Ok(text) if !text.trim().is_empty() => strip_emphasis(text.trim()),
            Ok(_) => MISSING_EXPLANATION.to_string(),
            Err(e) => {
                warn!(error = %e, "Crop rationale generation failed");
                MISSING_EXPLANATION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FixedCropModel, ScriptedLlm};

    fn sample() -> CropQuery {
        CropQuery {
            n: 90.0,
            p: 42.0,
            k: 43.0,
            temperature: 20.8,
            humidity: 82.0,
            ph: 6.5,
            rainfall: 202.9,
        }
    }

    #[tokio::test]
    async fn local_prediction_is_explained_by_llm() {
        let llm = Arc::new(ScriptedLlm::replying("Rice thrives in warm, wet fields."));
        let advisor = CropAdvisor::new(Some(Arc::new(FixedCropModel(Some("rice")))), llm.clone());

        let result = advisor.recommend(&sample()).await.unwrap();

        assert_eq!(result.crop, "rice");
        assert_eq!(result.explanation, "Rice thrives in warm, wet fields.");
        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("suggested rice"));
    }

    #[tokio::test]
    async fn failing_model_falls_back_to_generative_prediction() {
        let llm = Arc::new(ScriptedLlm::replying("Maize\nModerate rain and neutral pH."));
        let advisor = CropAdvisor::new(Some(Arc::new(FixedCropModel(None))), llm.clone());

        let result = advisor.recommend(&sample()).await.unwrap();

        assert_eq!(result.crop, "Maize");
        assert_eq!(result.explanation, "Moderate rain and neutral pH.");
        assert_eq!(llm.calls(), 1);
        assert!(llm.prompts.lock().unwrap()[0].contains("first line"));
    }

    #[tokio::test]
    async fn missing_model_with_single_line_reply_still_fills_both_fields() {
        let llm = Arc::new(ScriptedLlm::replying("jute"));
        let advisor = CropAdvisor::new(None, llm);

        let result = advisor.recommend(&sample()).await.unwrap();

        assert_eq!(result.crop, "jute");
        assert_eq!(result.explanation, MISSING_EXPLANATION);
    }

    #[tokio::test]
    async fn failed_rationale_degrades_to_placeholder() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(PortError::Upstream("down".into()))]));
        let advisor = CropAdvisor::new(Some(Arc::new(FixedCropModel(Some("rice")))), llm);

        let result = advisor.recommend(&sample()).await.unwrap();

        assert_eq!(result.crop, "rice");
        assert_eq!(result.explanation, MISSING_EXPLANATION);
    }

    #[tokio::test]
    async fn failed_fallback_is_an_upstream_error() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(PortError::Upstream("down".into()))]));
        let advisor = CropAdvisor::new(None, llm);

        let err = advisor.recommend(&sample()).await.unwrap_err();
        assert!(matches!(err, PortError::Upstream(_)));
    }
}
