//! crates/krushi_core/src/treatment.rs
//!
//! Generative treatment advice for a classified plant disease.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::TreatmentQuery;
use crate::ports::{PortError, PortResult, TextGenerationService};
use crate::prompts::treatment_prompt;
use crate::text::strip_emphasis;

#[derive(Clone)]
pub struct TreatmentAdvisor {
    llm: Arc<dyn TextGenerationService>,
}

impl TreatmentAdvisor {
    pub fn new(llm: Arc<dyn TextGenerationService>) -> Self {
        Self { llm }
    }

    /// Returns the model's pesticide recommendation with emphasis markers removed.
    pub async fn recommend(&self, query: &TreatmentQuery) -> PortResult<String> {
        if query.disease.trim().is_empty() {
            return Err(PortError::InvalidInput("No disease provided".to_string()));
        }

        let prompt = treatment_prompt(query);
        debug!(prompt = %prompt, "Treatment prompt built");
        info!(
            disease = %query.disease,
            language = %query.language,
            preference = ?query.preference,
            "Requesting treatment advice"
        );

        let raw = self.llm.generate(&prompt).await?;
        let info = strip_emphasis(raw.trim());
        if info.trim().is_empty() {
            return Err(PortError::Upstream(
                "Generative model returned an empty recommendation.".to_string(),
            ));
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Preference;
    use crate::fakes::ScriptedLlm;

    fn query(disease: &str, language: &str) -> TreatmentQuery {
        TreatmentQuery {
            disease: disease.to_string(),
            language: language.to_string(),
            preference: Preference::Best,
        }
    }

    #[tokio::test]
    async fn strips_emphasis_and_sends_disease_verbatim() {
        for lang in ["en", "hi", "mr", "kn"] {
            let llm = Arc::new(ScriptedLlm::replying("**Disease:** Late blight\n*Type:* fungal"));
            let advisor = TreatmentAdvisor::new(llm.clone());

            let info = advisor
                .recommend(&query("Potato___Late_blight", lang))
                .await
                .unwrap();

            assert_eq!(info, "Disease: Late blight\nType: fungal");
            let prompts = llm.prompts.lock().unwrap();
            assert_eq!(prompts.len(), 1);
            assert!(prompts[0].contains("Potato___Late_blight"));
        }
    }

    #[tokio::test]
    async fn blank_disease_is_rejected_without_upstream_call() {
        let llm = Arc::new(ScriptedLlm::replying("unused"));
        let advisor = TreatmentAdvisor::new(llm.clone());

        let err = advisor.recommend(&query("  ", "en")).await.unwrap_err();

        assert!(matches!(err, PortError::InvalidInput(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_surfaced() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(PortError::Upstream("quota".into()))]));
        let advisor = TreatmentAdvisor::new(llm);

        let err = advisor.recommend(&query("Apple___Black_rot", "en")).await.unwrap_err();
        assert!(matches!(err, PortError::Upstream(_)));
    }
}
