//! crates/krushi_core/src/chat.rs
//!
//! The farming chatbot. Answers are generated directly in one of the five
//! prompt languages; any other language gets an English answer that is then
//! translated.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{ChatAnswer, ChatQuery};
use crate::language::{needs_translation, normalize_code};
use crate::ports::{PortError, PortResult, TextGenerationService, TranslationService};
use crate::prompts::{chat_prompt, ChatStyle};

#[derive(Clone)]
pub struct FarmChat {
    llm: Arc<dyn TextGenerationService>,
    translator: Arc<dyn TranslationService>,
}

impl FarmChat {
    pub fn new(llm: Arc<dyn TextGenerationService>, translator: Arc<dyn TranslationService>) -> Self {
        Self { llm, translator }
    }

    /// Short, practical answer. A failed translation is reported inline.
    pub async fn answer(&self, query: &ChatQuery) -> PortResult<ChatAnswer> {
        let (language, original) = self.generate(query, ChatStyle::Concise).await?;

        let response = if needs_translation(&language) {
            match self.translator.translate(&original, &language).await {
                Ok(translated) => translated,
                Err(e) => {
                    warn!(error = %e, language = %language, "Chat translation failed");
                    format!(
                        "Translation failed; here is the original English response: {}",
                        original
                    )
                }
            }
        } else {
            original.clone()
        };

        Ok(ChatAnswer { response, original })
    }

    /// Longer answer phrased for text-to-speech. A failed translation silently
    /// keeps the untranslated text.
    pub async fn answer_spoken(&self, query: &ChatQuery) -> PortResult<ChatAnswer> {
        let (language, original) = self.generate(query, ChatStyle::Spoken).await?;

        let response = if needs_translation(&language) {
            match self.translator.translate(&original, &language).await {
                Ok(translated) => translated,
                Err(e) => {
                    warn!(error = %e, language = %language, "Voice chat translation failed");
                    original.clone()
                }
            }
        } else {
            original.clone()
        };

        Ok(ChatAnswer { response, original })
    }

    async fn generate(&self, query: &ChatQuery, style: ChatStyle) -> PortResult<(String, String)> {
        if query.message.trim().is_empty() {
            return Err(PortError::InvalidInput("No message provided".to_string()));
        }
        let language = normalize_code(&query.language);
        info!(language = %language, style = ?style, "Generating chat answer");

        let prompt = chat_prompt(&query.message, &language, style);
        let text = self.llm.generate(&prompt).await?;
        Ok((language, text.trim().to_string()))
    }
}
