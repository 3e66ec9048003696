//! crates/krushi_core/src/voice.rs
//!
//! Answers a spoken farming question with a short translated reply and an
//! audio rendition of it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{ConversationEntry, VoiceAnswer};
use crate::language::{normalize_code, VoiceProfile};
use crate::ports::{
    AudioStore, ConversationLog, PortResult, TextGenerationService, TextToSpeechService,
    TranslationService,
};
use crate::prompts::voice_question_prompt;
use crate::text::{clean_for_speech, leading_sentences};

pub const TOO_SHORT_REPLY: &str = "Please ask a more specific crop-related question.";
pub const PARTIAL_AUDIO_NOTE: &str = " (Partial audio generated.)";
pub const AUDIO_FAILED_NOTE: &str = " (Audio generation failed.)";

const MIN_QUERY_CHARS: usize = 3;
const SHORT_ANSWER_SENTENCES: usize = 3;

/// The ports a voice answer is assembled from.
#[derive(Clone)]
pub struct VoiceResponder {
    llm: Arc<dyn TextGenerationService>,
    translator: Arc<dyn TranslationService>,
    speech: Arc<dyn TextToSpeechService>,
    audio: Arc<dyn AudioStore>,
    log: Arc<dyn ConversationLog>,
}

impl VoiceResponder {
    pub fn new(
        llm: Arc<dyn TextGenerationService>,
        translator: Arc<dyn TranslationService>,
        speech: Arc<dyn TextToSpeechService>,
        audio: Arc<dyn AudioStore>,
        log: Arc<dyn ConversationLog>,
    ) -> Self {
        Self {
            llm,
            translator,
            speech,
            audio,
            log,
        }
    }

    /// Only a failing generative call is an error; translation, synthesis
    /// and logging failures degrade the answer instead.
    pub async fn respond(&self, query: &str, lang: &str) -> PortResult<VoiceAnswer> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(VoiceAnswer {
                translated: TOO_SHORT_REPLY.to_string(),
                full: String::new(),
                filename: None,
            });
        }
        let lang = normalize_code(lang);

        let full = self
            .llm
            .generate(&voice_question_prompt(query))
            .await?
            .trim()
            .to_string();
        let short = leading_sentences(&full, SHORT_ANSWER_SENTENCES);

        let mut translated = if lang == "en" {
            short
        } else {
            match self.translator.translate(&short, &lang).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, language = %lang, "Voice answer translation failed");
                    short
                }
            }
        };

        let spoken = clean_for_speech(&translated);
        let filename = match self.synthesize(&spoken, VoiceProfile::for_language(&lang)).await {
            Synthesis::Complete(name) => Some(name),
            Synthesis::Partial(name) => {
                translated.push_str(PARTIAL_AUDIO_NOTE);
                Some(name)
            }
            Synthesis::Failed => {
                translated.push_str(AUDIO_FAILED_NOTE);
                None
            }
        };

        let entry = ConversationEntry {
            asked_at: Utc::now(),
            language: lang,
            question: query.to_string(),
            answer: translated.clone(),
        };
        if let Err(e) = self.log.append(&entry).await {
            warn!(error = %e, "Failed to append to conversation log");
        }

        info!(audio = ?filename, "Voice question answered");
        Ok(VoiceAnswer {
            translated,
            full,
            filename,
        })
    }

    /// Full text first, then a single retry with the first sentence only.
    async fn synthesize(&self, text: &str, voice: VoiceProfile) -> Synthesis {
        match self.speak(text, voice).await {
            Ok(name) => return Synthesis::Complete(name),
            Err(e) => warn!(error = %e, "Speech synthesis failed, retrying with first sentence"),
        }

        let first = leading_sentences(text, 1);
        match self.speak(&first, voice).await {
            Ok(name) => Synthesis::Partial(name),
            Err(e) => {
                warn!(error = %e, "Fallback speech synthesis failed");
                Synthesis::Failed
            }
        }
    }

    async fn speak(&self, text: &str, voice: VoiceProfile) -> PortResult<String> {
        let audio = self.speech.generate_audio(text, voice).await?;
        self.audio.save(&audio).await
    }
}

enum Synthesis {
    Complete(String),
    Partial(String),
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeSpeech, FakeTranslator, MemoryAudioStore, MemoryConversationLog, ScriptedLlm};

    struct Rig {
        llm: Arc<ScriptedLlm>,
        translator: Arc<FakeTranslator>,
        speech: Arc<FakeSpeech>,
        audio: Arc<MemoryAudioStore>,
        log: Arc<MemoryConversationLog>,
    }

    impl Rig {
        fn new(reply: &str, speech_limit: usize) -> Self {
            Self {
                llm: Arc::new(ScriptedLlm::replying(reply)),
                translator: Arc::new(FakeTranslator::working()),
                speech: Arc::new(FakeSpeech::accepting_up_to(speech_limit)),
                audio: Arc::new(MemoryAudioStore::default()),
                log: Arc::new(MemoryConversationLog::default()),
            }
        }

        fn responder(&self) -> VoiceResponder {
            VoiceResponder::new(
                self.llm.clone(),
                self.translator.clone(),
                self.speech.clone(),
                self.audio.clone(),
                self.log.clone(),
            )
        }
    }

    const REPLY: &str = "Water early. Use mulch. Rotate crops. Test soil yearly.";

    #[tokio::test]
    async fn short_query_makes_no_upstream_calls() {
        let rig = Rig::new(REPLY, 1000);

        let answer = rig.responder().respond(" hi ", "hi").await.unwrap();

        assert_eq!(answer.translated, TOO_SHORT_REPLY);
        assert_eq!(answer.full, "");
        assert_eq!(answer.filename, None);
        assert_eq!(rig.llm.calls(), 0);
        assert_eq!(rig.translator.calls(), 0);
        assert!(rig.speech.requests.lock().unwrap().is_empty());
        assert!(rig.log.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn english_answer_is_truncated_spoken_and_logged() {
        let rig = Rig::new(REPLY, 1000);

        let answer = rig.responder().respond("How to save water?", "en").await.unwrap();

        assert_eq!(answer.full, REPLY);
        assert_eq!(answer.translated, "Water early. Use mulch. Rotate crops.");
        assert_eq!(answer.filename.as_deref(), Some("output_00000001.mp3"));
        assert_eq!(rig.translator.calls(), 0);

        let entries = rig.log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].question, "How to save water?");
    }

    #[tokio::test]
    async fn other_languages_are_translated_and_use_their_voice() {
        let rig = Rig::new(REPLY, 1000);

        let answer = rig.responder().respond("पानी कैसे बचाएं?", "hi").await.unwrap();

        assert_eq!(answer.translated, "[hi] Water early. Use mulch. Rotate crops.");
        let requests = rig.speech.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        // Brackets are stripped before synthesis.
        assert_eq!(requests[0].0, "hi Water early. Use mulch. Rotate crops.");
        assert_eq!(requests[0].1, VoiceProfile::Hindi);
    }

    #[tokio::test]
    async fn failed_synthesis_retries_with_first_sentence() {
        let rig = Rig::new(REPLY, 15);

        let answer = rig.responder().respond("How to save water?", "en").await.unwrap();

        assert!(answer.translated.ends_with(PARTIAL_AUDIO_NOTE));
        assert!(answer.filename.is_some());
        let requests = rig.speech.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].0, "Water early.");
    }

    #[tokio::test]
    async fn double_synthesis_failure_still_answers() {
        let rig = Rig::new(REPLY, 3);

        let answer = rig.responder().respond("How to save water?", "en").await.unwrap();

        assert_eq!(
            answer.translated,
            format!("Water early. Use mulch. Rotate crops.{AUDIO_FAILED_NOTE}")
        );
        assert_eq!(answer.filename, None);
        assert!(rig.audio.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_translation_keeps_english_short_answer() {
        let mut rig = Rig::new(REPLY, 1000);
        rig.translator = Arc::new(FakeTranslator::broken());

        let answer = rig.responder().respond("How to save water?", "mr").await.unwrap();

        assert_eq!(answer.translated, "Water early. Use mulch. Rotate crops.");
        assert_eq!(rig.speech.requests.lock().unwrap()[0].1, VoiceProfile::Marathi);
    }
}
