//! In-memory port implementations shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{ConversationEntry, CropQuery, DetectionRecord};
use crate::language::VoiceProfile;
use crate::ports::{
    AlertService, AudioStore, ConversationLog, CropModel, DetectionLog, FrameInspector,
    PortError, PortResult, TextGenerationService, TextToSpeechService, TranslationService,
};

/// Replays scripted replies and records every prompt it receives.
/// Once the script is exhausted it keeps returning the last reply.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<PortResult<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<PortResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

fn clone_result(result: &PortResult<String>) -> PortResult<String> {
    match result {
        Ok(text) => Ok(text.clone()),
        Err(PortError::RateLimited(m)) => Err(PortError::RateLimited(m.clone())),
        Err(e) => Err(PortError::Upstream(e.to_string())),
    }
}

impl ScriptedLlm {
    fn next(&self) -> PortResult<String> {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies
                .front()
                .map(clone_result)
                .unwrap_or_else(|| Err(PortError::Upstream("no reply scripted".into())))
        }
    }
}

#[async_trait]
impl TextGenerationService for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.next()
    }
}

#[async_trait]
impl FrameInspector for ScriptedLlm {
    async fn inspect(&self, _jpeg: &[u8], instruction: &str) -> PortResult<String> {
        self.prompts.lock().unwrap().push(instruction.to_string());
        self.next()
    }
}

/// Prefixes the target code, or fails when `fail` is set.
pub struct FakeTranslator {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeTranslator {
    pub fn working() -> Self {
        Self { fail: false, calls: Mutex::new(Vec::new()) }
    }

    pub fn broken() -> Self {
        Self { fail: true, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranslationService for FakeTranslator {
    async fn translate(&self, text: &str, target: &str) -> PortResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target.to_string()));
        if self.fail {
            Err(PortError::Upstream("translator offline".into()))
        } else {
            Ok(format!("[{target}] {text}"))
        }
    }
}

/// Fails for any text longer than `max_chars`.
pub struct FakeSpeech {
    pub max_chars: usize,
    pub requests: Mutex<Vec<(String, VoiceProfile)>>,
}

impl FakeSpeech {
    pub fn accepting_up_to(max_chars: usize) -> Self {
        Self { max_chars, requests: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl TextToSpeechService for FakeSpeech {
    async fn generate_audio(&self, text: &str, voice: VoiceProfile) -> PortResult<Vec<u8>> {
        self.requests.lock().unwrap().push((text.to_string(), voice));
        if text.chars().count() > self.max_chars {
            Err(PortError::Upstream("text too long".into()))
        } else {
            Ok(text.as_bytes().to_vec())
        }
    }
}

#[derive(Default)]
pub struct MemoryAudioStore {
    pub saved: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl AudioStore for MemoryAudioStore {
    async fn save(&self, audio: &[u8]) -> PortResult<String> {
        let mut saved = self.saved.lock().unwrap();
        saved.push(audio.to_vec());
        Ok(format!("output_{:08x}.mp3", saved.len()))
    }
}

#[derive(Default)]
pub struct MemoryConversationLog {
    pub entries: Mutex<Vec<ConversationEntry>>,
}

#[async_trait]
impl ConversationLog for MemoryConversationLog {
    async fn append(&self, entry: &ConversationEntry) -> PortResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDetectionLog {
    pub records: Mutex<Vec<DetectionRecord>>,
}

#[async_trait]
impl DetectionLog for MemoryDetectionLog {
    async fn append(&self, record: &DetectionRecord) -> PortResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list(&self) -> PortResult<Vec<DetectionRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub sms: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl AlertService for RecordingAlerts {
    async fn send_sms(&self, body: &str) -> PortResult<String> {
        self.sms.lock().unwrap().push(body.to_string());
        Ok("SM-test".to_string())
    }

    async fn place_call(&self, twiml: &str) -> PortResult<String> {
        self.calls.lock().unwrap().push(twiml.to_string());
        Ok("CA-test".to_string())
    }
}

/// A local crop model that either always answers or always fails.
pub struct FixedCropModel(pub Option<&'static str>);

#[async_trait]
impl CropModel for FixedCropModel {
    async fn predict(&self, _query: &CropQuery) -> PortResult<String> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| PortError::Upstream("model file missing".into()))
    }
}
