//! crates/krushi_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific model servers, AI providers or file formats.

use async_trait::async_trait;

use crate::domain::{Classification, ConversationEntry, CropQuery, DetectionRecord};
use crate::language::VoiceProfile;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., model server, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The caller supplied something we cannot work with (bad image, missing field).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A model server or third-party API failed.
    #[error("Upstream service error: {0}")]
    Upstream(String),
    /// The upstream provider asked us to slow down (HTTP 429, quota exhausted).
    #[error("Upstream rate limit: {0}")]
    RateLimited(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Model Ports
//=========================================================================================

#[async_trait]
pub trait PlantDiseaseClassifier: Send + Sync {
    /// Classifies an encoded image and returns the single most likely disease.
    async fn classify(&self, image: &[u8]) -> PortResult<Classification>;
}

#[async_trait]
pub trait CropModel: Send + Sync {
    /// Predicts a crop name from the seven soil and climate readings.
    async fn predict(&self, query: &CropQuery) -> PortResult<String>;
}

//=========================================================================================
// Generative AI, Translation and Speech Ports
//=========================================================================================

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Sends a single prompt and returns the model's text.
    async fn generate(&self, prompt: &str) -> PortResult<String>;
}

#[async_trait]
pub trait FrameInspector: Send + Sync {
    /// Asks a vision model about a JPEG frame and returns its raw reply.
    async fn inspect(&self, jpeg: &[u8], instruction: &str) -> PortResult<String>;
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translates text into the language identified by `target` (e.g. "ta").
    async fn translate(&self, text: &str, target: &str) -> PortResult<String>;
}

#[async_trait]
pub trait TextToSpeechService: Send + Sync {
    /// Generates audio data from a string of text.
    async fn generate_audio(&self, text: &str, voice: VoiceProfile) -> PortResult<Vec<u8>>;
}

//=========================================================================================
// Persistence and Notification Ports
//=========================================================================================

#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Stores synthesized audio under a fresh, unique name and returns that name.
    async fn save(&self, audio: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait ConversationLog: Send + Sync {
    async fn append(&self, entry: &ConversationEntry) -> PortResult<()>;
}

#[async_trait]
pub trait DetectionLog: Send + Sync {
    async fn append(&self, record: &DetectionRecord) -> PortResult<()>;
    async fn list(&self) -> PortResult<Vec<DetectionRecord>>;
}

#[async_trait]
pub trait AlertService: Send + Sync {
    /// Sends a text message to the farm owner. Returns the provider's message id.
    async fn send_sms(&self, body: &str) -> PortResult<String>;
    /// Places a voice call that reads out the given TwiML. Returns the call id.
    async fn place_call(&self, twiml: &str) -> PortResult<String>;
}
