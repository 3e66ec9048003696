//! services/api/src/web/state.rs
//!
//! Shared state for each HTTP service, created once at startup and passed to
//! all of that service's handlers.

use std::path::PathBuf;
use std::sync::Arc;

use krushi_core::ports::{DetectionLog, PlantDiseaseClassifier};
use krushi_core::{CropAdvisor, FarmChat, TreatmentAdvisor, VoiceResponder};

/// State of the plant-disease classifier service.
#[derive(Clone)]
pub struct ClassifierState {
    pub classifier: Arc<dyn PlantDiseaseClassifier>,
    pub treatment: TreatmentAdvisor,
    /// Uploaded images are kept here and served back under `/static/uploads`.
    pub upload_dir: PathBuf,
}

#[derive(Clone)]
pub struct CropState {
    pub advisor: CropAdvisor,
}

/// State of the chat service, which also exposes the animal detection log.
#[derive(Clone)]
pub struct ChatState {
    pub chat: FarmChat,
    pub detections: Arc<dyn DetectionLog>,
}

#[derive(Clone)]
pub struct VoiceState {
    pub responder: VoiceResponder,
    /// Synthesized answers are served from here under `/static`.
    pub audio_dir: PathBuf,
}
