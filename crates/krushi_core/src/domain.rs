//! crates/krushi_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any HTTP or serialization format.

use chrono::{DateTime, Utc};

/// The single top-1 prediction of the plant-disease classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    /// Percentage in `[0, 100]`.
    pub confidence: f32,
}

/// Which kind of pesticide the farmer wants recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preference {
    #[default]
    Best,
    Organic,
    Inorganic,
}

impl Preference {
    /// Parses a preference case-insensitively. Unknown values mean `Best`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "organic" => Preference::Organic,
            "inorganic" => Preference::Inorganic,
            _ => Preference::Best,
        }
    }
}

/// A request for treatment advice for a detected disease.
#[derive(Debug, Clone)]
pub struct TreatmentQuery {
    pub disease: String,
    pub language: String,
    pub preference: Preference,
}

/// The seven soil and climate readings used for crop recommendation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropQuery {
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl CropQuery {
    /// The readings in the column order the tabular model was trained on.
    pub fn features(&self) -> [f64; 7] {
        [
            self.n,
            self.p,
            self.k,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}

/// A recommended crop together with a short justification.
#[derive(Debug, Clone, PartialEq)]
pub struct CropResult {
    pub crop: String,
    pub explanation: String,
}

/// A farming question typed (or spoken) into the chatbot.
#[derive(Debug, Clone)]
pub struct ChatQuery {
    pub message: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    /// The text returned to the user, translated when required.
    pub response: String,
    /// The generated text before any translation.
    pub original: String,
}

/// The result of a voice question: a short spoken answer plus the full text.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceAnswer {
    pub translated: String,
    pub full: String,
    /// Name of the synthesized audio file, absent when synthesis failed.
    pub filename: Option<String>,
}

/// One line of the append-only conversation log.
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    pub asked_at: DateTime<Utc>,
    pub language: String,
    pub question: String,
    pub answer: String,
}

/// One row of the animal detection log.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    pub frame: String,
    pub animal: String,
    pub detected_at: DateTime<Utc>,
}
