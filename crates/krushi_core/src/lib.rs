pub mod chat;
pub mod crop;
pub mod domain;
pub mod labels;
pub mod language;
pub mod ports;
pub mod prompts;
pub mod text;
pub mod treatment;
pub mod voice;
pub mod watch;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use chat::FarmChat;
pub use crop::CropAdvisor;
pub use domain::{
    ChatAnswer, ChatQuery, Classification, ConversationEntry, CropQuery, CropResult,
    DetectionRecord, Preference, TreatmentQuery, VoiceAnswer,
};
pub use treatment::TreatmentAdvisor;
pub use voice::VoiceResponder;
pub use watch::{AnimalWatcher, FrameOutcome, RetryPolicy};
