//! crates/krushi_core/src/language.rs
//!
//! Fixed language tables. Any code outside a table falls back to English.

/// Trims and lower-cases a language code. An empty code means English.
pub fn normalize_code(code: &str) -> String {
    let code = code.trim().to_lowercase();
    if code.is_empty() {
        "en".to_string()
    } else {
        code
    }
}

/// Languages the chatbot can be asked to answer in directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptLanguage {
    English,
    Hindi,
    Marathi,
    Gujarati,
    Punjabi,
}

impl PromptLanguage {
    pub fn from_code(code: &str) -> Option<Self> {
        match normalize_code(code).as_str() {
            "en" => Some(Self::English),
            "hi" => Some(Self::Hindi),
            "mr" => Some(Self::Marathi),
            "gu" => Some(Self::Gujarati),
            "pa" => Some(Self::Punjabi),
            _ => None,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Self::English => "Respond in English",
            Self::Hindi => "Respond in Hindi",
            Self::Marathi => "Respond in Marathi",
            Self::Gujarati => "Respond in Gujarati",
            Self::Punjabi => "Respond in Punjabi",
        }
    }

    /// The instruction for `code`, or the English one for unlisted codes.
    pub fn instruction_for(code: &str) -> &'static str {
        Self::from_code(code)
            .unwrap_or(Self::English)
            .instruction()
    }
}

/// True when an answer generated under the English fallback must be
/// translated afterwards.
pub fn needs_translation(code: &str) -> bool {
    PromptLanguage::from_code(code).is_none()
}

/// The speech voice used when reading an answer aloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceProfile {
    English,
    Hindi,
    Marathi,
}

impl VoiceProfile {
    pub fn for_language(code: &str) -> Self {
        match normalize_code(code).as_str() {
            "hi" => Self::Hindi,
            "mr" => Self::Marathi,
            _ => Self::English,
        }
    }
}
