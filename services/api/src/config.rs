//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// Every service binary reads the same structure and uses the parts it needs.
#[derive(Clone, Debug)]
pub struct Config {
    pub classifier_bind_address: SocketAddr,
    pub crop_bind_address: SocketAddr,
    pub chat_bind_address: SocketAddr,
    pub voice_bind_address: SocketAddr,
    pub log_level: Level,
    /// `None` means any origin may call the services.
    pub cors_origin: Option<String>,

    pub generative_api_key: String,
    pub generative_api_base: String,
    pub chat_model: String,
    pub advisor_model: String,

    pub translate_api_key: Option<String>,
    pub translate_api_base: String,

    pub openai_api_key: Option<String>,
    pub tts_model: String,

    pub model_server_url: String,
    pub disease_model_name: String,
    pub crop_model_name: Option<String>,

    pub upload_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub conversation_log: PathBuf,
    pub detection_log: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let classifier_bind_address = bind_address("CLASSIFIER_BIND_ADDRESS", "0.0.0.0:5000")?;
        let crop_bind_address = bind_address("CROP_BIND_ADDRESS", "0.0.0.0:5001")?;
        let chat_bind_address = bind_address("CHAT_BIND_ADDRESS", "0.0.0.0:3000")?;
        let voice_bind_address = bind_address("VOICE_BIND_ADDRESS", "0.0.0.0:5002")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = optional("CORS_ORIGIN");

        // --- Load Generative API Settings ---
        let generative_api_key = optional("GENERATIVE_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("GENERATIVE_API_KEY".to_string()))?;
        let generative_api_base = or_default(
            "GENERATIVE_API_BASE",
            "https://generativelanguage.googleapis.com/v1beta/openai",
        );
        let chat_model = or_default("CHAT_MODEL", "gemini-2.0-flash");
        let advisor_model = or_default("ADVISOR_MODEL", "gemini-1.5-flash");

        // --- Load Translation and Speech Settings (keys are optional) ---
        let translate_api_key = optional("TRANSLATE_API_KEY");
        let translate_api_base = or_default(
            "TRANSLATE_API_BASE",
            "https://translation.googleapis.com/language/translate/v2",
        );
        let openai_api_key = optional("OPENAI_API_KEY");
        let tts_model = or_default("TTS_MODEL", "tts-1");

        // --- Load Model Server Settings ---
        let model_server_url = or_default("MODEL_SERVER_URL", "http://localhost:8501");
        let disease_model_name = or_default("DISEASE_MODEL_NAME", "plant_village");
        let crop_model_name = optional("CROP_MODEL_NAME");

        // --- Load File Locations ---
        let upload_dir = PathBuf::from(or_default("UPLOAD_DIR", "static/uploads"));
        let audio_dir = PathBuf::from(or_default("AUDIO_DIR", "static"));
        let conversation_log =
            PathBuf::from(or_default("CONVERSATION_LOG", "logs/conversations.txt"));
        let detection_log = PathBuf::from(or_default("DETECTION_LOG", "detection_log.csv"));

        Ok(Self {
            classifier_bind_address,
            crop_bind_address,
            chat_bind_address,
            voice_bind_address,
            log_level,
            cors_origin,
            generative_api_key,
            generative_api_base,
            chat_model,
            advisor_model,
            translate_api_key,
            translate_api_base,
            openai_api_key,
            tts_model,
            model_server_url,
            disease_model_name,
            crop_model_name,
            upload_dir,
            audio_dir,
            conversation_log,
            detection_log,
        })
    }
}

/// Reads a variable, treating an empty value as unset.
fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_default(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

fn bind_address(name: &str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = or_default(name, default);
    raw.parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
