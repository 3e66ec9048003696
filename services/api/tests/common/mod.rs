//! Shared helpers for the router integration tests.
//!
//! Each builder wires one service router the same way its binary does, with
//! in-memory fakes standing in for the model server and third-party APIs.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use krushi_api::web::{self, chat, classify, crop, state, voice};
use krushi_core::domain::Classification;
use krushi_core::ports::{
    AudioStore, ConversationLog, CropModel, DetectionLog, PlantDiseaseClassifier, PortError,
    PortResult, TextGenerationService, TextToSpeechService, TranslationService,
};
use krushi_core::{CropAdvisor, FarmChat, TreatmentAdvisor, VoiceResponder};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

/// Always predicts the same disease, or always fails.
pub struct FixedClassifier(pub Option<(&'static str, f32)>);

#[async_trait]
impl PlantDiseaseClassifier for FixedClassifier {
    async fn classify(&self, image: &[u8]) -> PortResult<Classification> {
        if image.is_empty() {
            return Err(PortError::InvalidInput("empty image".into()));
        }
        self.0
            .map(|(label, confidence)| Classification {
                label: label.to_string(),
                confidence,
            })
            .ok_or_else(|| PortError::Upstream("model server down".into()))
    }
}

fn finish(router: Router) -> Router {
    web::with_common_layers(router, CorsLayer::permissive())
}

pub fn classifier_app(
    classifier: Arc<dyn PlantDiseaseClassifier>,
    llm: Arc<dyn TextGenerationService>,
    upload_dir: &Path,
) -> Router {
    finish(classify::router(Arc::new(state::ClassifierState {
        classifier,
        treatment: TreatmentAdvisor::new(llm),
        upload_dir: upload_dir.to_path_buf(),
    })))
}

pub fn crop_app(model: Option<Arc<dyn CropModel>>, llm: Arc<dyn TextGenerationService>) -> Router {
    finish(crop::router(Arc::new(state::CropState {
        advisor: CropAdvisor::new(model, llm),
    })))
}

pub fn chat_app(
    llm: Arc<dyn TextGenerationService>,
    translator: Arc<dyn TranslationService>,
    detections: Arc<dyn DetectionLog>,
) -> Router {
    finish(chat::router(Arc::new(state::ChatState {
        chat: FarmChat::new(llm, translator),
        detections,
    })))
}

pub fn voice_app(
    llm: Arc<dyn TextGenerationService>,
    translator: Arc<dyn TranslationService>,
    speech: Arc<dyn TextToSpeechService>,
    audio: Arc<dyn AudioStore>,
    log: Arc<dyn ConversationLog>,
    audio_dir: &Path,
) -> Router {
    finish(voice::router(Arc::new(state::VoiceState {
        responder: VoiceResponder::new(llm, translator, speech, audio, log),
        audio_dir: audio_dir.to_path_buf(),
    })))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    app.oneshot(
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Posts a single multipart part named `field`.
pub async fn post_file(
    app: Router,
    uri: &str,
    field: &str,
    filename: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "krushi-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    app.oneshot(
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
