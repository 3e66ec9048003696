//! crates/krushi_core/src/text.rs
//!
//! Small text-shaping helpers applied to generative model output.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::CropResult;

pub const MISSING_EXPLANATION: &str = "No explanation available.";

/// Anything that is not a word character, whitespace, Devanagari or basic
/// sentence punctuation.
static UNSPEAKABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\x{0900}-\x{097F}.,!?]").expect("valid regex"));

/// Removes markdown emphasis markers.
pub fn strip_emphasis(text: &str) -> String {
    text.replace('*', "")
}

/// The first `count` period-delimited segments, re-joined and terminated with a period.
pub fn leading_sentences(text: &str, count: usize) -> String {
    let segments: Vec<&str> = text
        .split('.')
        .filter(|segment| !segment.trim().is_empty())
        .take(count)
        .collect();
    format!("{}.", segments.join(".").trim())
}

/// Strips characters the speech engine would read out literally or choke on.
pub fn clean_for_speech(text: &str) -> String {
    UNSPEAKABLE.replace_all(text, "").trim().to_string()
}

/// Splits a "crop on the first line, explanation below" reply.
pub fn split_crop_reply(reply: &str) -> CropResult {
    let reply = strip_emphasis(reply.trim());
    let (first, rest) = match reply.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (reply.as_str(), ""),
    };

    let explanation = rest.trim();
    CropResult {
        crop: first.trim().to_string(),
        explanation: if explanation.is_empty() {
            MISSING_EXPLANATION.to_string()
        } else {
            explanation.to_string()
        },
    }
}
