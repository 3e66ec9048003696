//! crates/krushi_core/src/watch.rs
//!
//! Per-frame animal intrusion detection for the offline video watcher.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::DetectionRecord;
use crate::ports::{AlertService, DetectionLog, FrameInspector, PortError, PortResult};
use crate::prompts::ANIMAL_CHECK_INSTRUCTION;

/// Bounded exponential backoff for rate-limited vision calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A different animal than the previous detection; logged and alerted.
    NewAnimal(String),
    /// The same animal as the previous detection.
    Duplicate(String),
    NoAnimal,
}

impl FrameOutcome {
    /// Whether the frame image is worth keeping on disk.
    pub fn keeps_frame(&self) -> bool {
        matches!(self, FrameOutcome::NewAnimal(_))
    }
}

/// Interprets the vision model's reply. Replies that contain the words
/// "no", "not" or "none" mean nothing was seen; otherwise the first
/// non-empty line names the animal.
pub fn parse_animal_reply(reply: &str) -> Option<String> {
    let denies = reply
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| matches!(word.to_lowercase().as_str(), "no" | "not" | "none"));
    if denies {
        return None;
    }

    let first_line = reply.lines().find(|line| !line.trim().is_empty())?;
    let animal = first_line.trim().trim_end_matches('.').trim();
    if animal.is_empty() {
        None
    } else {
        Some(animal.to_string())
    }
}

pub fn sms_body(animal: &str) -> String {
    format!("⚠ Animal Detected: {animal}")
}

pub fn call_twiml(animal: &str) -> String {
    let animal = animal
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<Response><Say voice=\"alice\">Alert! {animal} has been detected in the video feed. Please take action.</Say></Response>"
    )
}

pub struct AnimalWatcher {
    inspector: Arc<dyn FrameInspector>,
    alerts: Arc<dyn AlertService>,
    log: Arc<dyn DetectionLog>,
    retry: RetryPolicy,
    last_animal: Option<String>,
}

impl AnimalWatcher {
    pub fn new(
        inspector: Arc<dyn FrameInspector>,
        alerts: Arc<dyn AlertService>,
        log: Arc<dyn DetectionLog>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            inspector,
            alerts,
            log,
            retry,
            last_animal: None,
        }
    }

    /// Inspects one frame and, for a newly seen animal, records it and alerts
    /// the farm owner. Never fails: errors count as "no animal".
    pub async fn process_frame(&mut self, frame: &str, jpeg: &[u8]) -> FrameOutcome {
        info!(frame, "Analyzing frame");
        let reply = match self.inspect_with_retry(jpeg).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(frame, error = %e, "Frame inspection failed");
                return FrameOutcome::NoAnimal;
            }
        };

        let Some(animal) = parse_animal_reply(&reply) else {
            info!(frame, "No animal detected");
            return FrameOutcome::NoAnimal;
        };

        let repeated = self
            .last_animal
            .as_deref()
            .is_some_and(|last| last.eq_ignore_ascii_case(&animal));
        if repeated {
            info!(frame, animal = %animal, "Animal already reported, skipping");
            return FrameOutcome::Duplicate(animal);
        }

        info!(frame, animal = %animal, "New animal detected");
        self.last_animal = Some(animal.clone());

        let record = DetectionRecord {
            frame: frame.to_string(),
            animal: animal.clone(),
            detected_at: Utc::now(),
        };
        if let Err(e) = self.log.append(&record).await {
            warn!(error = %e, "Failed to write detection log");
        }
        self.raise_alerts(&animal).await;

        FrameOutcome::NewAnimal(animal)
    }

    async fn raise_alerts(&self, animal: &str) {
        match self.alerts.send_sms(&sms_body(animal)).await {
            Ok(sid) => info!(sid = %sid, "SMS alert sent"),
            Err(e) => warn!(error = %e, "SMS alert failed"),
        }
        match self.alerts.place_call(&call_twiml(animal)).await {
            Ok(sid) => info!(sid = %sid, "Voice call placed"),
            Err(e) => warn!(error = %e, "Voice call alert failed"),
        }
    }

    async fn inspect_with_retry(&self, jpeg: &[u8]) -> PortResult<String> {
        let mut attempt = 1;
        loop {
            match self.inspector.inspect(jpeg, ANIMAL_CHECK_INSTRUCTION).await {
                Err(PortError::RateLimited(msg)) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(attempt, ?delay, reason = %msg, "Vision API rate limited, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{MemoryDetectionLog, RecordingAlerts, ScriptedLlm};

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn denial_words_mean_no_animal() {
        assert_eq!(parse_animal_reply("No"), None);
        assert_eq!(parse_animal_reply("There is not an animal."), None);
        assert_eq!(parse_animal_reply("None"), None);
        assert_eq!(parse_animal_reply("   "), None);
        assert_eq!(parse_animal_reply("Rhinoceros."), Some("Rhinoceros".to_string()));
        assert_eq!(parse_animal_reply("Wild boar\n"), Some("Wild boar".to_string()));
        assert_eq!(
            parse_animal_reply("\nCow\nIt is grazing near the fence."),
            Some("Cow".to_string())
        );
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[test]
    fn twiml_escapes_markup() {
        assert!(call_twiml("cat<dog>").contains("cat&lt;dog&gt; has been detected"));
    }

    #[tokio::test]
    async fn new_animal_is_logged_and_alerted_once() {
        let inspector = Arc::new(ScriptedLlm::new(vec![
            Ok("Cow".to_string()),
            Ok("cow".to_string()),
            Ok("No".to_string()),
            Ok("Elephant".to_string()),
        ]));
        let alerts = Arc::new(RecordingAlerts::default());
        let log = Arc::new(MemoryDetectionLog::default());
        let mut watcher = AnimalWatcher::new(inspector, alerts.clone(), log.clone(), fast_retry(3));

        assert_eq!(watcher.process_frame("frame_0.jpg", b"jpeg").await, FrameOutcome::NewAnimal("Cow".into()));
        assert_eq!(watcher.process_frame("frame_1.jpg", b"jpeg").await, FrameOutcome::Duplicate("cow".into()));
        assert_eq!(watcher.process_frame("frame_2.jpg", b"jpeg").await, FrameOutcome::NoAnimal);
        assert_eq!(
            watcher.process_frame("frame_3.jpg", b"jpeg").await,
            FrameOutcome::NewAnimal("Elephant".into())
        );

        let records = log.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].frame, "frame_0.jpg");
        assert_eq!(records[1].animal, "Elephant");
        assert_eq!(
            *alerts.sms.lock().unwrap(),
            vec![
                "⚠ Animal Detected: Cow".to_string(),
                "⚠ Animal Detected: Elephant".to_string()
            ]
        );
        assert_eq!(alerts.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rate_limits_are_retried_until_success() {
        let inspector = Arc::new(ScriptedLlm::new(vec![
            Err(PortError::RateLimited("429".into())),
            Err(PortError::RateLimited("429".into())),
            Ok("Deer".to_string()),
        ]));
        let mut watcher = AnimalWatcher::new(
            inspector.clone(),
            Arc::new(RecordingAlerts::default()),
            Arc::new(MemoryDetectionLog::default()),
            fast_retry(5),
        );

        let outcome = watcher.process_frame("frame_0.jpg", b"jpeg").await;

        assert_eq!(outcome, FrameOutcome::NewAnimal("Deer".into()));
        assert_eq!(inspector.calls(), 3);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let inspector = Arc::new(ScriptedLlm::new(vec![Err(PortError::RateLimited("429".into()))]));
        let alerts = Arc::new(RecordingAlerts::default());
        let mut watcher = AnimalWatcher::new(
            inspector.clone(),
            alerts.clone(),
            Arc::new(MemoryDetectionLog::default()),
            fast_retry(3),
        );

        let outcome = watcher.process_frame("frame_0.jpg", b"jpeg").await;

        assert_eq!(outcome, FrameOutcome::NoAnimal);
        assert_eq!(inspector.calls(), 3);
        assert!(alerts.sms.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let inspector = Arc::new(ScriptedLlm::new(vec![Err(PortError::Upstream("bad image".into()))]));
        let mut watcher = AnimalWatcher::new(
            inspector.clone(),
            Arc::new(RecordingAlerts::default()),
            Arc::new(MemoryDetectionLog::default()),
            fast_retry(5),
        );

        assert_eq!(watcher.process_frame("frame_0.jpg", b"jpeg").await, FrameOutcome::NoAnimal);
        assert_eq!(inspector.calls(), 1);
    }
}
