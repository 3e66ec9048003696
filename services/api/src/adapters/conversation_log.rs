//! services/api/src/adapters/conversation_log.rs
//!
//! Append-only text log of voice questions and the answers given.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::SecondsFormat;
use krushi_core::domain::ConversationEntry;
use krushi_core::ports::{ConversationLog, PortError, PortResult};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct FileConversationLog {
    path: PathBuf,
    // Serializes appends so concurrent requests never interleave lines.
    write_lock: Mutex<()>,
}

impl FileConversationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

/// `[timestamp] [lang] Q: question | A: answer`, one entry per line.
fn format_entry(entry: &ConversationEntry) -> String {
    let flatten = |s: &str| s.replace(['\r', '\n'], " ");
    format!(
        "[{}] [{}] Q: {} | A: {}\n",
        entry.asked_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        entry.language,
        flatten(&entry.question),
        flatten(&entry.answer)
    )
}

#[async_trait]
impl ConversationLog for FileConversationLog {
    async fn append(&self, entry: &ConversationEntry) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(format!("Cannot create log directory: {e}")))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot open conversation log: {e}")))?;
        file.write_all(format_entry(entry).as_bytes())
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot write conversation log: {e}")))?;
        // tokio completes file writes on a blocking thread; wait for it.
        file.flush()
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot write conversation log: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(question: &str) -> ConversationEntry {
        ConversationEntry {
            asked_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
            language: "hi".to_string(),
            question: question.to_string(),
            answer: "नीम का तेल छिड़कें।\nहर सप्ताह।".to_string(),
        }
    }

    #[test]
    fn entries_are_single_lines() {
        assert_eq!(
            format_entry(&entry("aphids on cotton?")),
            "[2024-06-01T08:30:00Z] [hi] Q: aphids on cotton? | A: नीम का तेल छिड़कें। हर सप्ताह।\n"
        );
    }

    #[tokio::test]
    async fn appends_create_the_file_and_keep_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("conversations.txt");
        let log = FileConversationLog::new(&path);

        log.append(&entry("first")).await.unwrap();
        log.append(&entry("second")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Q: first"));
        assert!(lines[1].contains("Q: second"));
    }
}
