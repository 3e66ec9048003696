//! services/api/src/adapters/detection_log.rs
//!
//! CSV-backed detection log written by the animal watcher and read by the
//! chat service's `/api/detected-animals` endpoint.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use krushi_core::domain::DetectionRecord;
use krushi_core::ports::{DetectionLog, PortError, PortResult};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

pub const HEADER: &str = "Frame,Animal Detected,Detected At";

pub struct CsvDetectionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvDetectionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_row(record: &DetectionRecord) -> String {
    format!(
        "{},{},{}\n",
        quote(&record.frame),
        quote(&record.animal),
        record.detected_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Splits the file into records. A newline inside a quoted field does not end
/// the record.
fn split_records(contents: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in contents.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\n' if !in_quotes => {
                records.push(contents[start..i].trim_end_matches('\r'));
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < contents.len() {
        records.push(contents[start..].trim_end_matches('\r'));
    }
    records
}

/// Splits one CSV record, honouring double-quoted fields and `""` escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            (c, _) => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_row(line: &str) -> Option<DetectionRecord> {
    let fields = split_row(line);
    let [frame, animal, detected_at] = fields.as_slice() else {
        return None;
    };
    let detected_at = DateTime::parse_from_rfc3339(detected_at.trim())
        .ok()?
        .with_timezone(&Utc);
    Some(DetectionRecord {
        frame: frame.clone(),
        animal: animal.clone(),
        detected_at,
    })
}

#[async_trait]
impl DetectionLog for CsvDetectionLog {
    async fn append(&self, record: &DetectionRecord) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        let is_new = !tokio::fs::try_exists(&self.path).await.unwrap_or(false);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot open detection log: {e}")))?;

        let mut text = String::new();
        if is_new {
            text.push_str(HEADER);
            text.push('\n');
        }
        text.push_str(&format_row(record));
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot write detection log: {e}")))?;
        file.flush()
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot write detection log: {e}")))
    }

    /// A log that does not exist yet simply has no records.
    async fn list(&self) -> PortResult<Vec<DetectionRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PortError::Unexpected(format!("Cannot read detection log: {e}")))
            }
        };

        Ok(split_records(&contents)
            .into_iter()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let parsed = parse_row(line);
                if parsed.is_none() {
                    warn!(line, "Skipping malformed detection log row");
                }
                parsed
            })
            .collect())
    }
}
