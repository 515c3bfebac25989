//! JSONL file writer for round events.
//!
//! Each [`RoundEvent`] is serialized as a single JSON line with a `type`
//! field and `timestamp`, appended to the file via a buffered writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tally_application::{RoundEvent, RoundLogger};
use tracing::warn;

/// JSONL round logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlRoundLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlRoundLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create round log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create round log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Create a logger under `log_dir` named after the operation and the
    /// current time: `<operation>-<YYYYmmdd-HHMMSS>.round.jsonl`.
    pub fn for_round(log_dir: impl AsRef<Path>, operation: &str) -> Option<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let file_name = format!("{}-{}.round.jsonl", sanitize(operation), stamp);
        Self::new(log_dir.as_ref().join(file_name))
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Keep operation names usable as file names
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl RoundLogger for JsonlRoundLogger {
    fn log(&self, event: RoundEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = if let serde_json::Value::Object(mut map) = event.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event.event_type.to_string()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": event.payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Flush every line, a killed round should still leave its votes
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlRoundLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.round.jsonl");
        let logger = JsonlRoundLogger::new(&path).unwrap();

        logger.log(RoundEvent::new(
            "round_start",
            json!({"operation": "deploy_gate", "num_workers": 5}),
        ));
        logger.log(RoundEvent::new(
            "vote",
            json!({"worker_index": 0, "category": "approve"}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.get("timestamp").is_some()));
        assert_eq!(records[0]["type"], "round_start");
        assert_eq!(records[0]["operation"], "deploy_gate");
        assert_eq!(records[1]["type"], "vote");
        assert_eq!(records[1]["category"], "approve");
    }

    #[test]
    fn test_non_object_payload_goes_under_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.round.jsonl");
        let logger = JsonlRoundLogger::new(&path).unwrap();

        logger.log(RoundEvent::new("note", json!("just a string")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "note");
        assert_eq!(records[0]["data"], "just a string");
    }

    #[test]
    fn test_for_round_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs").join("rounds");
        let logger = JsonlRoundLogger::for_round(&log_dir, "db/migrate").unwrap();

        let file_name = logger.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("db_migrate-"));
        assert!(file_name.ends_with(".round.jsonl"));
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_unwritable_path_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        // A regular file cannot act as a parent directory
        assert!(JsonlRoundLogger::new(blocker.join("round.jsonl")).is_none());
    }
}
