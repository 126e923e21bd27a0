use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of one background command. Records are append-only; whether the
/// process is still alive is checked on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Sequential per-user id; equals the number of earlier records.
    pub id: usize,
    /// OS pid, which is also the id of the process group it leads.
    pub pid: u32,
    pub command: String,
    pub cwd: PathBuf,
    pub log_file: PathBuf,
    pub started: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    Stopped,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
        })
    }
}

/// A record paired with its liveness at the time of listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessEntry {
    #[serde(flatten)]
    pub record: ProcessRecord,
    pub status: ProcessStatus,
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The group exited after SIGTERM, or after SIGKILL when `forced`.
    Stopped { forced: bool },
    /// Nothing was running under the recorded pid.
    AlreadyStopped,
}

/// Contents of a background log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTail {
    Missing,
    Empty,
    Content(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_uses_documented_field_names() {
        let record = ProcessRecord {
            id: 0,
            pid: 4242,
            command: "python3 bot.py".to_string(),
            cwd: PathBuf::from("/w/u1"),
            log_file: PathBuf::from("/w/u1/process_0.log"),
            started: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .expect("timestamp")
                .with_timezone(&Utc),
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "id": 0,
                "pid": 4242,
                "command": "python3 bot.py",
                "cwd": "/w/u1",
                "log_file": "/w/u1/process_0.log",
                "started": "2024-05-01T12:00:00Z",
            })
        );
    }
}
