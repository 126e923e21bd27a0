//! Plain-text rendering of engine results.

use std::fmt::Write as _;

use shellgate_core::{LogTail, ProcessEntry, ProcessRecord, StopOutcome};

pub fn record_line(record: &ProcessRecord) -> String {
    format!(
        "started background process {} (pid {}) at {}: {}\nlog: {}",
        record.id,
        record.pid,
        record.started.format("%Y-%m-%d %H:%M:%S UTC"),
        record.command,
        record.log_file.display()
    )
}

pub fn process_table(entries: &[ProcessEntry]) -> String {
    if entries.is_empty() {
        return "no background processes".to_string();
    }

    let mut table = String::new();
    for entry in entries {
        let record = &entry.record;
        let _ = writeln!(
            table,
            "[{}] {:<7} pid {:<7} {}  {}",
            record.id,
            entry.status.to_string(),
            record.pid,
            record.started.format("%Y-%m-%d %H:%M:%S"),
            record.command
        );
    }
    table.truncate(table.trim_end().len());
    table
}

pub fn stop_line(id: usize, outcome: StopOutcome) -> String {
    match outcome {
        StopOutcome::Stopped { forced: false } => format!("process {id} stopped"),
        StopOutcome::Stopped { forced: true } => {
            format!("process {id} killed after ignoring the stop signal")
        }
        StopOutcome::AlreadyStopped => format!("process {id} was already stopped"),
    }
}

pub fn log_text(id: usize, tail: LogTail) -> String {
    match tail {
        LogTail::Missing => format!("log file for process {id} not found"),
        LogTail::Empty => format!("log for process {id} is empty"),
        LogTail::Content(text) => text,
    }
}
