use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::expand_home;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Event log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the event log (`~/.joinctx/events.jsonl` by default).
///
/// One entry per CLI run that joined text. Read back by the reporter for
/// `joinctx stats` and by `joinctx health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinLogEntry {
    pub timestamp: String,
    /// CLI command: `"join"` or `"copy"`.
    pub command: String,
    /// Rule set name used for the run.
    pub language: String,
    /// Lines in the input document.
    pub input_lines: usize,
    /// Selections joined. Whole-input joins count as one.
    #[serde(default)]
    pub selections_applied: usize,
    /// Selections skipped by the last-line or overlap policy.
    #[serde(default)]
    pub selections_skipped: usize,
    /// Bytes of joined output.
    pub output_bytes: usize,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

impl JoinLogEntry {
    /// Start an entry stamped with the current time.
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            command: command.to_string(),
            language: language.to_string(),
            input_lines: 0,
            selections_applied: 0,
            selections_skipped: 0,
            output_bytes: 0,
            success: true,
            error: None,
        }
    }

    /// Mark the entry as failed.
    pub fn failed(mut self, error: &anyhow::Error) -> Self {
        self.success = false;
        self.error = Some(format!("{error:#}"));
        self
    }
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Append an entry when logging is enabled.
///
/// Best-effort: failures never reach the caller.
pub fn record(config: &LoggingConfig, entry: &JoinLogEntry) {
    if !config.enabled {
        return;
    }
    let Some(path) = log_path(config) else {
        return;
    };
    let _ = append_log_entry(&path, entry);
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from the configured log.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(config: &LoggingConfig) -> Vec<JoinLogEntry> {
    log_path(config)
        .map(|path| read_entries_from(&path))
        .unwrap_or_default()
}

/// Read entries from an explicit log file.
pub fn read_entries_from(path: &Path) -> Vec<JoinLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<JoinLogEntry>(&line).ok())
        .collect()
}

/// Read entries from the last `days` days. `None` returns everything.
pub fn read_entries_since_days(config: &LoggingConfig, days: Option<u32>) -> Vec<JoinLogEntry> {
    let entries = read_all_entries(config);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Append one JSON line to `path`, creating parent directories.
pub fn append_log_entry(path: &Path, entry: &JoinLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Resolved path of the event log.
pub fn log_path(config: &LoggingConfig) -> Option<PathBuf> {
    expand_home(&config.path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
