//! Append-only JSON Lines record of CLI invocations (`--audit-log`).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Ok,
    Error { message: String },
}

/// One finished invocation: what ran, with which resolved parameters, and how it ended.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub command: String,
    /// Resolved parameters; `null` when the command failed before producing them.
    pub parameters: serde_json::Value,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

impl RunRecord {
    pub fn finished(
        command: &str,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        result: &Result<serde_json::Value>,
    ) -> Self {
        let (parameters, outcome) = match result {
            Ok(parameters) => (parameters.clone(), RunOutcome::Ok),
            Err(e) => (
                serde_json::Value::Null,
                RunOutcome::Error {
                    message: format!("{e:#}"),
                },
            ),
        };
        Self {
            started_at,
            command: command.to_string(),
            parameters,
            duration_ms: elapsed.as_millis() as u64,
            outcome,
        }
    }

    /// Append as a single line, creating the file and its directory if needed.
    pub fn append_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(&line))
            .with_context(|| format!("failed to append to run log: {}", path.display()))
    }

    /// Like [`RunRecord::append_to`], but a failure is only logged.
    /// Returns whether the record was written.
    pub fn append_or_warn(&self, path: &Path) -> bool {
        match self.append_to(path) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), "run record not written: {e:#}");
                false
            }
        }
    }
}
