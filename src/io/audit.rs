//! Integrity audit log
//!
//! Every settings update, generation, preview, export, revert and layout request opens
//! an operation with [`IntegrityLog::begin`] and must close it exactly once through
//! [`IntegrityLog::complete`] or [`IntegrityLog::fail`]. Both consume the
//! [`PendingOperation`] token, so a second close does not compile.
//!
//! Log lines use the fixed format
//! `[HH:MM:SS] OP_START <id> <operation>` / `[HH:MM:SS] OP_END <id> OK|FAIL <details>`,
//! plus `WARN` and `ERROR` lines that are mirrored to `tracing`.

use std::collections::VecDeque;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

/// Source of timestamps, injectable for tests
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Still running
    Pending,
    /// Finished successfully
    Success,
    /// Finished with an error
    Failure,
}

/// One audited operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    /// Correlation id, `{PREFIX}_{yyyyMMdd_HHmmss}_{millis}`
    pub operation_id: String,
    /// Operation name
    pub operation: String,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time, absent while pending
    pub finished_at: Option<DateTime<Utc>>,
    /// Result
    pub outcome: Outcome,
    /// Free-form detail string
    pub details: String,
}

/// Open operation that must be closed on the log that issued it
#[must_use = "an operation must be closed with `complete` or `fail`"]
#[derive(Debug)]
pub struct PendingOperation {
    record: OperationRecord,
}

impl PendingOperation {
    /// Correlation id of this operation
    pub fn id(&self) -> &str {
        &self.record.operation_id
    }

    /// Operation name
    pub fn operation(&self) -> &str {
        &self.record.operation
    }
}

/// Bounded in-memory operation log with optional file mirror
#[derive(Debug)]
pub struct IntegrityLog {
    clock: Arc<dyn Clock>,
    capacity: usize,
    records: VecDeque<OperationRecord>,
    lines: VecDeque<String>,
    file: Option<PathBuf>,
    last_base_id: String,
    sequence: u32,
}

impl IntegrityLog {
    /// Create a log keeping at most `capacity` completed records and lines
    pub fn new(clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            clock,
            capacity: capacity.max(1),
            records: VecDeque::new(),
            lines: VecDeque::new(),
            file: None,
            last_base_id: String::new(),
            sequence: 0,
        }
    }

    /// Also append every line to `path`
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Mirror file, if any
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Clock used for timestamps
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Issue an id of the form `{prefix}_{yyyyMMdd_HHmmss}_{millis:03}`
    ///
    /// Ids repeated within the same millisecond get a `_{n}` suffix.
    pub fn generate_operation_id(&mut self, prefix: &str) -> String {
        let now = self.clock.now();
        let base = format!(
            "{prefix}_{}_{:03}",
            now.format("%Y%m%d_%H%M%S"),
            now.timestamp_subsec_millis()
        );
        if base == self.last_base_id {
            self.sequence += 1;
            format!("{base}_{}", self.sequence)
        } else {
            self.last_base_id.clone_from(&base);
            self.sequence = 0;
            base
        }
    }

    /// Open an operation and write its `OP_START` line
    pub fn begin(&mut self, prefix: &str, operation: &str) -> PendingOperation {
        let operation_id = self.generate_operation_id(prefix);
        self.write_line(&format!("OP_START {operation_id} {operation}"));
        debug!(operation_id = %operation_id, operation, "Operation started");
        PendingOperation {
            record: OperationRecord {
                operation_id,
                operation: operation.to_string(),
                started_at: self.clock.now(),
                finished_at: None,
                outcome: Outcome::Pending,
                details: String::new(),
            },
        }
    }

    /// Close an operation as successful
    pub fn complete(&mut self, pending: PendingOperation, details: &str) {
        self.finish(pending, Outcome::Success, details);
    }

    /// Close an operation as failed
    pub fn fail(&mut self, pending: PendingOperation, details: &str) {
        self.finish(pending, Outcome::Failure, details);
    }

    fn finish(&mut self, pending: PendingOperation, outcome: Outcome, details: &str) {
        let mut record = pending.record;
        record.finished_at = Some(self.clock.now());
        record.outcome = outcome;
        record.details = details.to_string();

        let status = if outcome == Outcome::Success { "OK" } else { "FAIL" };
        self.write_line(&format!("OP_END {} {status} {details}", record.operation_id));
        if outcome == Outcome::Failure {
            error!(operation_id = %record.operation_id, operation = %record.operation, details, "Operation failed");
        }

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Record a warning and mirror it to `tracing`
    pub fn warn(&mut self, component: &str, message: &str) {
        warn!(component, "{message}");
        self.write_line(&format!("WARN {component} {message}"));
    }

    /// Record an error and mirror it to `tracing`
    pub fn error(&mut self, component: &str, message: &str) {
        error!(component, "{message}");
        self.write_line(&format!("ERROR {component} {message}"));
    }

    /// Record a tagged informational line such as `SETTINGS_LOAD` or `HASH_CHECK`
    pub fn note(&mut self, tag: &str, message: &str) {
        self.write_line(&format!("{tag} {message}"));
    }

    /// Completed records, oldest first
    pub fn records(&self) -> impl Iterator<Item = &OperationRecord> {
        self.records.iter()
    }

    /// Most recently completed record
    pub fn last_record(&self) -> Option<&OperationRecord> {
        self.records.back()
    }

    /// Retained log lines, oldest first
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    fn write_line(&mut self, body: &str) {
        let line = format!("[{}] {body}", self.clock.now().format("%H:%M:%S"));
        if let Some(path) = &self.file {
            let appended = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| writeln!(file, "{line}"));
            if let Err(source) = appended {
                warn!(path = %path.display(), %source, "Failed to append audit line");
            }
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}
