use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::validation::Rejection;

use super::loader::{IngestionReport, WorksheetSummary};

/// Severity of a diagnostic event, also used as the alerting threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    /// Non-fatal problem: a skipped row, a rejected record, no sources found.
    Warning,
    /// A file was skipped or the run failed.
    Error,
}

/// Something that happened during an ingestion run.
#[derive(Debug, Clone, Copy)]
pub enum CatalogEvent<'a> {
    RunStarted { directory: &'a Path, sources: usize },
    NoSourcesFound { directory: &'a Path },
    WorksheetParsed { file: &'a Path, worksheet: &'a WorksheetSummary },
    RowSkipped { file: &'a Path, error: &'a CatalogError },
    FileLoaded { file: &'a Path, records: usize },
    FileSkipped { file: &'a Path, error: &'a CatalogError },
    RecordRejected { rejection: &'a Rejection },
    ValidationFinished { valid: usize, rejected: usize },
    Cancelled { files_remaining: usize },
    RunFinished { report: &'a IngestionReport },
    RunFailed { error: &'a CatalogError },
}

impl CatalogEvent<'_> {
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            CatalogEvent::WorksheetParsed { .. } | CatalogEvent::FileLoaded { .. } => DiagnosticLevel::Debug,
            CatalogEvent::RunStarted { .. } | CatalogEvent::RunFinished { .. } => DiagnosticLevel::Info,
            CatalogEvent::ValidationFinished { rejected: 0, .. } => DiagnosticLevel::Debug,
            CatalogEvent::NoSourcesFound { .. }
            | CatalogEvent::RowSkipped { .. }
            | CatalogEvent::RecordRejected { .. }
            | CatalogEvent::ValidationFinished { .. }
            | CatalogEvent::Cancelled { .. } => DiagnosticLevel::Warning,
            CatalogEvent::FileSkipped { .. } | CatalogEvent::RunFailed { .. } => DiagnosticLevel::Error,
        }
    }

    /// Stable event name, suitable as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogEvent::RunStarted { .. } => "run_started",
            CatalogEvent::NoSourcesFound { .. } => "no_sources_found",
            CatalogEvent::WorksheetParsed { .. } => "worksheet_parsed",
            CatalogEvent::RowSkipped { .. } => "row_skipped",
            CatalogEvent::FileLoaded { .. } => "file_loaded",
            CatalogEvent::FileSkipped { .. } => "file_skipped",
            CatalogEvent::RecordRejected { .. } => "record_rejected",
            CatalogEvent::ValidationFinished { .. } => "validation_finished",
            CatalogEvent::Cancelled { .. } => "cancelled",
            CatalogEvent::RunFinished { .. } => "run_finished",
            CatalogEvent::RunFailed { .. } => "run_failed",
        }
    }
}

impl fmt::Display for CatalogEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogEvent::RunStarted { directory, sources } => write!(
                f,
                "loading materials from {sources} workbook(s) in {}",
                directory.display()
            ),
            CatalogEvent::NoSourcesFound { directory } => {
                write!(f, "no material workbooks found in {}", directory.display())
            }
            CatalogEvent::WorksheetParsed { file, worksheet } => write!(
                f,
                "parsed worksheet '{}' of {}: rows={} skipped={} blank={}",
                worksheet.name,
                file_name(file),
                worksheet.rows_parsed,
                worksheet.rows_skipped,
                worksheet.blank_rows
            ),
            CatalogEvent::RowSkipped { file, error } => {
                write!(f, "skipped row in {}: {error}", file_name(file))
            }
            CatalogEvent::FileLoaded { file, records } => {
                write!(f, "loaded {records} materials from {}", file_name(file))
            }
            CatalogEvent::FileSkipped { file, error } => {
                write!(f, "failed to load {}: {error}", file_name(file))
            }
            CatalogEvent::RecordRejected { rejection } => write!(f, "invalid material skipped: {rejection}"),
            CatalogEvent::ValidationFinished { valid, rejected } => {
                write!(f, "validation kept {valid} materials, skipped {rejected} invalid")
            }
            CatalogEvent::Cancelled { files_remaining } => {
                write!(f, "load cancelled with {files_remaining} workbook(s) remaining")
            }
            CatalogEvent::RunFinished { report } => write!(f, "total materials loaded: {report}"),
            CatalogEvent::RunFailed { error } => write!(f, "failed to load materials: {error}"),
        }
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Diagnostics sink for ingestion runs.
///
/// Implementors can record metrics, logs, or trigger alerts. The loader never depends on an
/// observer for correctness; every event is also emitted through `tracing`.
pub trait CatalogObserver: Send + Sync {
    /// Called for every event.
    fn on_event(&self, _level: DiagnosticLevel, _event: &CatalogEvent<'_>) {}

    /// Called, after [`Self::on_event`], for events at or above the loader's alert threshold.
    fn on_alert(&self, _level: DiagnosticLevel, _event: &CatalogEvent<'_>) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn CatalogObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn CatalogObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl CatalogObserver for CompositeObserver {
    fn on_event(&self, level: DiagnosticLevel, event: &CatalogEvent<'_>) {
        for o in &self.observers {
            o.on_event(level, event);
        }
    }

    fn on_alert(&self, level: DiagnosticLevel, event: &CatalogEvent<'_>) {
        for o in &self.observers {
            o.on_alert(level, event);
        }
    }
}

/// Logs events at or above `min_level` to stderr.
#[derive(Debug)]
pub struct StdErrObserver {
    min_level: DiagnosticLevel,
}

impl StdErrObserver {
    pub fn new(min_level: DiagnosticLevel) -> Self {
        Self { min_level }
    }
}

impl Default for StdErrObserver {
    fn default() -> Self {
        Self::new(DiagnosticLevel::Info)
    }
}

impl CatalogObserver for StdErrObserver {
    fn on_event(&self, level: DiagnosticLevel, event: &CatalogEvent<'_>) {
        if level >= self.min_level {
            eprintln!("[catalog][{level:?}] {event}");
        }
    }

    fn on_alert(&self, level: DiagnosticLevel, event: &CatalogEvent<'_>) {
        eprintln!("[ALERT][catalog][{level:?}] {event}");
    }
}

/// Appends events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl CatalogObserver for FileObserver {
    fn on_event(&self, level: DiagnosticLevel, event: &CatalogEvent<'_>) {
        self.append_line(&format!(
            "{} {:?} {} {}",
            unix_ts(),
            level,
            event.kind(),
            event
        ));
    }

    fn on_alert(&self, level: DiagnosticLevel, event: &CatalogEvent<'_>) {
        self.append_line(&format!("{} ALERT {:?} {} {}", unix_ts(), level, event.kind(), event));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
