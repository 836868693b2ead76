//! Ingestion orchestrator.
//!
//! Most callers should use [`ingest_materials`], or build a [`MaterialLoader`] when they need the
//! [`IngestionReport`], a custom [`WorkbookReader`], an observer, or cancellation.
//!
//! A run resolves the workbook files of a directory, then for each file in discovery order opens
//! it, lists its worksheets and parses every row of every worksheet. Row and file failures are
//! skipped with a diagnostic when [`LoaderOptions::continue_on_error`] is set and abort the run
//! otherwise. With [`LoaderOptions::validate_on_load`] the aggregate is then narrowed by the
//! [`CatalogValidator`]. Records are ordered by file, then worksheet, then row.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::types::MaterialRecord;
use crate::validation::CatalogValidator;

use super::discovery::{check_source_directory, resolve_workbook_sources};
use super::observability::{file_name, CatalogEvent, CatalogObserver, DiagnosticLevel};
use super::row::{is_blank_row, parse_row, ColumnMapping};
use super::workbook::{decompose, DecomposedWorkbook, WorkbookReader};

/// Loader configuration.
///
/// Fixed for the lifetime of a [`MaterialLoader`]. Every flag defaults to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Skip failing rows and files (with a diagnostic) instead of aborting the run.
    pub continue_on_error: bool,
    /// Drop records that fail validation after all files are loaded.
    pub validate_on_load: bool,
    /// Also ingest `*material*.xlsx` files beyond the well-known bundles.
    pub auto_discover_files: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            validate_on_load: true,
            auto_discover_files: true,
        }
    }
}

impl LoaderOptions {
    /// Parse options from JSON; missing keys take their defaults.
    ///
    /// ```rust
    /// use material_catalog::ingestion::LoaderOptions;
    ///
    /// let opts = LoaderOptions::from_json(r#"{ "continue_on_error": false }"#).unwrap();
    /// assert!(!opts.continue_on_error);
    /// assert!(opts.validate_on_load);
    /// ```
    pub fn from_json(input: &str) -> CatalogResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| CatalogError::configuration(format!("invalid loader options: {e}")))
    }
}

/// Per-worksheet row accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorksheetSummary {
    pub name: String,
    pub rows_parsed: usize,
    pub rows_skipped: usize,
    /// Rows with no data at all; ignored without a diagnostic.
    pub blank_rows: usize,
}

/// Per-file accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub path: PathBuf,
    /// Records parsed from this file, before validation.
    pub records: usize,
    pub worksheets: Vec<WorksheetSummary>,
    /// Why the file was skipped, if it was.
    pub error: Option<String>,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub files_attempted: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub rows_parsed: usize,
    pub rows_skipped: usize,
    pub records_rejected: usize,
    pub records_returned: usize,
    pub sources: Vec<SourceSummary>,
    /// The run stopped early because its [`CancellationToken`] was cancelled.
    pub cancelled: bool,
    /// Files never attempted because of cancellation.
    pub files_remaining: usize,
}

impl fmt::Display for IngestionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "records={} files={}/{} skipped_files={} rows={} skipped_rows={} rejected={}",
            self.records_returned,
            self.files_loaded,
            self.files_attempted,
            self.files_skipped,
            self.rows_parsed,
            self.rows_skipped,
            self.records_rejected
        )?;
        if self.cancelled {
            write!(f, " cancelled remaining={}", self.files_remaining)?;
        }
        Ok(())
    }
}

/// Records and report of a successful (possibly cancelled) run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogLoad {
    pub records: Vec<MaterialRecord>,
    pub report: IngestionReport,
}

/// Cooperative cancellation flag, checked before each file.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records and worksheet accounting for one file.
#[derive(Debug)]
struct FileLoad {
    records: Vec<MaterialRecord>,
    worksheets: Vec<WorksheetSummary>,
}

/// Loads material records from the workbooks of one catalog directory.
#[derive(Clone)]
pub struct MaterialLoader {
    data_directory: PathBuf,
    options: LoaderOptions,
    reader: Arc<dyn WorkbookReader>,
    validator: Arc<CatalogValidator>,
    observer: Option<Arc<dyn CatalogObserver>>,
    alert_at_or_above: DiagnosticLevel,
    cancellation: CancellationToken,
}

impl fmt::Debug for MaterialLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterialLoader")
            .field("data_directory", &self.data_directory)
            .field("options", &self.options)
            .field("validator", &self.validator)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl MaterialLoader {
    /// Create a loader reading real workbooks with [`super::excel::ExcelWorkbookReader`].
    ///
    /// Errors with [`CatalogError::Configuration`] when `data_directory` is blank or missing.
    #[cfg(feature = "excel")]
    pub fn new(data_directory: impl AsRef<Path>, options: LoaderOptions) -> CatalogResult<Self> {
        Self::with_reader(data_directory, options, super::excel::ExcelWorkbookReader::new())
    }

    /// Create a loader reading workbooks through `reader`.
    pub fn with_reader(
        data_directory: impl AsRef<Path>,
        options: LoaderOptions,
        reader: impl WorkbookReader + 'static,
    ) -> CatalogResult<Self> {
        let data_directory = data_directory.as_ref();
        check_source_directory(data_directory)?;
        Ok(Self {
            data_directory: data_directory.to_path_buf(),
            options,
            reader: Arc::new(reader),
            validator: Arc::new(CatalogValidator::default()),
            observer: None,
            alert_at_or_above: DiagnosticLevel::Error,
            cancellation: CancellationToken::new(),
        })
    }

    /// Attach an observer for diagnostics.
    pub fn with_observer(mut self, observer: Arc<dyn CatalogObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Level at which the observer's `on_alert` is invoked (default [`DiagnosticLevel::Error`]).
    pub fn with_alert_threshold(mut self, level: DiagnosticLevel) -> Self {
        self.alert_at_or_above = level;
        self
    }

    /// Replace the default validator.
    pub fn with_validator(mut self, validator: CatalogValidator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Use `token` to cancel runs of this loader.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// The workbook files a run would ingest right now, in ingestion order.
    pub fn resolve_sources(&self) -> CatalogResult<Vec<PathBuf>> {
        resolve_workbook_sources(&self.data_directory, self.options.auto_discover_files)
    }

    /// Run the full pipeline over every resolved file.
    ///
    /// Rows whose cells are all blank are ignored before parsing. They are not parsed, skipped
    /// or rejected; each worksheet counts them in [`WorksheetSummary::blank_rows`].
    pub fn load_all(&self) -> CatalogResult<CatalogLoad> {
        let sources = self.resolve_sources()?;
        if sources.is_empty() {
            self.emit(CatalogEvent::NoSourcesFound {
                directory: &self.data_directory,
            });
        }
        self.emit(CatalogEvent::RunStarted {
            directory: &self.data_directory,
            sources: sources.len(),
        });

        let mut report = IngestionReport::default();
        let mut records = Vec::new();

        for (idx, path) in sources.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                report.cancelled = true;
                report.files_remaining = sources.len() - idx;
                self.emit(CatalogEvent::Cancelled {
                    files_remaining: report.files_remaining,
                });
                break;
            }

            report.files_attempted += 1;
            match self.load_source(path) {
                Ok(loaded) => {
                    self.emit(CatalogEvent::FileLoaded {
                        file: path,
                        records: loaded.records.len(),
                    });
                    report.files_loaded += 1;
                    report.rows_parsed += loaded.worksheets.iter().map(|w| w.rows_parsed).sum::<usize>();
                    report.rows_skipped += loaded.worksheets.iter().map(|w| w.rows_skipped).sum::<usize>();
                    report.sources.push(SourceSummary {
                        path: path.clone(),
                        records: loaded.records.len(),
                        worksheets: loaded.worksheets,
                        error: None,
                    });
                    records.extend(loaded.records);
                }
                Err(err) if self.options.continue_on_error && err.is_tolerable() => {
                    self.emit(CatalogEvent::FileSkipped { file: path, error: &err });
                    report.files_skipped += 1;
                    report.sources.push(SourceSummary {
                        path: path.clone(),
                        error: Some(err.to_string()),
                        ..Default::default()
                    });
                }
                Err(err) => {
                    self.emit(CatalogEvent::RunFailed { error: &err });
                    return Err(err);
                }
            }
        }

        if self.options.validate_on_load {
            let (valid, rejected) = self.validate(records);
            records = valid;
            report.records_rejected = rejected;
        }
        report.records_returned = records.len();

        self.emit(CatalogEvent::RunFinished { report: &report });
        Ok(CatalogLoad { records, report })
    }

    /// Load a single workbook, validating its records when `validate_on_load` is set.
    ///
    /// Row failures follow `continue_on_error`; a file-level failure is always returned.
    pub fn load_file(&self, path: impl AsRef<Path>) -> CatalogResult<Vec<MaterialRecord>> {
        let path = path.as_ref();
        let loaded = self.load_source(path)?;
        self.emit(CatalogEvent::FileLoaded {
            file: path,
            records: loaded.records.len(),
        });

        if self.options.validate_on_load {
            Ok(self.validate(loaded.records).0)
        } else {
            Ok(loaded.records)
        }
    }

    /// Run [`Self::load_all`] on the rayon pool.
    pub fn spawn_load(&self) -> LoadHandle {
        let loader = self.clone();
        let (tx, rx) = mpsc::channel();
        rayon::spawn(move || {
            let _ = tx.send(loader.load_all());
        });
        LoadHandle { rx }
    }

    fn load_source(&self, path: &Path) -> CatalogResult<FileLoad> {
        let file = file_name(path);
        let DecomposedWorkbook {
            mut workbook,
            worksheets,
        } = decompose(self.reader.as_ref(), path)?;

        let mut records = Vec::new();
        let mut summaries = Vec::with_capacity(worksheets.len());

        for sheet in &worksheets {
            let mapping = ColumnMapping::resolve(file.as_str(), sheet);
            if !mapping.ignored_columns().is_empty() {
                tracing::debug!(
                    file = %file,
                    worksheet = %sheet.name,
                    ignored = ?mapping.ignored_columns(),
                    "ignoring unrecognized columns"
                );
            }

            let rows = workbook.read_rows(sheet)?;
            let parsed: Vec<Option<CatalogResult<MaterialRecord>>> = rows
                .par_iter()
                .enumerate()
                .map(|(idx, cells)| (!is_blank_row(cells)).then(|| parse_row(&mapping, idx, cells)))
                .collect();

            let mut summary = WorksheetSummary {
                name: sheet.name.clone(),
                ..Default::default()
            };
            for outcome in parsed {
                match outcome {
                    None => summary.blank_rows += 1,
                    Some(Ok(record)) => {
                        summary.rows_parsed += 1;
                        records.push(record);
                    }
                    Some(Err(err)) if self.options.continue_on_error => {
                        summary.rows_skipped += 1;
                        self.emit(CatalogEvent::RowSkipped { file: path, error: &err });
                    }
                    Some(Err(err)) => return Err(err),
                }
            }

            self.emit(CatalogEvent::WorksheetParsed {
                file: path,
                worksheet: &summary,
            });
            summaries.push(summary);
        }

        Ok(FileLoad {
            records,
            worksheets: summaries,
        })
    }

    fn validate(&self, records: Vec<MaterialRecord>) -> (Vec<MaterialRecord>, usize) {
        let outcome = self.validator.validate(records);
        for rejection in &outcome.rejected {
            self.emit(CatalogEvent::RecordRejected { rejection });
        }
        let rejected = outcome.rejected_count();
        self.emit(CatalogEvent::ValidationFinished {
            valid: outcome.valid.len(),
            rejected,
        });
        (outcome.valid, rejected)
    }

    fn emit(&self, event: CatalogEvent<'_>) {
        let level = event.level();
        match level {
            DiagnosticLevel::Debug => tracing::debug!(event = event.kind(), "{event}"),
            DiagnosticLevel::Info => tracing::info!(event = event.kind(), "{event}"),
            DiagnosticLevel::Warning => tracing::warn!(event = event.kind(), "{event}"),
            DiagnosticLevel::Error => tracing::error!(event = event.kind(), "{event}"),
        }

        if let Some(obs) = &self.observer {
            obs.on_event(level, &event);
            if level >= self.alert_at_or_above {
                obs.on_alert(level, &event);
            }
        }
    }
}

/// Pending result of [`MaterialLoader::spawn_load`].
#[derive(Debug)]
pub struct LoadHandle {
    rx: mpsc::Receiver<CatalogResult<CatalogLoad>>,
}

impl LoadHandle {
    /// Block until the background run finishes.
    pub fn wait(self) -> CatalogResult<CatalogLoad> {
        self.rx.recv().unwrap_or(Err(CatalogError::BackgroundLoadLost))
    }
}

/// Ingest every material workbook in `directory` with the Excel reader.
///
/// ```no_run
/// use material_catalog::ingestion::{ingest_materials, LoaderOptions};
///
/// # fn main() -> Result<(), material_catalog::CatalogError> {
/// let materials = ingest_materials("data/materials", &LoaderOptions::default())?;
/// println!("materials={}", materials.len());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "excel")]
pub fn ingest_materials(
    directory: impl AsRef<Path>,
    options: &LoaderOptions,
) -> CatalogResult<Vec<MaterialRecord>> {
    Ok(MaterialLoader::new(directory, *options)?.load_all()?.records)
}
