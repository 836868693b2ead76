use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error type returned by catalog ingestion.
///
/// Each variant carries enough context (file, worksheet, row) to attribute the failure without
/// consulting diagnostics. Validation rejections are not errors; see
/// [`crate::validation::ValidationOutcome`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Invalid directory, arguments or loader options. Always fatal.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A workbook could not be opened, decomposed into worksheets, or read.
    #[error("source unavailable: {path}: {message}")]
    SourceUnavailable { path: PathBuf, message: String },

    /// A cell could not be coerced into the type of the material field it maps to.
    ///
    /// `row` is 1-based and counts the header row, so the first data row is row 2.
    #[error(
        "failed to parse row {row} of worksheet '{worksheet}' in '{file}', column '{column}': {message} (raw='{raw}')"
    )]
    RowParse {
        file: String,
        worksheet: String,
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Underlying I/O error while enumerating the source directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A background load ended without producing a result (its worker panicked).
    #[error("background load did not complete")]
    BackgroundLoadLost,
}

impl CatalogError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure is scoped to one row or one file, i.e. may be tolerated when
    /// `continue_on_error` is set.
    pub fn is_tolerable(&self) -> bool {
        matches!(
            self,
            CatalogError::SourceUnavailable { .. } | CatalogError::RowParse { .. }
        )
    }
}
