//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_materials`] (from [`loader`]), which:
//!
//! - resolves the workbook files of a catalog directory ([`discovery`])
//! - opens each workbook and lists its worksheets through a [`WorkbookReader`] ([`workbook`])
//! - parses every row into a [`crate::types::MaterialRecord`] ([`row`])
//! - validates the aggregate ([`crate::validation`])
//! - optionally reports diagnostics to a [`CatalogObserver`]
//!
//! Workbook readers are available under:
//! - [`excel`] (feature `excel`)
//! - [`memory`]

pub mod discovery;
#[cfg(feature = "excel")]
pub mod excel;
pub mod loader;
pub mod memory;
pub mod observability;
pub mod row;
pub mod workbook;

pub use discovery::{resolve_workbook_sources, DISCOVERY_PATTERN, WELL_KNOWN_WORKBOOKS};
#[cfg(feature = "excel")]
pub use excel::ExcelWorkbookReader;
#[cfg(feature = "excel")]
pub use loader::ingest_materials;
pub use loader::{
    CancellationToken, CatalogLoad, IngestionReport, LoadHandle, LoaderOptions, MaterialLoader, SourceSummary,
    WorksheetSummary,
};
pub use memory::{MemorySheet, MemoryWorkbook, MemoryWorkbookReader};
pub use observability::{
    CatalogEvent, CatalogObserver, CompositeObserver, DiagnosticLevel, FileObserver, StdErrObserver,
};
pub use row::{parse_row, ColumnMapping, MaterialField};
pub use workbook::{decompose, DecomposedWorkbook, Workbook, WorkbookReader};
