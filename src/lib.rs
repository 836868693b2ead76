//! `material-catalog` ingests construction-material catalogs, stored as multi-sheet spreadsheet
//! workbooks, into validated in-memory [`types::MaterialRecord`]s for downstream engineering
//! calculators.
//!
//! The primary entrypoint is [`ingestion::ingest_materials`], which ingests every material
//! workbook of a directory. Use [`ingestion::MaterialLoader`] for the per-run
//! [`ingestion::IngestionReport`], a custom [`ingestion::WorkbookReader`], diagnostics
//! observers, or cancellation.
//!
//! ## Catalog layout
//!
//! - A directory holds one workbook per discipline bundle. `BLE_MATERIALS.xlsx` and
//!   `MEP_MATERIALS.xlsx` are always ingested first when present; with auto-discovery any other
//!   `*material*.xlsx` file (case-insensitive) follows.
//! - Each worksheet is one category. Row 1 holds headers (`Code`, `Name`, `Category`,
//!   `Discipline`, `Description`, `Manufacturer`, `Standard`, `ThermalResistance`,
//!   `ThermalConductivity`, `Density`, `SpecificHeat`, `FireRating`, `Cost`, `CostUnit`,
//!   `Application`); data starts at row 2. Unknown columns are ignored and missing ones leave
//!   field defaults.
//! - When a row has no discipline, it is derived from the category with
//!   [`classify::classify`].
//!
//! ## Failure policy
//!
//! With [`ingestion::LoaderOptions::continue_on_error`] (the default) a row that cannot be parsed
//! or a workbook that cannot be opened is skipped with a diagnostic; otherwise the run fails with
//! that error. With [`ingestion::LoaderOptions::validate_on_load`] (the default) records missing a
//! code or name are dropped and counted.
//!
//! ## Example: in-memory workbooks
//!
//! ```rust
//! use material_catalog::ingestion::{
//!     LoaderOptions, MaterialLoader, MemorySheet, MemoryWorkbook, MemoryWorkbookReader,
//! };
//! use material_catalog::types::Discipline;
//!
//! # fn main() -> Result<(), material_catalog::CatalogError> {
//! let dir = std::env::temp_dir().join("material-catalog-lib-doc");
//! std::fs::create_dir_all(&dir)?;
//! std::fs::write(dir.join("BLE_MATERIALS.xlsx"), b"")?;
//!
//! let reader = MemoryWorkbookReader::new().with_workbook(
//!     "BLE_MATERIALS.xlsx",
//!     MemoryWorkbook::new().with_sheet(
//!         MemorySheet::new("Concrete", ["Code", "Name", "Density"])
//!             .with_row(["CONC-001", "C30 Concrete", "2400"])
//!             .with_row(["", "Unnamed mix", "2300"]),
//!     ),
//! );
//!
//! let load = MaterialLoader::with_reader(&dir, LoaderOptions::default(), reader)?.load_all()?;
//! assert_eq!(load.records.len(), 1);
//! assert_eq!(load.records[0].discipline, Discipline::Structural);
//! assert_eq!(load.report.records_rejected, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: discovery, workbook readers, row parsing, the loader and observers
//! - [`classify`]: category → discipline rules
//! - [`validation`]: record validation rules
//! - [`types`]: material records and worksheet cells
//! - [`error`]: error types used across ingestion

pub mod classify;
pub mod error;
pub mod ingestion;
pub mod types;
pub mod validation;

pub use error::{CatalogError, CatalogResult};
