//! In-memory [`WorkbookReader`].
//!
//! Workbooks are registered by file name (matched case-insensitively against the file name of
//! the path being opened), which lets the whole pipeline run against fixed worksheets without
//! any spreadsheet files. Opening a path whose file name is not registered fails like a missing
//! file would.
//!
//! ```rust
//! use std::path::Path;
//!
//! use material_catalog::ingestion::memory::{MemorySheet, MemoryWorkbook, MemoryWorkbookReader};
//! use material_catalog::ingestion::workbook::decompose;
//!
//! let reader = MemoryWorkbookReader::new().with_workbook(
//!     "BLE_MATERIALS.xlsx",
//!     MemoryWorkbook::new().with_sheet(
//!         MemorySheet::new("Concrete", ["Code", "Name"]).with_row(["CONC-001", "C30 Concrete"]),
//!     ),
//! );
//! let out = decompose(&reader, Path::new("data/BLE_MATERIALS.xlsx")).unwrap();
//! assert_eq!(out.worksheets[0].row_count, 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, CatalogResult};
use crate::types::{CellValue, WorksheetInfo};

use super::workbook::{Workbook, WorkbookReader};

/// One worksheet: a header row and data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySheet {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    header_row: usize,
    unreadable: bool,
}

impl MemorySheet {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            header_row: 0,
            unreadable: false,
        }
    }

    /// Append a data row.
    pub fn with_row<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Append `count` data rows produced by `make_row(index)`.
    pub fn with_generated_rows<F>(mut self, count: usize, mut make_row: F) -> Self
    where
        F: FnMut(usize) -> Vec<CellValue>,
    {
        self.rows.extend((0..count).map(&mut make_row));
        self
    }

    /// Place the header on 0-based sheet row `header_row`, as if the rows above were empty.
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// Listed normally, but every row read fails (simulates a truncated or corrupt sheet).
    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }

    fn info(&self) -> WorksheetInfo {
        WorksheetInfo::new(self.name.clone(), self.rows.len(), self.columns.clone())
            .with_header_row(self.header_row)
    }
}

/// An ordered list of [`MemorySheet`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: MemorySheet) -> Self {
        self.sheets.push(sheet);
        self
    }
}

/// A [`WorkbookReader`] over registered [`MemoryWorkbook`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbookReader {
    workbooks: HashMap<String, MemoryWorkbook>,
    corrupt: HashSet<String>,
}

impl MemoryWorkbookReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `workbook` under `file_name` (e.g. `BLE_MATERIALS.xlsx`).
    pub fn with_workbook(mut self, file_name: &str, workbook: MemoryWorkbook) -> Self {
        self.workbooks.insert(file_name.to_lowercase(), workbook);
        self
    }

    /// Make opening `file_name` fail as if the file were corrupt.
    pub fn with_corrupt(mut self, file_name: &str) -> Self {
        self.corrupt.insert(file_name.to_lowercase());
        self
    }
}

impl WorkbookReader for MemoryWorkbookReader {
    fn open(&self, path: &Path) -> CatalogResult<Box<dyn Workbook>> {
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if self.corrupt.contains(&key) {
            return Err(CatalogError::source_unavailable(path, "workbook is corrupt"));
        }

        match self.workbooks.get(&key) {
            Some(workbook) => Ok(Box::new(OpenMemoryWorkbook {
                path: path.to_path_buf(),
                sheets: workbook.sheets.clone(),
            })),
            None => Err(CatalogError::source_unavailable(path, "workbook file not found")),
        }
    }
}

struct OpenMemoryWorkbook {
    path: PathBuf,
    sheets: Vec<MemorySheet>,
}

impl Workbook for OpenMemoryWorkbook {
    fn worksheets(&mut self) -> CatalogResult<Vec<WorksheetInfo>> {
        Ok(self.sheets.iter().map(MemorySheet::info).collect())
    }

    fn read_row(&mut self, worksheet: &str, index: usize) -> CatalogResult<Option<Vec<CellValue>>> {
        let sheet = self
            .sheets
            .iter()
            .find(|s| s.name == worksheet)
            .ok_or_else(|| {
                CatalogError::source_unavailable(&self.path, format!("missing worksheet '{worksheet}'"))
            })?;

        if sheet.unreadable {
            return Err(CatalogError::source_unavailable(
                &self.path,
                format!("worksheet '{worksheet}' cannot be read"),
            ));
        }

        Ok(sheet.rows.get(index).cloned())
    }
}
