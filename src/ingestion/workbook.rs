//! Workbook-reading capability.
//!
//! The pipeline never decodes spreadsheet bytes itself. It goes through a [`WorkbookReader`],
//! which opens a path into a [`Workbook`] handle that lists worksheets and yields data rows.
//! Two readers ship with the crate:
//!
//! - [`super::excel::ExcelWorkbookReader`] (feature `excel`): real `.xlsx`/`.xls`/`.ods` files
//! - [`super::memory::MemoryWorkbookReader`]: fixed in-memory worksheets

use std::path::Path;

use crate::error::CatalogResult;
use crate::types::{CellValue, WorksheetInfo};

/// Opens workbooks. Implementations must be shareable across threads so a loader can be moved
/// to a background pool.
pub trait WorkbookReader: Send + Sync {
    /// Open the workbook at `path`.
    ///
    /// Missing or unreadable files fail with [`crate::CatalogError::SourceUnavailable`].
    fn open(&self, path: &Path) -> CatalogResult<Box<dyn Workbook>>;
}

/// An opened workbook.
pub trait Workbook {
    /// Worksheets in workbook order.
    fn worksheets(&mut self) -> CatalogResult<Vec<WorksheetInfo>>;

    /// Cells of data row `index` (0-based, header excluded) of `worksheet`, in column order.
    ///
    /// Returns `Ok(None)` when `index` is past the last data row.
    fn read_row(&mut self, worksheet: &str, index: usize) -> CatalogResult<Option<Vec<CellValue>>>;

    /// All data rows of `worksheet`, in order.
    fn read_rows(&mut self, worksheet: &WorksheetInfo) -> CatalogResult<Vec<Vec<CellValue>>> {
        let mut rows = Vec::with_capacity(worksheet.row_count);
        for index in 0..worksheet.row_count {
            match self.read_row(&worksheet.name, index)? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }
}

/// An opened workbook together with its worksheet list.
pub struct DecomposedWorkbook {
    pub workbook: Box<dyn Workbook>,
    pub worksheets: Vec<WorksheetInfo>,
}

impl std::fmt::Debug for DecomposedWorkbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecomposedWorkbook")
            .field("worksheets", &self.worksheets)
            .finish_non_exhaustive()
    }
}

/// Open `path` with `reader` and list its worksheets.
pub fn decompose(reader: &dyn WorkbookReader, path: &Path) -> CatalogResult<DecomposedWorkbook> {
    let mut workbook = reader.open(path)?;
    let worksheets = workbook.worksheets()?;
    Ok(DecomposedWorkbook {
        workbook,
        worksheets,
    })
}
