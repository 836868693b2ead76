#![cfg(feature = "excel")]

//! [`WorkbookReader`] backed by `calamine`.
//!
//! Any format calamine can auto-detect (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) can be read.
//! For each worksheet the first row of the used range is the header; every following row is a
//! data row. Row numbers in errors are absolute sheet rows, so leading blank rows are counted.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};

use crate::error::{CatalogError, CatalogResult};
use crate::types::{CellValue, WorksheetInfo};

use super::workbook::{Workbook, WorkbookReader};

/// Production workbook reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExcelWorkbookReader;

impl ExcelWorkbookReader {
    pub fn new() -> Self {
        Self
    }
}

impl WorkbookReader for ExcelWorkbookReader {
    fn open(&self, path: &Path) -> CatalogResult<Box<dyn Workbook>> {
        if !path.is_file() {
            return Err(CatalogError::source_unavailable(path, "workbook file not found"));
        }
        let sheets = open_workbook_auto(path).map_err(|e| CatalogError::source_unavailable(path, e))?;
        Ok(Box::new(ExcelWorkbook {
            path: path.to_path_buf(),
            sheets,
            ranges: HashMap::new(),
        }))
    }
}

struct ExcelWorkbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
    ranges: HashMap<String, Range<Data>>,
}

impl ExcelWorkbook {
    fn range(&mut self, worksheet: &str) -> CatalogResult<&Range<Data>> {
        if !self.ranges.contains_key(worksheet) {
            let range = self
                .sheets
                .worksheet_range(worksheet)
                .map_err(|e| CatalogError::source_unavailable(&self.path, format!("worksheet '{worksheet}': {e}")))?;
            self.ranges.insert(worksheet.to_string(), range);
        }
        self.ranges.get(worksheet).ok_or_else(|| {
            CatalogError::source_unavailable(&self.path, format!("missing worksheet '{worksheet}'"))
        })
    }
}

impl Workbook for ExcelWorkbook {
    fn worksheets(&mut self) -> CatalogResult<Vec<WorksheetInfo>> {
        let names = self.sheets.sheet_names();
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let range = self.range(&name)?;
            let columns: Vec<String> = match range.rows().next() {
                Some(header) => header.iter().map(|c| cell_to_header_string(c).trim().to_string()).collect(),
                None => Vec::new(),
            };
            let row_count = range.height().saturating_sub(1);
            // the used range starts at the first non-empty cell, not necessarily A1
            let header_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
            out.push(WorksheetInfo::new(name, row_count, columns).with_header_row(header_row));
        }
        Ok(out)
    }

    fn read_row(&mut self, worksheet: &str, index: usize) -> CatalogResult<Option<Vec<CellValue>>> {
        let range = self.range(worksheet)?;
        Ok(range
            .rows()
            .nth(index + 1)
            .map(|row| row.iter().map(convert_cell).collect()))
    }

    fn read_rows(&mut self, worksheet: &WorksheetInfo) -> CatalogResult<Vec<Vec<CellValue>>> {
        let range = self.range(&worksheet.name)?;
        Ok(range
            .rows()
            .skip(1)
            .map(|row| row.iter().map(convert_cell).collect())
            .collect())
    }
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => convert_cell(other).to_string(),
    }
}

fn convert_cell(c: &Data) -> CellValue {
    match c {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Text(dt.to_string()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(format!("{e:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use calamine::{CellErrorType, Data};

    use super::{convert_cell, ExcelWorkbookReader};
    use crate::error::CatalogError;
    use crate::ingestion::workbook::WorkbookReader;
    use crate::types::CellValue;

    #[test]
    fn converts_calamine_cells() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(convert_cell(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Int(7));
        assert_eq!(
            convert_cell(&Data::String("C30".to_string())),
            CellValue::Text("C30".to_string())
        );
        assert!(matches!(convert_cell(&Data::Error(CellErrorType::Div0)), CellValue::Error(_)));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = ExcelWorkbookReader::new()
            .open(Path::new("definitely/not/here/BLE_MATERIALS.xlsx"))
            .err()
            .unwrap();
        assert!(matches!(err, CatalogError::SourceUnavailable { .. }));
    }

    #[test]
    fn non_workbook_bytes_are_unavailable() {
        let path = std::env::temp_dir().join(format!(
            "material-catalog-not-a-workbook-{}.xlsx",
            std::process::id()
        ));
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let err = ExcelWorkbookReader::new().open(&path).err().unwrap();
        assert!(matches!(err, CatalogError::SourceUnavailable { .. }));

        let _ = std::fs::remove_file(&path);
    }
}
