//! Worksheet row → [`MaterialRecord`] parsing.
//!
//! A [`ColumnMapping`] is resolved once per worksheet from its header names; [`parse_row`] then
//! converts each data row using it. Header names are matched case-insensitively and ignore
//! spaces, underscores and hyphens, so `Thermal Resistance`, `thermal_resistance` and
//! `ThermalResistance` all map to the same field.

use std::fmt;

use crate::classify::classify;
use crate::error::{CatalogError, CatalogResult};
use crate::types::{CellValue, Discipline, FireRating, MaterialRecord, WorksheetInfo};

/// A material field that a worksheet column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialField {
    Code,
    Name,
    Category,
    Discipline,
    Description,
    Manufacturer,
    Standard,
    ThermalResistance,
    ThermalConductivity,
    Density,
    SpecificHeat,
    FireRating,
    Cost,
    CostUnit,
    Application,
}

impl MaterialField {
    pub const ALL: [MaterialField; 15] = [
        MaterialField::Code,
        MaterialField::Name,
        MaterialField::Category,
        MaterialField::Discipline,
        MaterialField::Description,
        MaterialField::Manufacturer,
        MaterialField::Standard,
        MaterialField::ThermalResistance,
        MaterialField::ThermalConductivity,
        MaterialField::Density,
        MaterialField::SpecificHeat,
        MaterialField::FireRating,
        MaterialField::Cost,
        MaterialField::CostUnit,
        MaterialField::Application,
    ];

    /// Canonical catalog header for this field.
    pub fn header_name(&self) -> &'static str {
        match self {
            MaterialField::Code => "Code",
            MaterialField::Name => "Name",
            MaterialField::Category => "Category",
            MaterialField::Discipline => "Discipline",
            MaterialField::Description => "Description",
            MaterialField::Manufacturer => "Manufacturer",
            MaterialField::Standard => "Standard",
            MaterialField::ThermalResistance => "ThermalResistance",
            MaterialField::ThermalConductivity => "ThermalConductivity",
            MaterialField::Density => "Density",
            MaterialField::SpecificHeat => "SpecificHeat",
            MaterialField::FireRating => "FireRating",
            MaterialField::Cost => "Cost",
            MaterialField::CostUnit => "CostUnit",
            MaterialField::Application => "Application",
        }
    }

    /// Recognize a worksheet header, returning `None` for columns the catalog does not use.
    pub fn from_header(header: &str) -> Option<Self> {
        let key: String = header
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        let field = match key.as_str() {
            "code" => MaterialField::Code,
            "name" => MaterialField::Name,
            "category" => MaterialField::Category,
            "discipline" => MaterialField::Discipline,
            "description" => MaterialField::Description,
            "manufacturer" => MaterialField::Manufacturer,
            "standard" | "standardreference" => MaterialField::Standard,
            "thermalresistance" => MaterialField::ThermalResistance,
            "thermalconductivity" => MaterialField::ThermalConductivity,
            "density" => MaterialField::Density,
            "specificheat" => MaterialField::SpecificHeat,
            "firerating" => MaterialField::FireRating,
            "cost" | "unitcost" => MaterialField::Cost,
            "costunit" => MaterialField::CostUnit,
            "application" | "applicationnotes" | "notes" => MaterialField::Application,
            _ => return None,
        };
        Some(field)
    }
}

impl fmt::Display for MaterialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

/// Header → field projection for one worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    file: String,
    worksheet: String,
    /// Per field (indexed like [`MaterialField::ALL`]): column index and header as written.
    columns: [Option<(usize, String)>; 15],
    ignored: Vec<String>,
    /// 0-based sheet row of the header.
    header_row: usize,
}

impl ColumnMapping {
    /// Resolve the mapping for `worksheet` of workbook `file` (a display name, usually the file
    /// name). When two columns map to the same field, the leftmost wins.
    pub fn resolve(file: impl Into<String>, worksheet: &WorksheetInfo) -> Self {
        let mut columns: [Option<(usize, String)>; 15] = Default::default();
        let mut ignored = Vec::new();

        for (idx, header) in worksheet.columns.iter().enumerate() {
            match MaterialField::from_header(header) {
                Some(field) => {
                    let slot = &mut columns[field_slot(field)];
                    if slot.is_none() {
                        *slot = Some((idx, header.clone()));
                    } else {
                        ignored.push(header.clone());
                    }
                }
                None if header.trim().is_empty() => {}
                None => ignored.push(header.clone()),
            }
        }

        Self {
            file: file.into(),
            worksheet: worksheet.name.clone(),
            columns,
            ignored,
            header_row: worksheet.header_row,
        }
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Column index that `field` reads from, if the worksheet has one.
    pub fn column_of(&self, field: MaterialField) -> Option<usize> {
        self.columns[field_slot(field)].as_ref().map(|(idx, _)| *idx)
    }

    /// Fields with no column in this worksheet.
    pub fn missing_fields(&self) -> Vec<MaterialField> {
        MaterialField::ALL
            .into_iter()
            .filter(|f| self.column_of(*f).is_none())
            .collect()
    }

    /// Headers that were not mapped to any field.
    pub fn ignored_columns(&self) -> &[String] {
        &self.ignored
    }

    fn cell<'a>(&self, cells: &'a [CellValue], field: MaterialField) -> Option<(&'a CellValue, &str)> {
        let (idx, header) = self.columns[field_slot(field)].as_ref()?;
        Some((cells.get(*idx).unwrap_or(&EMPTY_CELL), header.as_str()))
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

fn field_slot(field: MaterialField) -> usize {
    field as usize
}

/// Whether every cell of the row is blank.
pub fn is_blank_row(cells: &[CellValue]) -> bool {
    cells.iter().all(CellValue::is_blank)
}

/// Parse data row `index` (0-based, header excluded) into a [`MaterialRecord`].
///
/// Errors with [`CatalogError::RowParse`] naming the 1-based sheet row when a cell cannot be
/// coerced; see [`WorksheetInfo::sheet_row`]. Fields without a column keep their defaults; a
/// blank category falls back to the worksheet name, and a blank discipline is derived from the
/// category.
pub fn parse_row(mapping: &ColumnMapping, index: usize, cells: &[CellValue]) -> CatalogResult<MaterialRecord> {
    let row = RowCursor {
        mapping,
        cells,
        user_row: mapping.header_row + index + 2,
    };

    let mut category = row.text(MaterialField::Category)?;
    if category.is_empty() {
        category = mapping.worksheet.clone();
    }

    let discipline = match row.optional(MaterialField::Discipline)? {
        Some(raw) => row.parse_enum::<Discipline>(MaterialField::Discipline, &raw)?,
        None => classify(&category),
    };

    let fire_rating = match row.optional(MaterialField::FireRating)? {
        Some(raw) => Some(row.parse_enum::<FireRating>(MaterialField::FireRating, &raw)?),
        None => None,
    };

    Ok(MaterialRecord {
        code: row.text(MaterialField::Code)?,
        name: row.text(MaterialField::Name)?,
        discipline,
        description: row.text(MaterialField::Description)?,
        manufacturer: row.text(MaterialField::Manufacturer)?,
        standard: row.text(MaterialField::Standard)?,
        thermal_resistance: row.number(MaterialField::ThermalResistance)?,
        thermal_conductivity: row.number(MaterialField::ThermalConductivity)?,
        density: row.number(MaterialField::Density)?,
        specific_heat: row.number(MaterialField::SpecificHeat)?,
        fire_rating,
        cost: row.number(MaterialField::Cost)?,
        cost_unit: row.text(MaterialField::CostUnit)?,
        application: row.text(MaterialField::Application)?,
        category,
    })
}

struct RowCursor<'a> {
    mapping: &'a ColumnMapping,
    cells: &'a [CellValue],
    user_row: usize,
}

impl RowCursor<'_> {
    fn error(&self, column: &str, cell: &CellValue, message: impl Into<String>) -> CatalogError {
        CatalogError::RowParse {
            file: self.mapping.file.clone(),
            worksheet: self.mapping.worksheet.clone(),
            row: self.user_row,
            column: column.to_string(),
            raw: cell.to_string(),
            message: message.into(),
        }
    }

    fn text(&self, field: MaterialField) -> CatalogResult<String> {
        Ok(self.optional(field)?.unwrap_or_default())
    }

    /// Trimmed text of a non-blank cell.
    fn optional(&self, field: MaterialField) -> CatalogResult<Option<String>> {
        let Some((cell, column)) = self.mapping.cell(self.cells, field) else {
            return Ok(None);
        };
        match cell {
            CellValue::Error(_) => Err(self.error(column, cell, "cell contains a spreadsheet error")),
            c if c.is_blank() => Ok(None),
            c => Ok(Some(c.to_string().trim().to_string())),
        }
    }

    fn parse_enum<T>(&self, field: MaterialField, raw: &str) -> CatalogResult<T>
    where
        T: std::str::FromStr<Err = String>,
    {
        raw.parse::<T>().map_err(|message| {
            let (cell, column) = self
                .mapping
                .cell(self.cells, field)
                .unwrap_or((&CellValue::Empty, field.header_name()));
            self.error(column, cell, message)
        })
    }

    fn number(&self, field: MaterialField) -> CatalogResult<f64> {
        let Some((cell, column)) = self.mapping.cell(self.cells, field) else {
            return Ok(0.0);
        };
        let parsed = match cell {
            c if c.is_blank() => return Ok(0.0),
            CellValue::Number(f) => Ok(*f),
            CellValue::Int(i) => Ok(*i as f64),
            CellValue::Text(s) => parse_invariant_f64(s),
            CellValue::Bool(_) => Err("expected number (got boolean)".to_string()),
            CellValue::Error(_) => Err("cell contains a spreadsheet error".to_string()),
            CellValue::Empty => Ok(0.0),
        };
        match parsed {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(self.error(column, cell, "expected finite number")),
            Err(message) => Err(self.error(column, cell, message)),
        }
    }
}

/// Parse a decimal using invariant conventions: `.` as the decimal separator, no grouping.
fn parse_invariant_f64(s: &str) -> Result<f64, String> {
    let t = s.trim();
    if t.contains(',') {
        return Err("expected number with '.' decimal separator and no grouping".to_string());
    }
    t.parse::<f64>().map_err(|e| format!("expected number: {e}"))
}
