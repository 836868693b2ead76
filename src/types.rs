//! Core data model types for catalog ingestion.
//!
//! Workbooks are decoded into [`CellValue`]s, described by [`WorksheetInfo`], and parsed into
//! [`MaterialRecord`]s.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse engineering discipline a material belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Discipline {
    /// Load-bearing materials (concrete, steel, masonry).
    Structural,
    /// Mechanical, electrical and plumbing materials.
    #[serde(rename = "MEP")]
    Mep,
    /// Finishes and envelope materials.
    Architecture,
    /// Anything not matched by a more specific discipline.
    #[default]
    General,
}

impl Discipline {
    /// Display name used in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Structural => "Structural",
            Discipline::Mep => "MEP",
            Discipline::Architecture => "Architecture",
            Discipline::General => "General",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Discipline {
    type Err = String;

    /// Parse an explicit discipline value (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structural" => Ok(Discipline::Structural),
            "mep" => Ok(Discipline::Mep),
            "architecture" | "architectural" => Ok(Discipline::Architecture),
            "general" => Ok(Discipline::General),
            _ => Err("expected discipline (Structural/MEP/Architecture/General)".to_string()),
        }
    }
}

/// Euroclass reaction-to-fire rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FireRating {
    A1,
    A2,
    B,
    C,
    D,
    E,
    F,
}

impl FireRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            FireRating::A1 => "A1",
            FireRating::A2 => "A2",
            FireRating::B => "B",
            FireRating::C => "C",
            FireRating::D => "D",
            FireRating::E => "E",
            FireRating::F => "F",
        }
    }
}

impl fmt::Display for FireRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FireRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(FireRating::A1),
            "A2" => Ok(FireRating::A2),
            "B" => Ok(FireRating::B),
            "C" => Ok(FireRating::C),
            "D" => Ok(FireRating::D),
            "E" => Ok(FireRating::E),
            "F" => Ok(FireRating::F),
            _ => Err("expected fire rating (A1/A2/B/C/D/E/F)".to_string()),
        }
    }
}

/// One catalog material.
///
/// Text fields default to `""`, numeric fields to `0.0` when the worksheet has no column for
/// them. Records that pass validation have a non-empty `code` and `name`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Short unique identifier, e.g. `CONC-001`.
    pub code: String,
    pub name: String,
    /// Category text; the source worksheet name when the row does not supply one.
    pub category: String,
    pub discipline: Discipline,
    pub description: String,
    pub manufacturer: String,
    /// Standard reference, e.g. `BS 8110`.
    pub standard: String,
    /// Thermal resistance in m²K/W.
    pub thermal_resistance: f64,
    /// Thermal conductivity in W/mK.
    pub thermal_conductivity: f64,
    /// Density in kg/m³.
    pub density: f64,
    /// Specific heat capacity in J/kgK.
    pub specific_heat: f64,
    pub fire_rating: Option<FireRating>,
    /// Unit cost, expressed in `cost_unit`.
    pub cost: f64,
    pub cost_unit: String,
    /// Application notes.
    pub application: String,
}

impl MaterialRecord {
    /// Numeric measurements paired with their field names, in declaration order.
    pub fn measurements(&self) -> [(&'static str, f64); 5] {
        [
            ("thermal_resistance", self.thermal_resistance),
            ("thermal_conductivity", self.thermal_conductivity),
            ("density", self.density),
            ("specific_heat", self.specific_heat),
            ("cost", self.cost),
        ]
    }
}

/// A single decoded worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing/empty cell.
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    /// A spreadsheet error value such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// Whether the cell carries no data (empty, or text that is only whitespace).
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

/// Shape of one worksheet inside an opened workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetInfo {
    /// Worksheet (tab) name.
    pub name: String,
    /// Number of data rows, excluding the header row.
    pub row_count: usize,
    /// Header names in column order.
    pub columns: Vec<String>,
    /// 0-based sheet row holding the header; data row `i` is sheet row `header_row + 1 + i`.
    pub header_row: usize,
}

impl WorksheetInfo {
    /// A worksheet whose header is on the first sheet row.
    pub fn new(name: impl Into<String>, row_count: usize, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            row_count,
            columns,
            header_row: 0,
        }
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// 1-based sheet row of data row `index`, as a spreadsheet application numbers it.
    pub fn sheet_row(&self, index: usize) -> usize {
        self.header_row + index + 2
    }
}
