//! Workbook decoding into header-keyed rows.
//!
//! Workbooks (xlsx, xlsm, xlsb, xls, ods) go through calamine; plain exports through
//! the `csv` crate. Only the first worksheet is read.

use crate::domain::DomainError;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Container format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// Any format calamine detects (xlsx, xlsm, xlsb, xls, ods).
    Workbook,
    Csv,
}

impl WorkbookFormat {
    /// Pick a decoder by file extension.
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            "csv" => Ok(Self::Csv),
            other => Err(DomainError::Workbook(format!(
                "unsupported file type '.{}' (expected .xlsx, .xls, .ods or .csv)",
                other
            ))),
        }
    }
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet date cell, as shown in the sheet (no time zone).
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Display form: integral numbers lose their ".0" so numeric ids read naturally.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One data row keyed by column header. Empty cells are absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetRow {
    /// 1-based row number in the sheet (the header is row 1 when it is the first row).
    pub line: usize,
    pub cells: HashMap<String, CellValue>,
}

impl SheetRow {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn has(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }
}

/// Decode `bytes` into rows. A file without data rows is `EmptyWorkbook`.
pub fn parse_workbook(bytes: &[u8], format: WorkbookFormat) -> Result<Vec<SheetRow>, DomainError> {
    let grid = match format {
        WorkbookFormat::Workbook => read_workbook_grid(bytes)?,
        WorkbookFormat::Csv => read_csv_grid(bytes)?,
    };
    let rows = rows_from_grid(grid);
    if rows.is_empty() {
        return Err(DomainError::EmptyWorkbook);
    }
    Ok(rows)
}

type Grid = Vec<(usize, Vec<Option<CellValue>>)>;

fn read_workbook_grid(bytes: &[u8]) -> Result<Grid, DomainError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| DomainError::Workbook(e.to_string()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| DomainError::Workbook(e.to_string()))?,
        None => return Err(DomainError::EmptyWorkbook),
    };
    // Range may not start at A1; keep sheet row numbers.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    Ok(range
        .rows()
        .enumerate()
        .map(|(i, cells)| (first_row + i + 1, cells.iter().map(cell_from_data).collect()))
        .collect())
}

fn cell_from_data(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => text_cell(s),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Some(CellValue::DateTime(naive)),
            None => Some(CellValue::Number(dt.as_f64())),
        },
    }
}

/// CSV fields stay text so identifiers keep their leading zeros.
fn read_csv_grid(bytes: &[u8]) -> Result<Grid, DomainError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut grid = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| DomainError::Workbook(e.to_string()))?;
        let line = record
            .position()
            .and_then(|pos| record_line(bytes, pos))
            .unwrap_or(i + 1);
        let cells = record
            .iter()
            // Strip a UTF-8 BOM that spreadsheet exports put before the first header.
            .map(|field| text_cell(field.trim_start_matches('\u{feff}')))
            .collect();
        grid.push((line, cells));
    }
    Ok(grid)
}

/// 1-based line a record starts on. The reader skips blank lines without recording
/// them in the position it hands out, so they are counted here.
fn record_line(bytes: &[u8], pos: &csv::Position) -> Option<usize> {
    let start = usize::try_from(pos.byte()).ok()?;
    let skipped = bytes
        .get(start..)?
        .iter()
        .take_while(|b| matches!(b, b'\r' | b'\n'))
        .filter(|&&b| b == b'\n')
        .count();
    usize::try_from(pos.line()).ok().map(|line| line + skipped)
}

fn text_cell(s: &str) -> Option<CellValue> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(CellValue::Text(t.to_string()))
    }
}

/// First non-empty row is the header; later fully-empty rows are skipped.
fn rows_from_grid(grid: Grid) -> Vec<SheetRow> {
    let mut iter = grid
        .into_iter()
        .filter(|(_, cells)| cells.iter().any(Option::is_some));

    let Some((_, header_cells)) = iter.next() else {
        return Vec::new();
    };
    let headers: Vec<Option<String>> = header_cells
        .iter()
        .map(|c| c.as_ref().map(CellValue::to_text))
        .collect();

    iter.map(|(line, cells)| {
        let cells = cells
            .into_iter()
            .enumerate()
            .filter_map(|(col, cell)| {
                let header = headers.get(col).cloned().flatten()?;
                cell.map(|value| (header, value))
            })
            .collect();
        SheetRow { line, cells }
    })
    .filter(|row| !row.cells.is_empty())
    .collect()
}
