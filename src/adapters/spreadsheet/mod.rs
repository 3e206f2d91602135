//! Spreadsheet adapter. Decodes uploaded workbooks and validates their rows.

pub mod validator;
pub mod workbook;

pub use validator::{
    IMPORT_COLUMNS, STATUS_COLUMNS, check_required_columns, normalize_date, validate_import_row,
    validate_import_rows, validate_status_row, validate_status_rows,
};
pub use workbook::{CellValue, SheetRow, WorkbookFormat, parse_workbook};

use crate::domain::DomainError;
use std::path::Path;

/// Raw bytes of an uploaded file plus the decoder to use.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: WorkbookFormat,
}

impl WorkbookSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, format: WorkbookFormat) -> Self {
        Self {
            name: name.into(),
            bytes,
            format,
        }
    }

    /// Read a file from disk; the format follows the extension.
    pub async fn from_path(path: &Path) -> Result<Self, DomainError> {
        let format = WorkbookFormat::from_path(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::Io(format!("read {}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes, format))
    }

    pub fn rows(&self) -> Result<Vec<SheetRow>, DomainError> {
        parse_workbook(&self.bytes, self.format)
    }
}
