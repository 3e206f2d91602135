//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("The workbook is empty or has no data rows")]
    EmptyWorkbook,

    #[error("Required column '{column}' not found in the workbook")]
    MissingColumn { column: String },

    #[error("Workbook could not be read: {0}")]
    Workbook(String),

    /// `key` is the topic (session import) or identifier (status import) of the row.
    #[error("Row {row} (\"{key}\"): {reason}")]
    RowValidation {
        row: usize,
        key: String,
        reason: String,
    },

    #[error("Backend request failed: {0}")]
    Transport(String),

    #[error("Backend rejected the request as unauthorized (HTTP 401)")]
    Unauthorized,

    #[error("Backend refused the request: {0}")]
    Rejected(String),

    #[error("{0}")]
    EmptySelection(String),

    #[error("A {0} refresh is already in progress")]
    Busy(&'static str),

    #[error("Prompt failed: {0}")]
    Ui(String),

    #[error("File error: {0}")]
    Io(String),
}

/// Coarse classification used when deciding how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StructuralFile,
    RowValidation,
    Transport,
    EmptySelection,
    Local,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::EmptyWorkbook
            | DomainError::MissingColumn { .. }
            | DomainError::Workbook(_) => ErrorKind::StructuralFile,
            DomainError::RowValidation { .. } => ErrorKind::RowValidation,
            DomainError::Transport(_) | DomainError::Unauthorized | DomainError::Rejected(_) => {
                ErrorKind::Transport
            }
            DomainError::EmptySelection(_) => ErrorKind::EmptySelection,
            DomainError::Busy(_) | DomainError::Ui(_) | DomainError::Io(_) => ErrorKind::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_validation_message_names_row_and_key() {
        let err = DomainError::RowValidation {
            row: 3,
            key: "Fire Safety".into(),
            reason: "invalid date in 'Start Date'".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("Fire Safety"));
        assert_eq!(err.kind(), ErrorKind::RowValidation);
    }

    #[test]
    fn test_kinds() {
        let missing = DomainError::MissingColumn {
            column: "Venue".into(),
        };
        assert!(missing.to_string().contains("Venue"));
        assert_eq!(missing.kind(), ErrorKind::StructuralFile);
        assert_eq!(DomainError::EmptyWorkbook.kind(), ErrorKind::StructuralFile);
        assert_eq!(DomainError::Unauthorized.kind(), ErrorKind::Transport);
        assert_eq!(
            DomainError::EmptySelection("x".into()).kind(),
            ErrorKind::EmptySelection
        );
        assert_eq!(DomainError::Busy("refresh").kind(), ErrorKind::Local);
    }
}
