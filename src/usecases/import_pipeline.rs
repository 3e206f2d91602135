//! Batch import pipeline. Validates a whole workbook, submits it in one call, then
//! refreshes the affected catalog.

use super::registrant_catalog::RegistrantCatalog;
use super::session_catalog::SessionCatalog;
use crate::adapters::spreadsheet::{WorkbookSource, validate_import_rows, validate_status_rows};
use crate::domain::DomainError;
use crate::ports::{BackendAck, TrainingBackend};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of an acknowledged import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub rows: usize,
    /// Backend message, shown as-is.
    pub message: Option<String>,
    /// False when the follow-up catalog refresh failed. The import itself stands.
    pub catalog_refreshed: bool,
}

/// Service for spreadsheet-driven batch writes.
///
/// Flow for both imports:
/// 1. Decode the workbook and check required columns
/// 2. Validate every row, stopping at the first bad one
/// 3. Submit all rows in one backend call
/// 4. Refresh the catalog that shows the result
pub struct BatchImportPipeline {
    backend: Arc<dyn TrainingBackend>,
}

impl BatchImportPipeline {
    pub fn new(backend: Arc<dyn TrainingBackend>) -> Self {
        Self { backend }
    }

    /// Create training sessions from a workbook.
    pub async fn import_sessions(
        &self,
        source: &WorkbookSource,
        sessions: &mut SessionCatalog,
        now: DateTime<Utc>,
    ) -> Result<ImportReport, DomainError> {
        let rows = validate_import_rows(&source.rows()?)?;
        info!(file = %source.name, rows = rows.len(), "session workbook validated");

        let ack = self.backend.import_sessions(&rows).await?;
        let message = accepted(ack, "Session import was not accepted")?;
        info!(rows = rows.len(), "session import acknowledged");

        sessions.mark_stale();
        let catalog_refreshed = match sessions.refresh(self.backend.as_ref(), now).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "sessions not refreshed after import");
                false
            }
        };

        Ok(ImportReport {
            rows: rows.len(),
            message,
            catalog_refreshed,
        })
    }

    /// Apply registrant status updates from a workbook.
    pub async fn update_statuses(
        &self,
        source: &WorkbookSource,
        registrants: &mut RegistrantCatalog,
    ) -> Result<ImportReport, DomainError> {
        let rows = validate_status_rows(&source.rows()?)?;
        info!(file = %source.name, rows = rows.len(), "status workbook validated");

        let ack = self.backend.update_statuses(&rows).await?;
        let message = accepted(ack, "Status update was not accepted")?;
        info!(rows = rows.len(), "status update acknowledged");

        registrants.mark_stale();
        let catalog_refreshed = match registrants.refresh(self.backend.as_ref()).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "registrants not refreshed after status update");
                false
            }
        };

        Ok(ImportReport {
            rows: rows.len(),
            message,
            catalog_refreshed,
        })
    }
}

fn accepted(ack: BackendAck, fallback: &str) -> Result<Option<String>, DomainError> {
    if ack.success {
        Ok(ack.message)
    } else {
        Err(DomainError::Rejected(
            ack.message.unwrap_or_else(|| fallback.to_string()),
        ))
    }
}
