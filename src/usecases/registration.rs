//! Registration of selected employees onto one session.

use super::registrant_catalog::RegistrantCatalog;
use super::session_catalog::SessionCatalog;
use crate::domain::DomainError;
use crate::ports::TrainingBackend;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Employee ids picked in one registration dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<i64>,
}

impl SelectionSet {
    /// Flip membership of `id`. Returns true when it is now selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select(&mut self, id: i64) {
        self.ids.insert(id);
    }

    pub fn deselect(&mut self, id: i64) {
        self.ids.remove(&id);
    }

    /// Replace the selection.
    pub fn set(&mut self, ids: impl IntoIterator<Item = i64>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ascending ids.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }
}

/// Accepted registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub session_id: i64,
    pub registered: usize,
    /// Backend message, shown as-is.
    pub message: Option<String>,
}

/// One registration dialog: a target session plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct RegistrationTransaction {
    session_id: Option<i64>,
    selection: SelectionSet,
}

impl RegistrationTransaction {
    pub fn new(session_id: Option<i64>) -> Self {
        Self {
            session_id,
            selection: SelectionSet::default(),
        }
    }

    pub fn session_id(&self) -> Option<i64> {
        self.session_id
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    /// Send the whole selection in one request.
    ///
    /// Nothing is sent without a session and at least one employee. On success the
    /// selection is cleared; on any failure it is kept so the user can retry.
    pub async fn submit(
        &mut self,
        backend: &dyn TrainingBackend,
    ) -> Result<RegistrationOutcome, DomainError> {
        let Some(session_id) = self.session_id else {
            return Err(DomainError::EmptySelection(
                "No training session selected".to_string(),
            ));
        };
        if self.selection.is_empty() {
            return Err(DomainError::EmptySelection(
                "Select at least one employee to register".to_string(),
            ));
        }

        let ids = self.selection.ids();
        let ack = backend.register(session_id, &ids).await?;
        if !ack.success {
            let message = ack
                .message
                .unwrap_or_else(|| "Registration was not accepted".to_string());
            warn!(session_id, count = ids.len(), %message, "registration rejected");
            return Err(DomainError::Rejected(message));
        }

        info!(session_id, count = ids.len(), "registration accepted");
        self.selection.clear();
        Ok(RegistrationOutcome {
            session_id,
            registered: ids.len(),
            message: ack.message,
        })
    }

    /// `submit`, then mark both catalogs stale once the backend accepted it. A failed
    /// submit leaves them untouched.
    pub async fn submit_and_invalidate(
        &mut self,
        backend: &dyn TrainingBackend,
        sessions: &mut SessionCatalog,
        registrants: &mut RegistrantCatalog,
    ) -> Result<RegistrationOutcome, DomainError> {
        let outcome = self.submit(backend).await?;
        sessions.mark_stale();
        registrants.mark_stale();
        Ok(outcome)
    }
}
