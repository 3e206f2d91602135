//! Outbound ports. Application calls into the training backend.
//!
//! Implemented by adapters (HTTP client, in-memory backend).

use crate::domain::{
    DepartmentHours, DomainError, EmployeeCandidate, EmployeeHours, ImportRow,
    RegistrationRecord, StatusUpdateRow, TrainingSession,
};

/// Backend acknowledgement for a write (registration, import, status update).
/// `message` is passed to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAck {
    pub success: bool,
    pub message: Option<String>,
}

/// Training backend. Every method is one request; batches are never split.
#[async_trait::async_trait]
pub trait TrainingBackend: Send + Sync {
    /// Fetch every published session.
    async fn list_sessions(&self) -> Result<Vec<TrainingSession>, DomainError>;

    /// Fetch every registration (person x session).
    async fn list_registrations(&self) -> Result<Vec<RegistrationRecord>, DomainError>;

    /// Employees eligible for `topic` whose position is one of `levels`.
    /// `levels` are literal labels: either expanded levels or the raw requirement.
    async fn query_candidates(
        &self,
        topic: &str,
        levels: &[String],
    ) -> Result<Vec<EmployeeCandidate>, DomainError>;

    /// Register `employee_ids` on `session_id` in one call.
    async fn register(
        &self,
        session_id: i64,
        employee_ids: &[i64],
    ) -> Result<BackendAck, DomainError>;

    /// Create one session per row, as one transaction.
    async fn import_sessions(&self, rows: &[ImportRow]) -> Result<BackendAck, DomainError>;

    /// Apply status updates keyed by (name, nip, topic), as one transaction.
    async fn update_statuses(
        &self,
        updates: &[StatusUpdateRow],
    ) -> Result<BackendAck, DomainError>;

    /// Accumulated training hours of every employee.
    async fn employee_training_hours(&self) -> Result<Vec<EmployeeHours>, DomainError>;

    /// Division training hours. `None` when the backend has no usable figure.
    async fn division_training_hours(&self) -> Result<Option<f64>, DomainError>;

    /// Average training hours per employee, for each department.
    async fn department_training_hours(&self) -> Result<Vec<DepartmentHours>, DomainError>;
}
