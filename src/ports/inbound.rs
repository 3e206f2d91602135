//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: console front end driving the scheduling use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive main menu until the administrator exits.
    async fn run(&self) -> Result<(), DomainError>;
}
