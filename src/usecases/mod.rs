//! Application use cases. Orchestrate domain logic via ports.

pub mod catalog;
pub mod dashboard;
pub mod eligibility;
pub mod import_pipeline;
pub mod registrant_catalog;
pub mod registration;
pub mod session_catalog;

pub use catalog::{Catalog, CatalogRecord, FilterState, RefreshTicket, SortDirection, SortState};
pub use dashboard::{DashboardSnapshot, PriorityCounts, TrainingHoursDashboard};
pub use eligibility::{CandidatePool, EligibilityResolver};
pub use import_pipeline::{BatchImportPipeline, ImportReport};
pub use registrant_catalog::{RegistrantCatalog, RegistrantSortKey};
pub use registration::{RegistrationOutcome, RegistrationTransaction, SelectionSet};
pub use session_catalog::{Proximity, SessionCatalog, SessionSortKey, upcoming_only};
