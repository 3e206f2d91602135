//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod job_level;
pub mod training_hours;

pub use entities::{
    EmployeeCandidate, Enrollment, ImportRow, RegistrationRecord, StatusUpdateRow,
    TrainingSession,
};
pub use errors::{DomainError, ErrorKind};
pub use job_level::{JobLevel, ResolvedRequirement};
pub use training_hours::{
    DepartmentHours, DivisionProgress, EmployeeHours, ProgressBand, TARGET_HOURS,
    TrainingPriority,
};
