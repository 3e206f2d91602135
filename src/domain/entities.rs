//! Domain entities. Pure data structures for the core business.
//!
//! No wire/IO types here; adapters map backend DTOs into these.

use chrono::{DateTime, Utc};
use std::fmt;

/// A session's open/closed status for new registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Enrollment {
    #[default]
    Open,
    Closed,
}

impl Enrollment {
    /// Label as stored by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Enrollment::Open => "Open",
            Enrollment::Closed => "Closed",
        }
    }

    /// Anything other than "open" (any casing) is treated as closed.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("open") {
            Enrollment::Open
        } else {
            Enrollment::Closed
        }
    }
}

impl fmt::Display for Enrollment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published training session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSession {
    pub id: i64,
    pub topic: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Length in hours.
    pub duration_hours: f64,
    pub venue: String,
    /// Raw requirement expression, e.g. "Worker - Team Leader".
    pub requirement: String,
    pub enrollment: Enrollment,
}

/// An employee offered in the selection dialog. Transient, per eligibility query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeCandidate {
    pub id: i64,
    pub name: String,
    pub department: String,
    /// Employee identification number (NIP).
    pub nip: String,
    pub grade: i64,
    pub position: String,
}

/// Read-only projection of one person registered on one session.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRecord {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub nip: String,
    pub topic: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Served as free text by the backend (e.g. "8" or "8 hours").
    pub duration: String,
    pub venue: String,
    pub status: String,
}

/// One validated spreadsheet row of a session import. Dates are UTC midnight.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub topic: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_hours: f64,
    pub venue: String,
    pub requirement: String,
    pub enrollment: Enrollment,
}

/// One validated row of a status-update import, keyed by (name, nip, topic).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdateRow {
    pub name: String,
    pub nip: String,
    pub topic: String,
    pub status: Option<String>,
}
