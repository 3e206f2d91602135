//! Session catalog: upcoming training sessions with search, date bounds and sort.

use super::catalog::{Catalog, CatalogRecord, contains_ci};
use crate::domain::{DomainError, TrainingSession};
use crate::ports::TrainingBackend;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::fmt;
use tracing::{info, warn};

pub type SessionCatalog = Catalog<TrainingSession>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSortKey {
    Topic,
    StartDate,
    EndDate,
    Duration,
    Venue,
}

impl SessionSortKey {
    pub const ALL: [SessionSortKey; 5] = [
        SessionSortKey::Topic,
        SessionSortKey::StartDate,
        SessionSortKey::EndDate,
        SessionSortKey::Duration,
        SessionSortKey::Venue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SessionSortKey::Topic => "Topic",
            SessionSortKey::StartDate => "Start date",
            SessionSortKey::EndDate => "End date",
            SessionSortKey::Duration => "Duration",
            SessionSortKey::Venue => "Venue",
        }
    }
}

impl fmt::Display for SessionSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl CatalogRecord for TrainingSession {
    type SortKey = SessionSortKey;

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.topic, needle)
            || contains_ci(&self.venue, needle)
            || contains_ci(&self.requirement, needle)
    }

    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }

    fn compare(&self, other: &Self, key: SessionSortKey) -> Ordering {
        match key {
            SessionSortKey::Topic => self.topic.cmp(&other.topic),
            SessionSortKey::StartDate => self.start.cmp(&other.start),
            SessionSortKey::EndDate => self.end.cmp(&other.end),
            SessionSortKey::Duration => self.duration_hours.total_cmp(&other.duration_hours),
            SessionSortKey::Venue => self.venue.cmp(&other.venue),
        }
    }
}

/// Sessions whose start instant is not earlier than `now`. Evaluated once per load.
pub fn upcoming_only(sessions: Vec<TrainingSession>, now: DateTime<Utc>) -> Vec<TrainingSession> {
    sessions.into_iter().filter(|s| s.start >= now).collect()
}

impl Catalog<TrainingSession> {
    /// An empty session catalog.
    pub fn sessions() -> Self {
        Catalog::new("session")
    }

    /// Fetch all sessions and keep the upcoming ones. Returns false when the answer
    /// was superseded and dropped.
    pub async fn refresh(
        &mut self,
        backend: &dyn TrainingBackend,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let ticket = self.begin_refresh()?;
        match backend.list_sessions().await {
            Ok(all) => {
                let total = all.len();
                let upcoming = upcoming_only(all, now);
                info!(total, upcoming = upcoming.len(), "sessions loaded");
                Ok(self.complete_refresh(ticket, upcoming))
            }
            Err(e) => {
                warn!(error = %e, "session refresh failed");
                self.abort_refresh(ticket);
                Err(e)
            }
        }
    }
}

/// How soon an upcoming session starts, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    Past,
    Today,
    /// Within the next seven days.
    ThisWeek,
    Later,
}

impl Proximity {
    pub fn of(session: &TrainingSession, today: NaiveDate) -> Self {
        let days = (session.start.date_naive() - today).num_days();
        match days {
            d if d < 0 => Proximity::Past,
            0 => Proximity::Today,
            1..=7 => Proximity::ThisWeek,
            _ => Proximity::Later,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Proximity::Past => "past",
            Proximity::Today => "today",
            Proximity::ThisWeek => "this week",
            Proximity::Later => "later",
        }
    }
}
