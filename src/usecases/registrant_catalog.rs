//! Registrant catalog: every registration (person x session), filterable and sortable.

use super::catalog::{Catalog, CatalogRecord, contains_ci};
use crate::domain::{DomainError, RegistrationRecord};
use crate::ports::TrainingBackend;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use tracing::{info, warn};

pub type RegistrantCatalog = Catalog<RegistrationRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrantSortKey {
    Name,
    Nip,
    Department,
    Topic,
    StartDate,
    EndDate,
    Status,
}

impl RegistrantSortKey {
    pub const ALL: [RegistrantSortKey; 7] = [
        RegistrantSortKey::Name,
        RegistrantSortKey::Nip,
        RegistrantSortKey::Department,
        RegistrantSortKey::Topic,
        RegistrantSortKey::StartDate,
        RegistrantSortKey::EndDate,
        RegistrantSortKey::Status,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RegistrantSortKey::Name => "Name",
            RegistrantSortKey::Nip => "NIP",
            RegistrantSortKey::Department => "Department",
            RegistrantSortKey::Topic => "Topic",
            RegistrantSortKey::StartDate => "Start date",
            RegistrantSortKey::EndDate => "End date",
            RegistrantSortKey::Status => "Status",
        }
    }
}

impl fmt::Display for RegistrantSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl CatalogRecord for RegistrationRecord {
    type SortKey = RegistrantSortKey;

    fn matches(&self, needle: &str) -> bool {
        [
            &self.name,
            &self.nip,
            &self.department,
            &self.topic,
            &self.status,
        ]
        .into_iter()
        .any(|field| contains_ci(field, needle))
    }

    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }

    fn compare(&self, other: &Self, key: RegistrantSortKey) -> Ordering {
        match key {
            RegistrantSortKey::Name => self.name.cmp(&other.name),
            RegistrantSortKey::Nip => self.nip.cmp(&other.nip),
            RegistrantSortKey::Department => self.department.cmp(&other.department),
            RegistrantSortKey::Topic => self.topic.cmp(&other.topic),
            RegistrantSortKey::StartDate => self.start.cmp(&other.start),
            RegistrantSortKey::EndDate => self.end.cmp(&other.end),
            RegistrantSortKey::Status => self.status.cmp(&other.status),
        }
    }
}

impl Catalog<RegistrationRecord> {
    /// An empty registrant catalog.
    pub fn registrants() -> Self {
        Catalog::new("registrant")
    }

    /// Fetch every registration. Returns false when the answer was superseded.
    pub async fn refresh(&mut self, backend: &dyn TrainingBackend) -> Result<bool, DomainError> {
        let ticket = self.begin_refresh()?;
        match backend.list_registrations().await {
            Ok(records) => {
                info!(count = records.len(), "registrants loaded");
                Ok(self.complete_refresh(ticket, records))
            }
            Err(e) => {
                warn!(error = %e, "registrant refresh failed");
                self.abort_refresh(ticket);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::MemoryBackend;
    use chrono::{NaiveDate, TimeZone};

    fn record(
        id: i64,
        name: &str,
        nip: &str,
        topic: &str,
        day: u32,
        status: &str,
    ) -> RegistrationRecord {
        RegistrationRecord {
            id,
            name: name.to_string(),
            department: "Production".to_string(),
            nip: nip.to_string(),
            topic: topic.to_string(),
            start: Utc.with_ymd_and_hms(2025, 6, day, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, day + 2, 0, 0, 0).unwrap(),
            duration: "8".to_string(),
            venue: "Jakarta".to_string(),
            status: status.to_string(),
        }
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::with_data(
            Vec::new(),
            Vec::new(),
            vec![
                record(1, "Siti Rahma", "10230002", "Fire Safety", 3, "Registered"),
                record(2, "Budi Santoso", "10230001", "Fire Safety", 3, "Completed"),
                record(3, "Agus Pratama", "10230003", "Leadership", 10, "Registered"),
            ],
        )
    }

    #[tokio::test]
    async fn test_refresh_loads_all_records() {
        let backend = backend();
        let mut catalog = RegistrantCatalog::registrants();
        assert!(catalog.refresh(&backend).await.unwrap());
        assert_eq!(catalog.visible_len(), 3);
        assert!(!catalog.is_stale());
    }

    #[tokio::test]
    async fn test_search_nip_and_status() {
        let backend = backend();
        let mut catalog = RegistrantCatalog::registrants();
        catalog.refresh(&backend).await.unwrap();
        assert_eq!(catalog.set_search("10230001").len(), 1);
        assert_eq!(catalog.set_search("completed").len(), 1);
        assert_eq!(catalog.set_search("registered").len(), 2);
        assert!(catalog.set_search("nobody").is_empty());
    }

    #[tokio::test]
    async fn test_sort_name_and_refresh_keeps_order() {
        let backend = backend();
        let mut catalog = RegistrantCatalog::registrants();
        catalog.refresh(&backend).await.unwrap();
        catalog.sort_by(RegistrantSortKey::Name);
        catalog.refresh(&backend).await.unwrap();
        let names: Vec<&str> = catalog.visible().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Agus Pratama", "Budi Santoso", "Siti Rahma"]);
    }

    #[tokio::test]
    async fn test_date_bounds_and_search_combine() {
        let backend = backend();
        let mut catalog = RegistrantCatalog::registrants();
        catalog.refresh(&backend).await.unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 6, 1);
        let end = NaiveDate::from_ymd_opt(2025, 6, 5);
        let visible = catalog.apply_filters("registered", start, end);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Siti Rahma");
    }
}
