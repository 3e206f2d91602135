//! In-memory training backend. Implements `TrainingBackend` without a server.
//!
//! Used for offline runs (`TRAINING_OFFLINE=true`) and as the test double: it counts
//! calls per operation and can be told to fail an operation with a transport error.

use crate::domain::{
    DepartmentHours, DomainError, EmployeeCandidate, EmployeeHours, Enrollment, ImportRow,
    RegistrationRecord, StatusUpdateRow, TrainingSession,
};
use crate::ports::{BackendAck, TrainingBackend};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::info;

/// Operations of the backend, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    ListSessions,
    ListRegistrations,
    QueryCandidates,
    Register,
    ImportSessions,
    UpdateStatuses,
    EmployeeHours,
    DivisionHours,
    DepartmentHours,
}

const OPS: usize = 9;

impl BackendOp {
    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
struct Store {
    sessions: Vec<TrainingSession>,
    registrations: Vec<RegistrationRecord>,
    employees: Vec<EmployeeCandidate>,
    next_session_id: i64,
    next_registration_id: i64,
}

impl Store {
    /// Hours of completed registrations, per employee in employee order.
    fn completed_hours(&self) -> Vec<(&EmployeeCandidate, f64)> {
        self.employees
            .iter()
            .map(|e| {
                let hours: f64 = self
                    .registrations
                    .iter()
                    .filter(|r| r.nip == e.nip && r.status.eq_ignore_ascii_case("completed"))
                    .filter_map(|r| r.duration.trim().parse::<f64>().ok())
                    .sum();
                (e, hours)
            })
            .collect()
    }
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: RwLock<Store>,
    calls: [AtomicUsize; OPS],
    failures: RwLock<HashMap<BackendOp, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(
        sessions: Vec<TrainingSession>,
        employees: Vec<EmployeeCandidate>,
        registrations: Vec<RegistrationRecord>,
    ) -> Self {
        let next_session_id = sessions.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let next_registration_id = registrations.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            store: RwLock::new(Store {
                sessions,
                registrations,
                employees,
                next_session_id,
                next_registration_id,
            }),
            ..Self::default()
        }
    }

    /// Sample organisation with sessions starting relative to `now`.
    pub fn with_demo_data(now: DateTime<Utc>) -> Self {
        let day = |offset: i64| {
            (now + Duration::days(offset))
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc()
        };
        let session = |id, topic: &str, start: i64, len: i64, hours, venue: &str, req: &str| {
            TrainingSession {
                id,
                topic: topic.to_string(),
                start: day(start),
                end: day(start + len),
                duration_hours: hours,
                venue: venue.to_string(),
                requirement: req.to_string(),
                enrollment: Enrollment::Open,
            }
        };
        let employee = |id, name: &str, dept: &str, nip: &str, grade, position: &str| {
            EmployeeCandidate {
                id,
                name: name.to_string(),
                department: dept.to_string(),
                nip: nip.to_string(),
                grade,
                position: position.to_string(),
            }
        };
        Self::with_data(
            vec![
                session(1, "Fire Safety", 3, 1, 8.0, "Jakarta", "Worker - Team Leader"),
                session(
                    2,
                    "Leadership Basics",
                    10,
                    2,
                    16.0,
                    "Bandung",
                    "Team Leader - Section Head",
                ),
                session(
                    3,
                    "Plant Strategy",
                    21,
                    0,
                    4.0,
                    "Surabaya",
                    "Departemen Head - Plant Head",
                ),
                session(4, "First Aid", -14, 0, 4.0, "Jakarta", "Worker - Staff"),
                session(5, "Quality Circle", 5, 0, 6.0, "Cikarang", "QC Inspector"),
            ],
            vec![
                employee(1, "Budi Santoso", "Production", "10230001", 3, "worker"),
                employee(2, "Siti Rahma", "Production", "10230002", 4, "staff"),
                employee(3, "Agus Pratama", "Maintenance", "10230003", 5, "team leader"),
                employee(4, "Dewi Lestari", "Quality", "10230004", 6, "section head"),
                employee(5, "Rudi Hartono", "Finance", "10230005", 8, "departemen head"),
                employee(6, "Maya Sari", "Quality", "10230006", 3, "QC Inspector"),
                employee(7, "Hendra Wijaya", "Operations", "10230007", 10, "plant head"),
            ],
            Vec::new(),
        )
    }

    /// Number of calls made to `op` so far.
    pub fn call_count(&self, op: BackendOp) -> usize {
        self.calls[op.slot()].load(Ordering::SeqCst)
    }

    /// Total calls across all operations.
    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Make every following call to `op` fail with a transport error.
    pub async fn fail_with(&self, op: BackendOp, message: impl Into<String>) {
        self.failures.write().await.insert(op, message.into());
    }

    pub async fn clear_failure(&self, op: BackendOp) {
        self.failures.write().await.remove(&op);
    }

    pub async fn sessions(&self) -> Vec<TrainingSession> {
        self.store.read().await.sessions.clone()
    }

    pub async fn registrations(&self) -> Vec<RegistrationRecord> {
        self.store.read().await.registrations.clone()
    }

    async fn enter(&self, op: BackendOp) -> Result<(), DomainError> {
        self.calls[op.slot()].fetch_add(1, Ordering::SeqCst);
        match self.failures.read().await.get(&op) {
            Some(message) => Err(DomainError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl TrainingBackend for MemoryBackend {
    async fn list_sessions(&self) -> Result<Vec<TrainingSession>, DomainError> {
        self.enter(BackendOp::ListSessions).await?;
        Ok(self.store.read().await.sessions.clone())
    }

    async fn list_registrations(&self) -> Result<Vec<RegistrationRecord>, DomainError> {
        self.enter(BackendOp::ListRegistrations).await?;
        Ok(self.store.read().await.registrations.clone())
    }

    async fn query_candidates(
        &self,
        topic: &str,
        levels: &[String],
    ) -> Result<Vec<EmployeeCandidate>, DomainError> {
        self.enter(BackendOp::QueryCandidates).await?;
        let store = self.store.read().await;
        let wanted: Vec<String> = levels.iter().map(|l| l.trim().to_lowercase()).collect();
        Ok(store
            .employees
            .iter()
            .filter(|e| wanted.contains(&e.position.trim().to_lowercase()))
            .filter(|e| {
                !store
                    .registrations
                    .iter()
                    .any(|r| r.nip == e.nip && r.topic == topic)
            })
            .cloned()
            .collect())
    }

    async fn register(
        &self,
        session_id: i64,
        employee_ids: &[i64],
    ) -> Result<BackendAck, DomainError> {
        self.enter(BackendOp::Register).await?;
        let mut store = self.store.write().await;

        let Some(session) = store.sessions.iter().find(|s| s.id == session_id).cloned() else {
            return Ok(BackendAck {
                success: false,
                message: Some(format!("Training {} not found", session_id)),
            });
        };
        let employees: Vec<EmployeeCandidate> = employee_ids
            .iter()
            .filter_map(|id| store.employees.iter().find(|e| e.id == *id).cloned())
            .collect();
        if employees.len() != employee_ids.len() {
            return Ok(BackendAck {
                success: false,
                message: Some("Unknown employee in selection".to_string()),
            });
        }

        for e in employees {
            let id = store.next_registration_id;
            store.next_registration_id += 1;
            store.registrations.push(RegistrationRecord {
                id,
                name: e.name,
                department: e.department,
                nip: e.nip,
                topic: session.topic.clone(),
                start: session.start,
                end: session.end,
                duration: format!("{}", session.duration_hours),
                venue: session.venue.clone(),
                status: "Registered".to_string(),
            });
        }
        info!(session_id, count = employee_ids.len(), "registered (memory)");
        Ok(BackendAck {
            success: true,
            message: Some(format!(
                "{} employee(s) registered for {}",
                employee_ids.len(),
                session.topic
            )),
        })
    }

    async fn import_sessions(&self, rows: &[ImportRow]) -> Result<BackendAck, DomainError> {
        self.enter(BackendOp::ImportSessions).await?;
        let mut store = self.store.write().await;
        for row in rows {
            let id = store.next_session_id;
            store.next_session_id += 1;
            store.sessions.push(TrainingSession {
                id,
                topic: row.topic.clone(),
                start: row.start,
                end: row.end,
                duration_hours: row.duration_hours,
                venue: row.venue.clone(),
                requirement: row.requirement.clone(),
                enrollment: row.enrollment,
            });
        }
        Ok(BackendAck {
            success: true,
            message: Some(format!("{} training schedule(s) imported", rows.len())),
        })
    }

    async fn update_statuses(
        &self,
        updates: &[StatusUpdateRow],
    ) -> Result<BackendAck, DomainError> {
        self.enter(BackendOp::UpdateStatuses).await?;
        let mut store = self.store.write().await;

        let mut targets = Vec::with_capacity(updates.len());
        for u in updates {
            let found = store
                .registrations
                .iter()
                .position(|r| r.name == u.name && r.nip == u.nip && r.topic == u.topic);
            match found {
                Some(i) => targets.push((i, u.status.clone())),
                None => {
                    return Ok(BackendAck {
                        success: false,
                        message: Some(format!(
                            "No registration for {} ({}) on {}",
                            u.name, u.nip, u.topic
                        )),
                    });
                }
            }
        }

        for (i, status) in targets {
            if let Some(status) = status {
                store.registrations[i].status = status;
            }
        }
        Ok(BackendAck {
            success: true,
            message: Some(format!("{} status update(s) applied", updates.len())),
        })
    }

    async fn employee_training_hours(&self) -> Result<Vec<EmployeeHours>, DomainError> {
        self.enter(BackendOp::EmployeeHours).await?;
        let store = self.store.read().await;
        Ok(store
            .completed_hours()
            .into_iter()
            .map(|(e, hours)| EmployeeHours {
                name: e.name.clone(),
                nip: e.nip.clone(),
                department: e.department.clone(),
                position: e.position.clone(),
                hours: Some(hours),
            })
            .collect())
    }

    async fn division_training_hours(&self) -> Result<Option<f64>, DomainError> {
        self.enter(BackendOp::DivisionHours).await?;
        let store = self.store.read().await;
        let hours = store.completed_hours();
        if hours.is_empty() {
            return Ok(None);
        }
        let total: f64 = hours.iter().map(|(_, h)| h).sum();
        Ok(Some(total / hours.len() as f64))
    }

    async fn department_training_hours(&self) -> Result<Vec<DepartmentHours>, DomainError> {
        self.enter(BackendOp::DepartmentHours).await?;
        let store = self.store.read().await;
        // (department, total hours, headcount) in order of first appearance.
        let mut totals: Vec<(&str, f64, usize)> = Vec::new();
        for (e, hours) in store.completed_hours() {
            match totals.iter_mut().find(|(d, _, _)| *d == e.department) {
                Some(entry) => {
                    entry.1 += hours;
                    entry.2 += 1;
                }
                None => totals.push((e.department.as_str(), hours, 1)),
            }
        }
        Ok(totals
            .into_iter()
            .map(|(department, total, count)| DepartmentHours {
                department: department.to_string(),
                hours_per_employee: total / count as f64,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_candidates_match_levels_case_insensitively() {
        let backend = MemoryBackend::with_demo_data(Utc::now());
        let levels = vec!["Worker".to_string(), "staff".to_string()];
        let found = backend.query_candidates("Fire Safety", &levels).await.unwrap();
        let names: Vec<_> = found.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Budi Santoso", "Siti Rahma"]);
        assert_eq!(backend.call_count(BackendOp::QueryCandidates), 1);
    }

    #[tokio::test]
    async fn test_register_then_excluded_from_candidates() {
        let backend = MemoryBackend::with_demo_data(Utc::now());
        let ack = backend.register(1, &[1]).await.unwrap();
        assert!(ack.success);
        let levels = vec!["worker".to_string()];
        let found = backend.query_candidates("Fire Safety", &levels).await.unwrap();
        assert!(found.is_empty());
        assert_eq!(backend.registrations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_register_unknown_session_is_rejected() {
        let backend = MemoryBackend::with_demo_data(Utc::now());
        let ack = backend.register(99, &[1]).await.unwrap();
        assert!(!ack.success);
        assert!(backend.registrations().await.is_empty());
    }

    #[tokio::test]
    async fn test_status_update_is_all_or_nothing() {
        let backend = MemoryBackend::with_demo_data(Utc::now());
        backend.register(1, &[1, 2]).await.unwrap();
        let updates = vec![
            StatusUpdateRow {
                name: "Budi Santoso".into(),
                nip: "10230001".into(),
                topic: "Fire Safety".into(),
                status: Some("Completed".into()),
            },
            StatusUpdateRow {
                name: "Nobody".into(),
                nip: "0".into(),
                topic: "Fire Safety".into(),
                status: Some("Completed".into()),
            },
        ];
        let ack = backend.update_statuses(&updates).await.unwrap();
        assert!(!ack.success);
        assert!(
            backend
                .registrations()
                .await
                .iter()
                .all(|r| r.status == "Registered")
        );
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let backend = MemoryBackend::new();
        backend.fail_with(BackendOp::ListSessions, "connection refused").await;
        let err = backend.list_sessions().await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        backend.clear_failure(BackendOp::ListSessions).await;
        assert!(backend.list_sessions().await.unwrap().is_empty());
        assert_eq!(backend.call_count(BackendOp::ListSessions), 2);
    }

    #[tokio::test]
    async fn test_training_hours_count_completed_only() {
        let backend = MemoryBackend::with_demo_data(Utc::now());
        backend.register(1, &[1, 2]).await.unwrap();
        backend.register(2, &[1]).await.unwrap();
        let updates = vec![StatusUpdateRow {
            name: "Budi Santoso".into(),
            nip: "10230001".into(),
            topic: "Fire Safety".into(),
            status: Some("Completed".into()),
        }];
        assert!(backend.update_statuses(&updates).await.unwrap().success);

        let hours = backend.employee_training_hours().await.unwrap();
        assert_eq!(hours.len(), 7);
        assert_eq!(hours[0].hours, Some(8.0));
        assert_eq!(hours[1].hours, Some(0.0));

        let division = backend.division_training_hours().await.unwrap().unwrap();
        assert!((division - 8.0 / 7.0).abs() < 1e-9);

        let departments = backend.department_training_hours().await.unwrap();
        assert_eq!(departments[0].department, "Production");
        assert_eq!(departments[0].hours_per_employee, 4.0);
        assert_eq!(departments.len(), 5);
        assert_eq!(backend.call_count(BackendOp::DepartmentHours), 1);
    }

    #[tokio::test]
    async fn test_division_hours_without_employees() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.division_training_hours().await.unwrap(), None);
        assert!(backend.department_training_hours().await.unwrap().is_empty());
    }
}
