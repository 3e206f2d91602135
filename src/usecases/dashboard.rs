//! Training-hours dashboard: per-employee priority, division progress and
//! department averages, fetched together.

use crate::domain::{
    DepartmentHours, DivisionProgress, DomainError, EmployeeHours, TrainingPriority,
};
use crate::ports::TrainingBackend;
use std::sync::Arc;
use tracing::info;

/// One load of all three dashboard figures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSnapshot {
    /// Backend order.
    pub employees: Vec<EmployeeHours>,
    /// `None` when the backend had no usable division figure.
    pub division: Option<DivisionProgress>,
    /// Backend order.
    pub departments: Vec<DepartmentHours>,
}

/// Employees per priority. `unclassified` holds those with no priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unclassified: usize,
}

impl DashboardSnapshot {
    pub fn priority_counts(&self) -> PriorityCounts {
        let mut counts = PriorityCounts::default();
        for e in &self.employees {
            match e.priority() {
                Some(TrainingPriority::High) => counts.high += 1,
                Some(TrainingPriority::Medium) => counts.medium += 1,
                Some(TrainingPriority::Low) => counts.low += 1,
                None => counts.unclassified += 1,
            }
        }
        counts
    }

    /// Employees with the given priority, in backend order.
    pub fn with_priority(&self, priority: TrainingPriority) -> Vec<&EmployeeHours> {
        self.employees
            .iter()
            .filter(|e| e.priority() == Some(priority))
            .collect()
    }

    /// Largest department average, used to scale bars. Zero when there is none.
    pub fn max_department_hours(&self) -> f64 {
        self.departments
            .iter()
            .map(|d| d.hours_per_employee)
            .fold(0.0, f64::max)
    }
}

/// Read-only service over the backend's training-hours figures.
pub struct TrainingHoursDashboard {
    backend: Arc<dyn TrainingBackend>,
}

impl TrainingHoursDashboard {
    pub fn new(backend: Arc<dyn TrainingBackend>) -> Self {
        Self { backend }
    }

    /// Fetch the three figures concurrently. Any failure fails the whole load.
    pub async fn load(&self) -> Result<DashboardSnapshot, DomainError> {
        let (employees, division, departments) = tokio::try_join!(
            self.backend.employee_training_hours(),
            self.backend.division_training_hours(),
            self.backend.department_training_hours(),
        )?;
        let division = division.and_then(DivisionProgress::from_hours);
        info!(
            employees = employees.len(),
            departments = departments.len(),
            division_percent = ?division.map(|d| d.rounded_percent()),
            "dashboard loaded"
        );
        Ok(DashboardSnapshot {
            employees,
            division,
            departments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::{BackendOp, MemoryBackend};
    use crate::domain::{ProgressBand, StatusUpdateRow};
    use chrono::Utc;

    fn employee(name: &str, hours: Option<f64>) -> EmployeeHours {
        EmployeeHours {
            name: name.to_string(),
            nip: "1".to_string(),
            department: "Production".to_string(),
            position: "worker".to_string(),
            hours,
        }
    }

    #[test]
    fn test_priority_counts_include_gap_and_unreadable() {
        let snapshot = DashboardSnapshot {
            employees: vec![
                employee("a", Some(2.0)),
                employee("b", Some(9.0)),
                employee("c", Some(13.0)),
                employee("d", Some(20.0)),
                employee("e", None),
                employee("f", Some(6.0)),
            ],
            ..DashboardSnapshot::default()
        };
        assert_eq!(
            snapshot.priority_counts(),
            PriorityCounts {
                high: 2,
                medium: 1,
                low: 1,
                unclassified: 2,
            }
        );
        let names: Vec<&str> = snapshot
            .with_priority(TrainingPriority::High)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["a", "f"]);
    }

    #[test]
    fn test_max_department_hours() {
        let mut snapshot = DashboardSnapshot::default();
        assert_eq!(snapshot.max_department_hours(), 0.0);
        snapshot.departments = vec![
            DepartmentHours {
                department: "HR".into(),
                hours_per_employee: 3.5,
            },
            DepartmentHours {
                department: "QA".into(),
                hours_per_employee: 9.0,
            },
        ];
        assert_eq!(snapshot.max_department_hours(), 9.0);
    }

    #[tokio::test]
    async fn test_load_from_backend() {
        let backend = Arc::new(MemoryBackend::with_demo_data(Utc::now()));
        backend.register(2, &[3, 4]).await.unwrap();
        let updates = vec![StatusUpdateRow {
            name: "Agus Pratama".into(),
            nip: "10230003".into(),
            topic: "Leadership Basics".into(),
            status: Some("Completed".into()),
        }];
        assert!(backend.update_statuses(&updates).await.unwrap().success);

        let dashboard = TrainingHoursDashboard::new(backend.clone());
        let snapshot = dashboard.load().await.unwrap();
        let agus = snapshot
            .employees
            .iter()
            .find(|e| e.name == "Agus Pratama")
            .unwrap();
        assert_eq!(agus.hours, Some(16.0));
        assert_eq!(agus.priority(), Some(TrainingPriority::Low));
        assert_eq!(snapshot.priority_counts().high, 6);

        // 16h over 7 employees is about 2.3h, 16 % of the target.
        let division = snapshot.division.unwrap();
        assert_eq!(division.band, ProgressBand::Red);
        assert_eq!(division.rounded_percent(), 16);
        assert_eq!(snapshot.max_department_hours(), 16.0);

        assert_eq!(backend.call_count(BackendOp::EmployeeHours), 1);
        assert_eq!(backend.call_count(BackendOp::DivisionHours), 1);
        assert_eq!(backend.call_count(BackendOp::DepartmentHours), 1);
    }

    #[tokio::test]
    async fn test_missing_division_figure_is_not_an_error() {
        let dashboard = TrainingHoursDashboard::new(Arc::new(MemoryBackend::new()));
        let snapshot = dashboard.load().await.unwrap();
        assert!(snapshot.division.is_none());
        assert!(snapshot.employees.is_empty());
    }

    #[tokio::test]
    async fn test_any_failure_fails_the_load() {
        let backend = Arc::new(MemoryBackend::with_demo_data(Utc::now()));
        backend
            .fail_with(BackendOp::DepartmentHours, "HTTP 502")
            .await;
        let dashboard = TrainingHoursDashboard::new(backend);
        let err = dashboard.load().await.unwrap_err();
        assert!(matches!(err, DomainError::Transport(ref m) if m.contains("502")));
    }
}
