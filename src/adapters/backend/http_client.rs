//! HTTP adapter for the training backend. Implements `TrainingBackend` with reqwest.
//!
//! Every call is a single request. Non-2xx responses become `DomainError::Transport`
//! carrying the server's `message` when it sent one; 401 maps to `Unauthorized`.

use super::wire::{
    self, AckResponse, CandidateListResponse, CandidateQuery, DepartmentHoursResponse,
    DivisionHoursResponse, EmployeeHoursResponse, ImportRequest, RegistrantListResponse,
    RegistrationRequest, SessionListResponse, StatusUpdateRequest,
};
use crate::domain::{
    DepartmentHours, DomainError, EmployeeCandidate, EmployeeHours, ImportRow,
    RegistrationRecord, StatusUpdateRow, TrainingSession,
};
use crate::ports::{BackendAck, TrainingBackend};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const SESSIONS_PATH: &str = "/training";
const REGISTRATIONS_PATH: &str = "/training/registrasi";
const CANDIDATES_PATH: &str = "/training/cek-karyawan";
const IMPORT_PATH: &str = "/training/import";
const STATUS_UPDATE_PATH: &str = "/training/registrasi/status";
const EMPLOYEE_HOURS_PATH: &str = "/dashboard/training-hours-employee";
const DIVISION_HOURS_PATH: &str = "/dashboard/training-hours-div";
const DEPARTMENT_HOURS_PATH: &str = "/dashboard/training-hours";

/// reqwest-backed training backend client.
pub struct HttpTrainingBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTrainingBackend {
    /// Create a client.
    ///
    /// # Arguments
    /// * `base_url` - Backend root, e.g. "http://localhost:3000" (trailing slash ignored)
    /// * `token` - Optional bearer token attached to every request
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Transport(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, DomainError> {
        let response = builder
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("{} unreachable: {}", path, e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "backend returned 401");
            return Err(DomainError::Unauthorized);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(path, status = %status, body = %text, "backend returned error");
            return Err(DomainError::Transport(format!(
                "{} ({})",
                wire::error_message(&text),
                status
            )));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DomainError> {
        let response = self.send(self.request(Method::GET, path), path).await?;
        response
            .json()
            .await
            .map_err(|e| {
                DomainError::Transport(format!("Failed to parse {} response: {}", path, e))
            })
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned + Default>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, DomainError> {
        let response = self
            .send(self.request(method, path).json(body), path)
            .await?;
        let text = response
            .text()
            .await
            .map_err(|e| {
                DomainError::Transport(format!("Failed to read {} response: {}", path, e))
            })?;
        if text.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&text).map_err(|e| {
            DomainError::Transport(format!("Failed to parse {} response: {}", path, e))
        })
    }
}

fn ack(resp: AckResponse) -> BackendAck {
    BackendAck {
        // A 2xx without an explicit flag is an acknowledgement.
        success: resp.success.unwrap_or(true),
        message: resp.message,
    }
}

#[async_trait::async_trait]
impl TrainingBackend for HttpTrainingBackend {
    async fn list_sessions(&self) -> Result<Vec<TrainingSession>, DomainError> {
        let resp: SessionListResponse = self.get_json(SESSIONS_PATH).await?;
        let sessions: Vec<_> = resp
            .training
            .into_iter()
            .filter_map(wire::session_to_domain)
            .collect();
        debug!(count = sessions.len(), "fetched sessions");
        Ok(sessions)
    }

    async fn list_registrations(&self) -> Result<Vec<RegistrationRecord>, DomainError> {
        let resp: RegistrantListResponse = self.get_json(REGISTRATIONS_PATH).await?;
        let rows: Vec<_> = resp
            .regtraining
            .into_iter()
            .filter_map(wire::registrant_to_domain)
            .collect();
        debug!(count = rows.len(), "fetched registrations");
        Ok(rows)
    }

    async fn query_candidates(
        &self,
        topic: &str,
        levels: &[String],
    ) -> Result<Vec<EmployeeCandidate>, DomainError> {
        let body = CandidateQuery {
            nama_topic: topic,
            requirement: levels,
        };
        let resp: CandidateListResponse = self
            .send_json(Method::POST, CANDIDATES_PATH, &body)
            .await?;
        Ok(resp
            .employees
            .into_iter()
            .map(wire::candidate_to_domain)
            .collect())
    }

    async fn register(
        &self,
        session_id: i64,
        employee_ids: &[i64],
    ) -> Result<BackendAck, DomainError> {
        let body = RegistrationRequest {
            id_training: session_id,
            id_karyawan: employee_ids,
        };
        let resp: AckResponse = self
            .send_json(Method::POST, REGISTRATIONS_PATH, &body)
            .await?;
        info!(
            session_id,
            employees = employee_ids.len(),
            success = ?resp.success,
            "registration submitted"
        );
        Ok(BackendAck {
            // Registration must confirm explicitly.
            success: resp.success.unwrap_or(false),
            message: resp.message,
        })
    }

    async fn import_sessions(&self, rows: &[ImportRow]) -> Result<BackendAck, DomainError> {
        let body = ImportRequest {
            schedules: rows.iter().map(wire::import_row_to_dto).collect(),
        };
        let resp: AckResponse = self.send_json(Method::POST, IMPORT_PATH, &body).await?;
        info!(rows = rows.len(), "session import submitted");
        Ok(ack(resp))
    }

    async fn update_statuses(
        &self,
        updates: &[StatusUpdateRow],
    ) -> Result<BackendAck, DomainError> {
        let body = StatusUpdateRequest {
            updates: updates.iter().map(wire::status_row_to_dto).collect(),
        };
        let resp: AckResponse = self
            .send_json(Method::PATCH, STATUS_UPDATE_PATH, &body)
            .await?;
        info!(rows = updates.len(), "status update submitted");
        Ok(ack(resp))
    }

    async fn employee_training_hours(&self) -> Result<Vec<EmployeeHours>, DomainError> {
        let resp: EmployeeHoursResponse = self.get_json(EMPLOYEE_HOURS_PATH).await?;
        let rows: Vec<_> = resp
            .training_hours_employee
            .into_iter()
            .map(wire::employee_hours_to_domain)
            .collect();
        debug!(count = rows.len(), "fetched employee training hours");
        Ok(rows)
    }

    async fn division_training_hours(&self) -> Result<Option<f64>, DomainError> {
        let resp: DivisionHoursResponse = self.get_json(DIVISION_HOURS_PATH).await?;
        if resp.train_hours_div.is_none() {
            warn!("division training hours missing or unreadable");
        }
        Ok(resp.train_hours_div)
    }

    async fn department_training_hours(&self) -> Result<Vec<DepartmentHours>, DomainError> {
        let resp: DepartmentHoursResponse = self.get_json(DEPARTMENT_HOURS_PATH).await?;
        Ok(resp
            .training_hours_data
            .into_iter()
            .filter_map(wire::department_hours_to_domain)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trims_trailing_slash() {
        let backend =
            HttpTrainingBackend::new("http://localhost:3000/", None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(backend.url(SESSIONS_PATH), "http://localhost:3000/training");
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let backend = HttpTrainingBackend::new(
            "http://localhost:3000",
            Some(String::new()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(backend.token.is_none());
    }

    #[test]
    fn test_ack_defaults_to_success() {
        let a = ack(AckResponse::default());
        assert!(a.success);
        let a = ack(AckResponse {
            success: Some(false),
            message: Some("duplicate".into()),
        });
        assert!(!a.success);
        assert_eq!(a.message.as_deref(), Some("duplicate"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let backend =
            HttpTrainingBackend::new("http://127.0.0.1:9", None, Duration::from_millis(500))
                .unwrap();
        let err = backend.list_sessions().await.unwrap_err();
        assert_eq!(err.kind(), crate::domain::ErrorKind::Transport);
    }
}
