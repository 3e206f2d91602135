//! Backend JSON shapes and their mapping to domain entities.
//!
//! Decoding is lenient: missing arrays are empty, numbers may arrive as strings,
//! dates may be RFC 3339, naive date-times, or plain dates.

use crate::domain::{
    DepartmentHours, EmployeeCandidate, EmployeeHours, Enrollment, ImportRow,
    RegistrationRecord, StatusUpdateRow, TrainingSession,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /training`
#[derive(Debug, Deserialize)]
pub struct SessionListResponse {
    #[serde(default)]
    pub training: Vec<SessionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    #[serde(deserialize_with = "i64_lenient")]
    pub id: i64,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub duration: f64,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub requirement: String,
    #[serde(default)]
    pub enrollment: Option<String>,
}

/// `GET /training/registrasi`
#[derive(Debug, Deserialize)]
pub struct RegistrantListResponse {
    #[serde(default)]
    pub regtraining: Vec<RegistrantDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantDto {
    #[serde(deserialize_with = "i64_lenient")]
    pub id: i64,
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub departemen: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub nip: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub duration: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub status: String,
}

/// `POST /training/cek-karyawan`
#[derive(Debug, Default, Deserialize)]
pub struct CandidateListResponse {
    #[serde(default)]
    pub employees: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateDto {
    #[serde(deserialize_with = "i64_lenient")]
    pub id: i64,
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub departemen: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub nip: String,
    #[serde(default, deserialize_with = "i64_lenient")]
    pub grade: i64,
    #[serde(default)]
    pub posisi: String,
}

/// `GET /dashboard/training-hours-employee`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHoursResponse {
    #[serde(default)]
    pub training_hours_employee: Vec<EmployeeHoursDto>,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeHoursDto {
    #[serde(default)]
    pub nama_karyawan: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub nip: String,
    #[serde(default)]
    pub departemen: String,
    #[serde(default)]
    pub posisi: String,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub total_durasi: Option<f64>,
}

/// `GET /dashboard/training-hours-div`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionHoursResponse {
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub train_hours_div: Option<f64>,
}

/// `GET /dashboard/training-hours`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentHoursResponse {
    #[serde(default)]
    pub training_hours_data: Vec<DepartmentHoursDto>,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentHoursDto {
    #[serde(default)]
    pub departemen: String,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub total_durasi_per_karyawan: Option<f64>,
}

/// Write acknowledgement. Import responses may omit `success`.
#[derive(Debug, Default, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CandidateQuery<'a> {
    pub nama_topic: &'a str,
    pub requirement: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct RegistrationRequest<'a> {
    pub id_training: i64,
    pub id_karyawan: &'a [i64],
}

#[derive(Debug, Serialize)]
pub struct ImportRequest {
    pub schedules: Vec<ImportRowDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowDto {
    pub topic: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: f64,
    pub venue: String,
    pub requirement: String,
    pub enrollment: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateRequest {
    pub updates: Vec<StatusUpdateDto>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateDto {
    pub nama: String,
    pub nip: String,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Map a session DTO. Sessions with unreadable dates are dropped with a warning.
pub fn session_to_domain(dto: SessionDto) -> Option<TrainingSession> {
    let (Some(start), Some(end)) = (parse_instant(&dto.start_date), parse_instant(&dto.end_date))
    else {
        warn!(
            id = dto.id,
            start = %dto.start_date,
            end = %dto.end_date,
            "session with unreadable dates skipped"
        );
        return None;
    };
    Some(TrainingSession {
        id: dto.id,
        topic: dto.topic,
        start,
        end,
        duration_hours: dto.duration,
        venue: dto.venue,
        requirement: dto.requirement,
        enrollment: dto
            .enrollment
            .as_deref()
            .map(Enrollment::from_label)
            .unwrap_or_default(),
    })
}

pub fn registrant_to_domain(dto: RegistrantDto) -> Option<RegistrationRecord> {
    let (Some(start), Some(end)) = (parse_instant(&dto.start_date), parse_instant(&dto.end_date))
    else {
        warn!(id = dto.id, "registration with unreadable dates skipped");
        return None;
    };
    Some(RegistrationRecord {
        id: dto.id,
        name: dto.nama,
        department: dto.departemen,
        nip: dto.nip,
        topic: dto.topic,
        start,
        end,
        duration: dto.duration,
        venue: dto.venue,
        status: dto.status,
    })
}

pub fn candidate_to_domain(dto: CandidateDto) -> EmployeeCandidate {
    EmployeeCandidate {
        id: dto.id,
        name: dto.nama,
        department: dto.departemen,
        nip: dto.nip,
        grade: dto.grade,
        position: dto.posisi,
    }
}

pub fn employee_hours_to_domain(dto: EmployeeHoursDto) -> EmployeeHours {
    EmployeeHours {
        name: dto.nama_karyawan,
        nip: dto.nip,
        department: dto.departemen,
        position: dto.posisi,
        hours: dto.total_durasi,
    }
}

/// Departments without a readable figure are dropped with a warning.
pub fn department_hours_to_domain(dto: DepartmentHoursDto) -> Option<DepartmentHours> {
    let Some(hours) = dto.total_durasi_per_karyawan else {
        warn!(department = %dto.departemen, "department hours unreadable, skipped");
        return None;
    };
    Some(DepartmentHours {
        department: dto.departemen,
        hours_per_employee: hours,
    })
}

pub fn import_row_to_dto(row: &ImportRow) -> ImportRowDto {
    ImportRowDto {
        topic: row.topic.clone(),
        start_date: iso_instant(&row.start),
        end_date: iso_instant(&row.end),
        duration: row.duration_hours,
        venue: row.venue.clone(),
        requirement: row.requirement.clone(),
        enrollment: row.enrollment.as_str(),
    }
}

pub fn status_row_to_dto(row: &StatusUpdateRow) -> StatusUpdateDto {
    StatusUpdateDto {
        nama: row.name.clone(),
        nip: row.nip.clone(),
        topic: row.topic.clone(),
        status: row.status.clone(),
    }
}

/// ISO-8601 UTC with milliseconds, e.g. `2025-06-16T00:00:00.000Z`.
pub fn iso_instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a backend date. Naive values are taken as UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Error payloads carry `{ "message": "..." }`; fall back to the raw body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<AckResponse>(body)
        .ok()
        .and_then(|ack| ack.message)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient number/string decoding
// ─────────────────────────────────────────────────────────────────────────────

fn i64_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    match Value::deserialize(de)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| serde::de::Error::custom("integer out of range")),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Value::Null => Ok(0),
        other => Err(serde::de::Error::custom(format!(
            "expected integer, got {other}"
        ))),
    }
}

/// Like `f64_lenient`, but anything unreadable becomes `None` instead of an error.
fn opt_f64_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    let n = match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(n.filter(|v| v.is_finite()))
}

fn f64_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    match Value::deserialize(de)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!(
            "expected number, got {other}"
        ))),
    }
}

fn string_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_list_decodes_mixed_shapes() {
        let body = r#"{
            "training": [
                {"id": 1, "topic": "Fire Safety", "startDate": "2025-06-16T00:00:00.000Z",
                 "endDate": "2025-06-17T00:00:00.000Z", "duration": 8, "venue": "Jakarta",
                 "requirement": "Worker - Staff", "enrollment": "Open"},
                {"id": "2", "topic": "Leadership", "startDate": "2025-07-01",
                 "endDate": "2025-07-02 00:00:00", "duration": "3.5", "venue": "Bandung",
                 "requirement": "Section Head", "enrollment": "Closed"}
            ]
        }"#;
        let resp: SessionListResponse = serde_json::from_str(body).unwrap();
        let sessions: Vec<_> = resp
            .training
            .into_iter()
            .filter_map(session_to_domain)
            .collect();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].duration_hours, 8.0);
        assert_eq!(sessions[1].id, 2);
        assert_eq!(sessions[1].duration_hours, 3.5);
        assert_eq!(sessions[1].enrollment, Enrollment::Closed);
        assert_eq!(
            sessions[1].start,
            Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_array_is_empty() {
        let resp: SessionListResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(resp.training.is_empty());
        let resp: CandidateListResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.employees.is_empty());
    }

    #[test]
    fn test_session_with_bad_date_is_dropped() {
        let dto = SessionDto {
            id: 9,
            topic: "x".into(),
            start_date: "not a date".into(),
            end_date: "2025-01-01".into(),
            duration: 1.0,
            venue: String::new(),
            requirement: String::new(),
            enrollment: None,
        };
        assert!(session_to_domain(dto).is_none());
    }

    #[test]
    fn test_candidate_numeric_nip() {
        let body = r#"{"employees":[{"id":4,"nama":"Budi","departemen":"HR",
            "nip":12345678,"grade":"7","posisi":"staff"}]}"#;
        let resp: CandidateListResponse = serde_json::from_str(body).unwrap();
        let c = candidate_to_domain(resp.employees.into_iter().next().unwrap());
        assert_eq!(c.nip, "12345678");
        assert_eq!(c.grade, 7);
        assert_eq!(c.position, "staff");
    }

    #[test]
    fn test_candidate_grade_beyond_i32_is_kept() {
        let body = r#"{"employees":[{"id":5,"nama":"Siti","grade":4294967296}]}"#;
        let resp: CandidateListResponse = serde_json::from_str(body).unwrap();
        let c = candidate_to_domain(resp.employees.into_iter().next().unwrap());
        assert_eq!(c.grade, 4_294_967_296);
    }

    #[test]
    fn test_import_request_shape() {
        let row = ImportRow {
            topic: "Fire Safety".into(),
            start: Utc.with_ymd_and_hms(2025, 6, 16, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 17, 0, 0, 0).unwrap(),
            duration_hours: 8.0,
            venue: "Jakarta".into(),
            requirement: "Worker - Staff".into(),
            enrollment: Enrollment::Open,
        };
        let req = ImportRequest {
            schedules: vec![import_row_to_dto(&row)],
        };
        let json = serde_json::to_value(&req).unwrap();
        let first = &json["schedules"][0];
        assert_eq!(first["startDate"], "2025-06-16T00:00:00.000Z");
        assert_eq!(first["endDate"], "2025-06-17T00:00:00.000Z");
        assert_eq!(first["enrollment"], "Open");
        assert_eq!(first["duration"], 8.0);
    }

    #[test]
    fn test_status_update_omits_missing_status() {
        let dto = status_row_to_dto(&StatusUpdateRow {
            name: "Budi".into(),
            nip: "123".into(),
            topic: "Fire Safety".into(),
            status: None,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("status").is_none());
        assert_eq!(json["nama"], "Budi");
    }

    #[test]
    fn test_registration_request_shape() {
        let ids = [3, 5];
        let json = serde_json::to_value(RegistrationRequest {
            id_training: 10,
            id_karyawan: &ids,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"id_training": 10, "id_karyawan": [3, 5]}));
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(error_message(r#"{"message":"Topic sudah ada"}"#), "Topic sudah ada");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_employee_hours_decode() {
        let body = r#"{"trainingHoursEmployee":[
            {"id":1,"nama_karyawan":"Budi","nip":"00123","departemen":"Production",
             "posisi":"worker","total_durasi":"12"},
            {"id":2,"nama_karyawan":"Siti","nip":10230002,"total_durasi":null},
            {"id":3,"nama_karyawan":"Agus","total_durasi":"n/a"}
        ]}"#;
        let resp: EmployeeHoursResponse = serde_json::from_str(body).unwrap();
        let rows: Vec<_> = resp
            .training_hours_employee
            .into_iter()
            .map(employee_hours_to_domain)
            .collect();
        assert_eq!(rows[0].nip, "00123");
        assert_eq!(rows[0].hours, Some(12.0));
        assert_eq!(rows[1].nip, "10230002");
        assert_eq!(rows[1].hours, None);
        assert_eq!(rows[2].hours, None);
    }

    #[test]
    fn test_division_hours_string_or_missing() {
        let resp: DivisionHoursResponse =
            serde_json::from_str(r#"{"trainHoursDiv":"7.50"}"#).unwrap();
        assert_eq!(resp.train_hours_div, Some(7.5));
        let resp: DivisionHoursResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.train_hours_div, None);
    }

    #[test]
    fn test_department_hours_skip_unreadable() {
        let body = r#"{"trainingHoursData":[
            {"departemen":"HR","total_durasi_per_karyawan":"4.5"},
            {"departemen":"QA","total_durasi_per_karyawan":"-"}
        ]}"#;
        let resp: DepartmentHoursResponse = serde_json::from_str(body).unwrap();
        let rows: Vec<_> = resp
            .training_hours_data
            .into_iter()
            .filter_map(department_hours_to_domain)
            .collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].department, "HR");
        assert_eq!(rows[0].hours_per_employee, 4.5);
    }
}
