//! Spreadsheet row validation: required columns, typed fields, date normalization.
//!
//! Validation is fail-fast. The first problem aborts the whole workbook and no row
//! of it is ever submitted.

use super::workbook::{CellValue, SheetRow};
use crate::domain::{DomainError, Enrollment, ImportRow, StatusUpdateRow};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta, Utc};

pub const COL_TOPIC: &str = "Topic";
pub const COL_START_DATE: &str = "Start Date";
pub const COL_END_DATE: &str = "End Date";
pub const COL_DURATION: &str = "Duration";
pub const COL_VENUE: &str = "Venue";
pub const COL_REQUIREMENT: &str = "Requirement";

/// Headers a session-import workbook must carry.
pub const IMPORT_COLUMNS: [&str; 6] = [
    COL_TOPIC,
    COL_START_DATE,
    COL_END_DATE,
    COL_DURATION,
    COL_VENUE,
    COL_REQUIREMENT,
];

pub const COL_NAME: &str = "nama";
pub const COL_NIP: &str = "nip";
pub const COL_STATUS_TOPIC: &str = "topic";
pub const COL_STATUS: &str = "status";

/// Headers a status-update workbook must carry. `status` is optional.
pub const STATUS_COLUMNS: [&str; 3] = [COL_NAME, COL_NIP, COL_STATUS_TOPIC];

const TEXT_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
];

const TEXT_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Largest Excel serial day (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Structural check on the first data row: every required column must be present.
pub fn check_required_columns(first: &SheetRow, required: &[&str]) -> Result<(), DomainError> {
    match required.iter().find(|c| !first.has(c)) {
        Some(column) => Err(DomainError::MissingColumn {
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Validate and type one session-import row.
pub fn validate_import_row(row: &SheetRow) -> Result<ImportRow, DomainError> {
    let key = row
        .get(COL_TOPIC)
        .map(CellValue::to_text)
        .unwrap_or_else(|| format!("row {}", row.line));
    let fail = |reason: String| DomainError::RowValidation {
        row: row.line,
        key: key.clone(),
        reason,
    };

    let cell = |column: &str| {
        row.get(column)
            .ok_or_else(|| fail(format!("missing value for '{}'", column)))
    };

    let topic = cell(COL_TOPIC)?.to_text();
    let start_cell = cell(COL_START_DATE)?;
    let end_cell = cell(COL_END_DATE)?;
    let duration_cell = cell(COL_DURATION)?;
    let venue = cell(COL_VENUE)?.to_text();
    let requirement = cell(COL_REQUIREMENT)?.to_text();

    let start = normalize_date(start_cell).ok_or_else(|| {
        fail(format!(
            "invalid date '{}' in '{}'",
            start_cell.to_text(),
            COL_START_DATE
        ))
    })?;
    let end = normalize_date(end_cell).ok_or_else(|| {
        fail(format!(
            "invalid date '{}' in '{}'",
            end_cell.to_text(),
            COL_END_DATE
        ))
    })?;
    let duration_hours = parse_duration(duration_cell).ok_or_else(|| {
        fail(format!(
            "'{}' must be a positive number of hours, got '{}'",
            COL_DURATION,
            duration_cell.to_text()
        ))
    })?;

    Ok(ImportRow {
        topic,
        start,
        end,
        duration_hours,
        venue,
        requirement,
        enrollment: Enrollment::Open,
    })
}

/// Validate one status-update row. `required` lists the columns that must be filled.
pub fn validate_status_row(
    row: &SheetRow,
    required: &[&str],
) -> Result<StatusUpdateRow, DomainError> {
    let text = |column: &str| row.get(column).map(CellValue::to_text);
    let key = match (text(COL_NAME), text(COL_NIP)) {
        (Some(name), Some(nip)) => format!("{} / {}", name, nip),
        (Some(name), None) => name,
        (None, Some(nip)) => nip,
        (None, None) => format!("row {}", row.line),
    };

    if let Some(column) = required.iter().find(|c| !row.has(c)) {
        return Err(DomainError::RowValidation {
            row: row.line,
            key,
            reason: format!("missing value for '{}'", column),
        });
    }

    Ok(StatusUpdateRow {
        name: text(COL_NAME).unwrap_or_default(),
        nip: text(COL_NIP).unwrap_or_default(),
        topic: text(COL_STATUS_TOPIC).unwrap_or_default(),
        status: text(COL_STATUS),
    })
}

/// Column check on the first row, then every row; stops at the first error.
pub fn validate_import_rows(rows: &[SheetRow]) -> Result<Vec<ImportRow>, DomainError> {
    let first = rows.first().ok_or(DomainError::EmptyWorkbook)?;
    check_required_columns(first, &IMPORT_COLUMNS)?;
    rows.iter().map(validate_import_row).collect()
}

pub fn validate_status_rows(rows: &[SheetRow]) -> Result<Vec<StatusUpdateRow>, DomainError> {
    let first = rows.first().ok_or(DomainError::EmptyWorkbook)?;
    check_required_columns(first, &STATUS_COLUMNS)?;
    rows.iter()
        .map(|r| validate_status_row(r, &STATUS_COLUMNS))
        .collect()
}

/// Read a cell as a calendar date in the local calendar, re-expressed as UTC midnight
/// of the same year/month/day so the day survives serialization unchanged.
pub fn normalize_date(cell: &CellValue) -> Option<DateTime<Utc>> {
    let day = match cell {
        CellValue::DateTime(dt) => dt.date(),
        CellValue::Number(n) => excel_serial_to_date(*n)?,
        CellValue::Text(s) => parse_text_date(s)?,
        CellValue::Bool(_) => return None,
    };
    day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

fn parse_text_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    if let Some(dt) = TEXT_DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.date());
    }
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
}

/// Excel serial day number (days since 1899-12-30); the fraction is time of day.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(TimeDelta::days(serial.floor() as i64))
}

fn parse_duration(cell: &CellValue) -> Option<f64> {
    let hours = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(t) => t.trim().replace(',', ".").parse().ok()?,
        _ => return None,
    };
    (hours.is_finite() && hours > 0.0).then_some(hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use std::collections::HashMap;

    fn row(line: usize, cells: &[(&str, CellValue)]) -> SheetRow {
        SheetRow {
            line,
            cells: cells
                .iter()
                .cloned()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn import_row(line: usize, topic: &str, start: CellValue) -> SheetRow {
        row(
            line,
            &[
                (COL_TOPIC, text(topic)),
                (COL_START_DATE, start),
                (COL_END_DATE, text("2025-06-17")),
                (COL_DURATION, CellValue::Number(8.0)),
                (COL_VENUE, text("Jakarta")),
                (COL_REQUIREMENT, text("Worker - Staff")),
            ],
        )
    }

    #[test]
    fn test_valid_import_row() {
        let r = validate_import_row(&import_row(2, "Fire Safety", text("2025-06-16"))).unwrap();
        assert_eq!(r.topic, "Fire Safety");
        assert_eq!(r.start, Utc.with_ymd_and_hms(2025, 6, 16, 0, 0, 0).unwrap());
        assert_eq!(r.end, Utc.with_ymd_and_hms(2025, 6, 17, 0, 0, 0).unwrap());
        assert_eq!(r.duration_hours, 8.0);
        assert_eq!(r.enrollment, Enrollment::Open);
    }

    #[test]
    fn test_spreadsheet_datetime_keeps_calendar_day() {
        let late_evening = NaiveDate::from_ymd_opt(2025, 6, 16)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let d = normalize_date(&CellValue::DateTime(late_evening)).unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2025, 6, 16));
        assert_eq!((d.hour(), d.minute()), (0, 0));
    }

    #[test]
    fn test_excel_serial_date() {
        // 45824 is 2025-06-16 in the 1900 date system.
        let d = normalize_date(&CellValue::Number(45824.0)).unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2025, 6, 16, 0, 0, 0).unwrap());
        assert!(normalize_date(&CellValue::Number(-3.0)).is_none());
    }

    #[test]
    fn test_text_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 16, 0, 0, 0).unwrap();
        for s in ["2025-06-16", "2025/06/16", "06/16/2025", "16 Jun 2025", "2025-06-16 09:00:00"] {
            assert_eq!(normalize_date(&text(s)), Some(expected), "input {s:?}");
        }
    }

    #[test]
    fn test_invalid_date_names_topic() {
        let err = validate_import_row(&import_row(5, "Fire Safety", text("31/31/2025")))
            .unwrap_err();
        match err {
            DomainError::RowValidation { row, key, reason } => {
                assert_eq!(row, 5);
                assert_eq!(key, "Fire Safety");
                assert!(reason.contains("Start Date"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_value_names_column() {
        let mut r = import_row(3, "Fire Safety", text("2025-06-16"));
        r.cells.remove(COL_VENUE);
        let err = validate_import_row(&r).unwrap_err();
        assert!(err.to_string().contains("Venue"));
    }

    #[test]
    fn test_duration_rules() {
        assert_eq!(parse_duration(&text("3,5")), Some(3.5));
        assert_eq!(parse_duration(&CellValue::Number(0.0)), None);
        assert_eq!(parse_duration(&text("eight")), None);
        let mut r = import_row(2, "Fire Safety", text("2025-06-16"));
        r.cells.insert(COL_DURATION.into(), CellValue::Number(-1.0));
        assert!(validate_import_row(&r).is_err());
    }

    #[test]
    fn test_required_columns_checked_on_first_row() {
        let mut first = import_row(2, "Fire Safety", text("2025-06-16"));
        first.cells.remove(COL_VENUE);
        let err = check_required_columns(&first, &IMPORT_COLUMNS).unwrap_err();
        match err {
            DomainError::MissingColumn { column } => assert_eq!(column, "Venue"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_import_rows_fails_fast() {
        let rows = vec![
            import_row(2, "Fire Safety", text("2025-06-16")),
            import_row(3, "Leadership", text("soon")),
            import_row(4, "First Aid", text("also bad")),
        ];
        let err = validate_import_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("Leadership"));
    }

    #[test]
    fn test_status_row() {
        let r = row(
            2,
            &[
                (COL_NAME, text("Budi")),
                (COL_NIP, CellValue::Number(10230001.0)),
                (COL_STATUS_TOPIC, text("Fire Safety")),
                (COL_STATUS, text("Completed")),
            ],
        );
        let s = validate_status_row(&r, &STATUS_COLUMNS).unwrap();
        assert_eq!(s.nip, "10230001");
        assert_eq!(s.status.as_deref(), Some("Completed"));
    }

    #[test]
    fn test_status_row_missing_topic() {
        let r = row(4, &[(COL_NAME, text("Budi")), (COL_NIP, text("1"))]);
        let err = validate_status_row(&r, &STATUS_COLUMNS).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("topic"));
        assert!(msg.contains("Budi / 1"));
    }
}
