//! Training-hours figures and their classifications.
//!
//! Every employee is expected to reach [`TARGET_HOURS`] of training. Employees are
//! ranked by how urgently they need more; the division is banded by progress.

use std::fmt;

/// Yearly training target per employee, in hours.
pub const TARGET_HOURS: f64 = 14.0;

/// Accumulated training hours of one employee.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeHours {
    pub name: String,
    pub nip: String,
    pub department: String,
    pub position: String,
    /// `None` when the backend sent something that is not a number.
    pub hours: Option<f64>,
}

impl EmployeeHours {
    pub fn priority(&self) -> Option<TrainingPriority> {
        self.hours.and_then(TrainingPriority::classify)
    }
}

/// Average training hours per employee in one department.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentHours {
    pub department: String,
    pub hours_per_employee: f64,
}

/// How urgently an employee needs more training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrainingPriority {
    High,
    Medium,
    Low,
}

impl TrainingPriority {
    /// Classify on whole hours (fractions are dropped): below 7 is high, 7 to 12 is
    /// medium, above 13 is low. Exactly 13 whole hours has no priority, and neither
    /// does a negative or non-finite value.
    pub fn classify(hours: f64) -> Option<Self> {
        if !hours.is_finite() || hours < 0.0 {
            return None;
        }
        match hours.trunc() as u64 {
            0..=6 => Some(Self::High),
            7..=12 => Some(Self::Medium),
            13 => None,
            _ => Some(Self::Low),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for TrainingPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Colour band of the division progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    /// Below 30 %.
    Red,
    /// 30 % up to and including 75 %.
    Yellow,
    /// Above 75 %.
    Green,
}

/// Division hours measured against [`TARGET_HOURS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivisionProgress {
    pub hours: f64,
    /// Share of the target, not capped at 100.
    pub percent: f64,
    pub band: ProgressBand,
}

impl DivisionProgress {
    /// `None` for a non-finite value.
    pub fn from_hours(hours: f64) -> Option<Self> {
        if !hours.is_finite() {
            return None;
        }
        let percent = hours / TARGET_HOURS * 100.0;
        let band = if percent < 30.0 {
            ProgressBand::Red
        } else if percent <= 75.0 {
            ProgressBand::Yellow
        } else {
            ProgressBand::Green
        };
        Some(Self {
            hours,
            percent,
            band,
        })
    }

    /// Percentage rounded to a whole number, for display.
    pub fn rounded_percent(&self) -> i64 {
        self.percent.round() as i64
    }
}
