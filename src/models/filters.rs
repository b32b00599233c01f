use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar-date window used for appointment queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[center - before, center + after]`
    pub fn around(center: NaiveDate, before: u32, after: u32) -> Self {
        Self {
            start: center - Duration::days(i64::from(before)),
            end: center + Duration::days(i64::from(after)),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Whose appointments a view lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "ids")]
pub enum AppointmentScope {
    Secretary(String),
    Doctors(Vec<String>),
}

impl AppointmentScope {
    /// True when the scope names no usable identifier.
    pub fn is_blank(&self) -> bool {
        match self {
            AppointmentScope::Secretary(id) => id.trim().is_empty(),
            AppointmentScope::Doctors(ids) => ids.iter().all(|id| id.trim().is_empty()),
        }
    }
}
