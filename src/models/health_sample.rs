use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::RiskLevel;
use super::reading::{lenient_number, lenient_reading, Reading};

/// One periodic measurement record submitted by or for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSample {
    pub id: String,
    pub patient_id: String,
    pub submitted_at: NaiveDateTime,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub blood_glucose: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub systolic: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub diastolic: Option<Reading>,
    #[serde(default)]
    pub wound_photo_url: Option<String>,
    /// Raw classification as stored (`low`, `moderate`, `high`, `ppd`, `unknown`).
    #[serde(default)]
    pub risk_classification: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub risk_score: Option<f64>,
}

impl HealthSample {
    pub fn has_glucose(&self) -> bool {
        self.blood_glucose.is_some()
    }

    /// Either reading alone counts as a blood pressure submission.
    pub fn has_blood_pressure(&self) -> bool {
        self.systolic.is_some() || self.diastolic.is_some()
    }

    pub fn has_wound_photo(&self) -> bool {
        self.wound_photo_url.is_some()
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::classify(self.risk_classification.as_deref())
    }
}
