use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::reading::{lenient_reading, Reading};

/// One batch submission of the required laboratory values.
///
/// Values arrive from free-form entry, so each field is optional. Blank text
/// is a missing value; censored results such as `<3.0` are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabPanel {
    pub id: String,
    pub patient_id: String,
    pub submission_date: NaiveDate,
    #[serde(flatten)]
    pub values: LabValues,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabValues {
    #[serde(default, deserialize_with = "lenient_reading")]
    pub hba1c: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub fasting_glucose: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub creatinine: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub blood_urea_nitrogen: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub egfr: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub ast: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub alt: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub total_cholesterol: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub ldl_cholesterol: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub hdl_cholesterol: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub triglycerides: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub urine_albumin: Option<Reading>,
}

impl LabValues {
    pub const FIELD_NAMES: [&'static str; 12] = [
        "hba1c",
        "fasting_glucose",
        "creatinine",
        "blood_urea_nitrogen",
        "egfr",
        "ast",
        "alt",
        "total_cholesterol",
        "ldl_cholesterol",
        "hdl_cholesterol",
        "triglycerides",
        "urine_albumin",
    ];

    /// Values in `FIELD_NAMES` order.
    pub fn readings(&self) -> [Option<&Reading>; 12] {
        [
            self.hba1c.as_ref(),
            self.fasting_glucose.as_ref(),
            self.creatinine.as_ref(),
            self.blood_urea_nitrogen.as_ref(),
            self.egfr.as_ref(),
            self.ast.as_ref(),
            self.alt.as_ref(),
            self.total_cholesterol.as_ref(),
            self.ldl_cholesterol.as_ref(),
            self.hdl_cholesterol.as_ref(),
            self.triglycerides.as_ref(),
            self.urine_albumin.as_ref(),
        ]
    }

    pub fn from_readings(v: [Option<Reading>; 12]) -> Self {
        let [
            hba1c,
            fasting_glucose,
            creatinine,
            blood_urea_nitrogen,
            egfr,
            ast,
            alt,
            total_cholesterol,
            ldl_cholesterol,
            hdl_cholesterol,
            triglycerides,
            urine_albumin,
        ] = v;
        Self {
            hba1c,
            fasting_glucose,
            creatinine,
            blood_urea_nitrogen,
            egfr,
            ast,
            alt,
            total_cholesterol,
            ldl_cholesterol,
            hdl_cholesterol,
            triglycerides,
            urine_albumin,
        }
    }

    pub fn from_numbers(v: [Option<f64>; 12]) -> Self {
        Self::from_readings(v.map(|n| n.map(Reading::Number)))
    }

    /// Every value present, whether numeric or coded text.
    pub fn is_complete(&self) -> bool {
        self.readings().iter().all(Option::is_some)
    }

    /// Names of fields that are still missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        Self::FIELD_NAMES
            .iter()
            .zip(self.readings())
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect()
    }
}
