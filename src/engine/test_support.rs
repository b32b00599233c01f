//! Fixtures shared by the engine test modules.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::gateway::{DataGateway, GatewayError, InMemoryGateway};
use crate::models::*;

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

pub fn full_demographics() -> Demographics {
    Demographics {
        first_name: Some("Elena".into()),
        last_name: Some("Marquez".into()),
        date_of_birth: Some("1961-02-14".into()),
        contact_number: Some("+1 555 0100".into()),
        email: Some("elena@example.org".into()),
        address: Some("12 Harbour Rd".into()),
        gender: Some("female".into()),
        allergies: Some("none".into()),
        diabetes_type: Some("type 2".into()),
        smoking_status: Some("never".into()),
        emergency_contact: Some("Luis Marquez".into()),
    }
}

pub fn patient(id: &str, doctor: &str, registered_at: NaiveDateTime) -> Patient {
    Patient {
        id: id.into(),
        demographics: full_demographics(),
        phase: Phase::PostOperative,
        doctor_id: Some(doctor.into()),
        registered_at,
    }
}

pub fn full_panel(id: &str, patient_id: &str, date: NaiveDate) -> LabPanel {
    LabPanel {
        id: id.into(),
        patient_id: patient_id.into(),
        submission_date: date,
        values: LabValues::from_numbers([Some(5.0); 12]),
    }
}

pub fn empty_sample(id: &str, patient_id: &str, submitted_at: NaiveDateTime) -> HealthSample {
    HealthSample {
        id: id.into(),
        patient_id: patient_id.into(),
        submitted_at,
        blood_glucose: None,
        systolic: None,
        diastolic: None,
        wound_photo_url: None,
        risk_classification: None,
        risk_score: None,
    }
}

pub fn glucose(id: &str, patient_id: &str, submitted_at: NaiveDateTime) -> HealthSample {
    HealthSample {
        blood_glucose: Some(Reading::Number(128.0)),
        ..empty_sample(id, patient_id, submitted_at)
    }
}

pub fn blood_pressure(id: &str, patient_id: &str, submitted_at: NaiveDateTime) -> HealthSample {
    HealthSample {
        systolic: Some(Reading::Number(138.0)),
        diastolic: Some(Reading::Number(86.0)),
        ..empty_sample(id, patient_id, submitted_at)
    }
}

pub fn wound_photo(id: &str, patient_id: &str, submitted_at: NaiveDateTime) -> HealthSample {
    HealthSample {
        wound_photo_url: Some(format!("photos/{id}.jpg")),
        ..empty_sample(id, patient_id, submitted_at)
    }
}

pub fn risk(id: &str, patient_id: &str, submitted_at: NaiveDateTime, level: &str) -> HealthSample {
    HealthSample {
        risk_classification: Some(level.into()),
        ..empty_sample(id, patient_id, submitted_at)
    }
}

pub fn appointment(id: &str, scheduled_at: &str, state: AppointmentState) -> Appointment {
    Appointment {
        id: id.into(),
        patient_id: "p-1".into(),
        doctor_id: "d-1".into(),
        secretary_id: Some("s-1".into()),
        scheduled_at: scheduled_at.into(),
        state,
        notes: None,
    }
}

/// Wraps an in-memory gateway and fails or stalls selected calls.
#[derive(Default)]
pub struct FlakyGateway {
    pub inner: InMemoryGateway,
    pub fail_listing: bool,
    pub fail_panels: HashSet<String>,
    pub fail_samples: HashSet<String>,
    pub stall_samples: bool,
}

impl FlakyGateway {
    pub fn new(inner: InMemoryGateway) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn failing_samples(mut self, patient_id: &str) -> Self {
        self.fail_samples.insert(patient_id.to_string());
        self
    }

    pub fn failing_panels(mut self, patient_id: &str) -> Self {
        self.fail_panels.insert(patient_id.to_string());
        self
    }

    fn down(what: &str) -> GatewayError {
        GatewayError::Transport(format!("{what} unreachable"))
    }
}

#[async_trait]
impl DataGateway for FlakyGateway {
    async fn list_patients(&self, doctor_ids: &[String]) -> Result<Vec<Patient>, GatewayError> {
        if self.fail_listing {
            return Err(Self::down("patients"));
        }
        self.inner.list_patients(doctor_ids).await
    }

    async fn latest_lab_panel(&self, patient_id: &str) -> Result<Option<LabPanel>, GatewayError> {
        if self.fail_panels.contains(patient_id) {
            return Err(Self::down("lab panels"));
        }
        self.inner.latest_lab_panel(patient_id).await
    }

    async fn all_lab_panels(&self, patient_id: &str) -> Result<Vec<LabPanel>, GatewayError> {
        if self.fail_panels.contains(patient_id) {
            return Err(Self::down("lab panels"));
        }
        self.inner.all_lab_panels(patient_id).await
    }

    async fn all_health_samples(
        &self,
        patient_id: &str,
    ) -> Result<Vec<HealthSample>, GatewayError> {
        if self.stall_samples {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail_samples.contains(patient_id) {
            return Err(Self::down("health samples"));
        }
        self.inner.all_health_samples(patient_id).await
    }

    async fn all_appointments(
        &self,
        scope: &AppointmentScope,
        window: DateWindow,
    ) -> Result<Vec<Appointment>, GatewayError> {
        self.inner.all_appointments(scope, window).await
    }
}
