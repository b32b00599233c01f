use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::GatewayError;
use super::traits::DataGateway;
use crate::models::{Appointment, AppointmentScope, DateWindow, HealthSample, LabPanel, Patient};

/// Gateway over records already held in memory (exports, fixtures, batch jobs).
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    patients: Vec<Patient>,
    lab_panels: Vec<LabPanel>,
    samples: Vec<HealthSample>,
    appointments: Vec<Appointment>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.patients.push(patient);
        self
    }

    pub fn with_lab_panel(mut self, panel: LabPanel) -> Self {
        self.lab_panels.push(panel);
        self
    }

    pub fn with_sample(mut self, sample: HealthSample) -> Self {
        self.samples.push(sample);
        self
    }

    pub fn with_appointment(mut self, appointment: Appointment) -> Self {
        self.appointments.push(appointment);
        self
    }

    fn panels_ascending(&self, patient_id: &str) -> Vec<LabPanel> {
        let mut panels: Vec<LabPanel> = self
            .lab_panels
            .iter()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for same-day panels.
        panels.sort_by_key(|p| p.submission_date);
        panels
    }
}

fn stored_date(appointment: &Appointment) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(appointment.date_key(), "%Y-%m-%d").ok()
}

fn in_scope(appointment: &Appointment, scope: &AppointmentScope) -> bool {
    match scope {
        AppointmentScope::Secretary(id) => appointment.secretary_id.as_deref() == Some(id.as_str()),
        AppointmentScope::Doctors(ids) => ids.iter().any(|id| *id == appointment.doctor_id),
    }
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn list_patients(&self, doctor_ids: &[String]) -> Result<Vec<Patient>, GatewayError> {
        Ok(self
            .patients
            .iter()
            .filter(|p| {
                p.doctor_id
                    .as_ref()
                    .is_some_and(|d| doctor_ids.iter().any(|id| id == d))
            })
            .cloned()
            .collect())
    }

    async fn latest_lab_panel(&self, patient_id: &str) -> Result<Option<LabPanel>, GatewayError> {
        Ok(self.panels_ascending(patient_id).pop())
    }

    async fn all_lab_panels(&self, patient_id: &str) -> Result<Vec<LabPanel>, GatewayError> {
        Ok(self.panels_ascending(patient_id))
    }

    async fn all_health_samples(
        &self,
        patient_id: &str,
    ) -> Result<Vec<HealthSample>, GatewayError> {
        Ok(self
            .samples
            .iter()
            .filter(|s| s.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn all_appointments(
        &self,
        scope: &AppointmentScope,
        window: DateWindow,
    ) -> Result<Vec<Appointment>, GatewayError> {
        Ok(self
            .appointments
            .iter()
            .filter(|a| in_scope(a, scope))
            .filter(|a| stored_date(a).is_some_and(|d| window.contains(d)))
            .cloned()
            .collect())
    }
}
