//! Read-only query surface the engine consumes.

use async_trait::async_trait;

use super::error::GatewayError;
use crate::models::{Appointment, AppointmentScope, DateWindow, HealthSample, LabPanel, Patient};

/// Source of clinic records. Every method distinguishes "no data" (`Ok` with an
/// empty result) from a failed call (`Err`).
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Patients assigned to any of the given doctors.
    async fn list_patients(&self, doctor_ids: &[String]) -> Result<Vec<Patient>, GatewayError>;

    /// Most recent lab panel by submission date.
    async fn latest_lab_panel(&self, patient_id: &str) -> Result<Option<LabPanel>, GatewayError>;

    /// All lab panels, ascending by submission date.
    async fn all_lab_panels(&self, patient_id: &str) -> Result<Vec<LabPanel>, GatewayError>;

    /// Complete health-sample history in any order.
    async fn all_health_samples(&self, patient_id: &str)
        -> Result<Vec<HealthSample>, GatewayError>;

    /// Appointments in scope whose stored date falls inside `window`, any state.
    async fn all_appointments(
        &self,
        scope: &AppointmentScope,
        window: DateWindow,
    ) -> Result<Vec<Appointment>, GatewayError>;
}
