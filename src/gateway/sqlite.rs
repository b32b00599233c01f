use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use super::error::GatewayError;
use super::traits::DataGateway;
use crate::db::{self, DatabaseError};
use crate::models::{Appointment, AppointmentScope, DateWindow, HealthSample, LabPanel, Patient};

/// Gateway over the clinic SQLite store.
///
/// rusqlite is blocking, so every query runs on tokio's blocking pool behind a
/// shared connection.
#[derive(Clone)]
pub struct SqliteGateway {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteGateway {
    pub fn open(path: &Path) -> Result<Self, GatewayError> {
        Ok(Self::from_connection(db::open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, GatewayError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Synchronous access for seeding and imports.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, GatewayError> {
        let guard = self
            .conn
            .lock()
            .map_err(|_| GatewayError::Transport("connection lock poisoned".into()))?;
        f(&*guard).map_err(GatewayError::from)
    }

    async fn run<T, F>(&self, f: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let gateway = self.clone();
        tokio::task::spawn_blocking(move || gateway.with_connection(f))
            .await
            .map_err(|e| GatewayError::TaskJoin(e.to_string()))?
    }
}

#[async_trait]
impl DataGateway for SqliteGateway {
    async fn list_patients(&self, doctor_ids: &[String]) -> Result<Vec<Patient>, GatewayError> {
        let doctor_ids = doctor_ids.to_vec();
        self.run(move |conn| db::list_patients_for_doctors(conn, &doctor_ids))
            .await
    }

    async fn latest_lab_panel(&self, patient_id: &str) -> Result<Option<LabPanel>, GatewayError> {
        let patient_id = patient_id.to_string();
        self.run(move |conn| db::get_latest_lab_panel(conn, &patient_id))
            .await
    }

    async fn all_lab_panels(&self, patient_id: &str) -> Result<Vec<LabPanel>, GatewayError> {
        let patient_id = patient_id.to_string();
        self.run(move |conn| db::get_lab_panels_for_patient(conn, &patient_id))
            .await
    }

    async fn all_health_samples(
        &self,
        patient_id: &str,
    ) -> Result<Vec<HealthSample>, GatewayError> {
        let patient_id = patient_id.to_string();
        self.run(move |conn| db::get_health_samples_for_patient(conn, &patient_id))
            .await
    }

    async fn all_appointments(
        &self,
        scope: &AppointmentScope,
        window: DateWindow,
    ) -> Result<Vec<Appointment>, GatewayError> {
        let scope = scope.clone();
        self.run(move |conn| db::get_appointments_in_window(conn, &scope, &window))
            .await
    }
}
