//! Point-in-time status labels for a patient.

use std::fmt;

use serde::Serialize;

use super::cancel::{run_until_cancelled, CancelFlag};
use super::compliance::latest_risk_sample;
use super::error::{require_id, EngineError, Outcome, UnitFailure};
use super::fanout::fan_out;
use crate::config::EngineConfig;
use crate::gateway::{DataGateway, GatewayError};
use crate::models::{
    Demographics, HealthSample, LabPanel, LabStatus, Patient, Phase, ProfileStatus, RiskLevel,
};

/// All twelve values present on the newest panel, or it is still awaited.
pub fn lab_status(latest: Option<&LabPanel>) -> LabStatus {
    match latest {
        Some(panel) if panel.values.is_complete() => LabStatus::Submitted,
        _ => LabStatus::Awaiting,
    }
}

pub fn profile_status(demographics: &Demographics) -> ProfileStatus {
    let complete = demographics
        .fields()
        .iter()
        .all(|(_, value)| value.is_some_and(|v| !v.trim().is_empty()));
    if complete {
        ProfileStatus::Finalized
    } else {
        ProfileStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    /// Lab data is incomplete, so risk colouring is withheld.
    Blocked,
    Green,
    Yellow,
    Red,
    White,
    Black,
}

impl BadgeTone {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeTone::Blocked => "blocked",
            BadgeTone::Green => "green",
            BadgeTone::Yellow => "yellow",
            BadgeTone::Red => "red",
            BadgeTone::White => "white",
            BadgeTone::Black => "black",
        }
    }

    fn for_risk(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => BadgeTone::Green,
            RiskLevel::Moderate => BadgeTone::Yellow,
            RiskLevel::High => BadgeTone::Red,
            RiskLevel::Ppd => BadgeTone::White,
            RiskLevel::Unknown => BadgeTone::Black,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationBadge {
    pub tone: BadgeTone,
    pub phase: String,
}

impl fmt::Display for ClassificationBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tone.as_str(), self.phase)
    }
}

pub fn classification_badge(
    phase: &Phase,
    lab: LabStatus,
    risk_classification: Option<&str>,
) -> ClassificationBadge {
    let tone = match lab {
        LabStatus::Awaiting => BadgeTone::Blocked,
        LabStatus::Submitted => BadgeTone::for_risk(RiskLevel::classify(risk_classification)),
    };
    ClassificationBadge {
        tone,
        phase: phase.label().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientStatus {
    pub patient_id: String,
    pub lab_status: LabStatus,
    pub profile_status: ProfileStatus,
    pub badge: ClassificationBadge,
}

/// Status from records already fetched for this patient.
pub fn status_from_records(
    patient: &Patient,
    latest_panel: Option<&LabPanel>,
    samples: &[HealthSample],
) -> PatientStatus {
    let lab = lab_status(latest_panel);
    let risk = latest_risk_sample(samples).and_then(|s| s.risk_classification.as_deref());
    PatientStatus {
        patient_id: patient.id.clone(),
        lab_status: lab,
        profile_status: profile_status(&patient.demographics),
        badge: classification_badge(&patient.phase, lab, risk),
    }
}

/// Conservative status for a patient whose lab or sample fetch failed.
/// The profile status needs no fetch and is still derived.
fn degraded_status(patient: &Patient) -> PatientStatus {
    status_from_records(patient, None, &[])
}

async fn fetch_status<G>(gateway: &G, patient: &Patient) -> Result<PatientStatus, GatewayError>
where
    G: DataGateway + ?Sized,
{
    let (latest, samples) = tokio::try_join!(
        gateway.latest_lab_panel(&patient.id),
        gateway.all_health_samples(&patient.id),
    )?;
    Ok(status_from_records(patient, latest.as_ref(), &samples))
}

/// Lab status, profile status and badge for one patient. Transport failures
/// are returned to the caller rather than masked.
pub async fn classify<G>(gateway: &G, patient: &Patient) -> Result<PatientStatus, EngineError>
where
    G: DataGateway + ?Sized,
{
    require_id(&patient.id, "patient")?;
    Ok(fetch_status(gateway, patient).await?)
}

/// Classify a patient list for dashboard tables. Each patient is isolated: a
/// failed fetch yields `Awaiting`/`blocked` for that patient and is reported.
pub async fn classify_all<G>(
    gateway: &G,
    patients: &[Patient],
    config: &EngineConfig,
    cancel: &CancelFlag,
) -> Result<Outcome<Vec<PatientStatus>>, EngineError>
where
    G: DataGateway + ?Sized,
{
    for patient in patients {
        require_id(&patient.id, "patient")?;
    }

    let work = fan_out(
        patients.iter().enumerate(),
        config.max_concurrent_fetches,
        |(index, patient)| async move { (index, fetch_status(gateway, patient).await) },
    );
    let mut gathered = run_until_cancelled(cancel, work).await?;
    gathered.sort_by_key(|(index, _)| *index);

    let mut failures = Vec::new();
    let mut statuses = Vec::with_capacity(gathered.len());
    for (index, result) in gathered {
        let patient = &patients[index];
        match result {
            Ok(status) => statuses.push(status),
            Err(e) => {
                tracing::warn!(
                    patient_id = %patient.id,
                    error = %e,
                    "Status records unavailable, using conservative status"
                );
                failures.push(UnitFailure::patient(&patient.id, &e));
                statuses.push(degraded_status(patient));
            }
        }
    }

    Ok(Outcome {
        value: statuses,
        failures,
    })
}
