//! Compliance categorization over a patient's complete health-sample history.
//!
//! One rule serves both the live evaluator and the historical trend: scan every
//! sample once for glucose, blood pressure and wound-photo evidence, then read
//! the newest recorded risk classification.
//!
//! | metrics submitted | latest risk high | category         |
//! |-------------------|------------------|------------------|
//! | 3                 | any              | `FullCompliance` |
//! | 1–2               | any              | `MissingLogs`    |
//! | 0                 | no / unknown     | `MissingLogs`    |
//! | 0                 | yes              | `NonCompliant`   |

use serde::Serialize;

use super::cancel::{run_until_cancelled, CancelFlag};
use super::error::{require_id, EngineError, Outcome, UnitFailure};
use super::fanout::fan_out;
use crate::config::EngineConfig;
use crate::gateway::DataGateway;
use crate::models::{ComplianceCategory, HealthSample, Patient, RiskLevel};

/// What a patient's sample history shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceEvidence {
    pub has_glucose: bool,
    pub has_blood_pressure: bool,
    pub has_wound_photo: bool,
    /// Newest non-null risk classification, verbatim.
    pub latest_risk: Option<String>,
}

impl ComplianceEvidence {
    pub fn from_samples(samples: &[HealthSample]) -> Self {
        let mut evidence = Self {
            has_glucose: false,
            has_blood_pressure: false,
            has_wound_photo: false,
            latest_risk: latest_risk_sample(samples)
                .and_then(|s| s.risk_classification.clone()),
        };
        for sample in samples {
            evidence.has_glucose |= sample.has_glucose();
            evidence.has_blood_pressure |= sample.has_blood_pressure();
            evidence.has_wound_photo |= sample.has_wound_photo();
        }
        evidence
    }

    pub fn submitted_count(&self) -> u8 {
        [self.has_glucose, self.has_blood_pressure, self.has_wound_photo]
            .iter()
            .filter(|flag| **flag)
            .count() as u8
    }

    pub fn is_high_risk(&self) -> bool {
        RiskLevel::classify(self.latest_risk.as_deref()) == RiskLevel::High
    }

    pub fn category(&self) -> ComplianceCategory {
        match (self.submitted_count(), self.is_high_risk()) {
            (3, _) => ComplianceCategory::FullCompliance,
            (0, true) => ComplianceCategory::NonCompliant,
            _ => ComplianceCategory::MissingLogs,
        }
    }
}

/// Newest sample carrying a risk classification. Equal timestamps resolve to
/// the greatest sample id, so slice order never matters.
pub fn latest_risk_sample(samples: &[HealthSample]) -> Option<&HealthSample> {
    samples
        .iter()
        .filter(|s| s.risk_classification.is_some())
        .max_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        })
}

pub fn categorize_samples(samples: &[HealthSample]) -> ComplianceCategory {
    ComplianceEvidence::from_samples(samples).category()
}

/// Category totals for a cohort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub full: u32,
    pub missing: u32,
    pub non_compliant: u32,
}

impl CategoryCounts {
    pub fn record(&mut self, category: ComplianceCategory) {
        match category {
            ComplianceCategory::FullCompliance => self.full += 1,
            ComplianceCategory::MissingLogs => self.missing += 1,
            ComplianceCategory::NonCompliant => self.non_compliant += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.full + self.missing + self.non_compliant
    }
}

impl FromIterator<ComplianceCategory> for CategoryCounts {
    fn from_iter<I: IntoIterator<Item = ComplianceCategory>>(iter: I) -> Self {
        let mut counts = Self::default();
        for category in iter {
            counts.record(category);
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientCompliance {
    pub patient_id: String,
    pub category: ComplianceCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortCompliance {
    /// Same order as the patients passed in.
    pub patients: Vec<PatientCompliance>,
    pub counts: CategoryCounts,
}

/// One fetch, one categorization. A failed fetch yields `MissingLogs`.
pub(crate) async fn fetch_category<G>(
    gateway: &G,
    patient_id: &str,
) -> (ComplianceCategory, Option<UnitFailure>)
where
    G: DataGateway + ?Sized,
{
    match gateway.all_health_samples(patient_id).await {
        Ok(samples) => {
            let category = categorize_samples(&samples);
            tracing::debug!(
                patient_id,
                samples = samples.len(),
                category = category.as_str(),
                "Compliance evaluated"
            );
            (category, None)
        }
        Err(e) => {
            tracing::warn!(
                patient_id,
                error = %e,
                "Health samples unavailable, defaulting to missing logs"
            );
            (
                ComplianceCategory::MissingLogs,
                Some(UnitFailure::patient(patient_id, &e)),
            )
        }
    }
}

/// Compliance category for one patient from their entire sample history.
pub async fn evaluate_compliance<G>(
    gateway: &G,
    patient_id: &str,
) -> Result<Outcome<ComplianceCategory>, EngineError>
where
    G: DataGateway + ?Sized,
{
    require_id(patient_id, "patient")?;
    let (category, failure) = fetch_category(gateway, patient_id).await;
    Ok(Outcome {
        value: category,
        failures: failure.into_iter().collect(),
    })
}

/// Evaluate every patient concurrently. Per-patient failures never abort the
/// cohort; cancellation returns no result at all.
pub async fn evaluate_cohort<G>(
    gateway: &G,
    patients: &[Patient],
    config: &EngineConfig,
    cancel: &CancelFlag,
) -> Result<Outcome<CohortCompliance>, EngineError>
where
    G: DataGateway + ?Sized,
{
    for patient in patients {
        require_id(&patient.id, "patient")?;
    }

    let work = fan_out(
        patients.iter().enumerate(),
        config.max_concurrent_fetches,
        |(index, patient)| async move {
            let (category, failure) = fetch_category(gateway, &patient.id).await;
            (index, category, failure)
        },
    );
    let mut gathered = run_until_cancelled(cancel, work).await?;
    gathered.sort_by_key(|(index, _, _)| *index);

    let mut failures = Vec::new();
    let mut evaluated = Vec::with_capacity(gathered.len());
    for (index, category, failure) in gathered {
        failures.extend(failure);
        evaluated.push(PatientCompliance {
            patient_id: patients[index].id.clone(),
            category,
        });
    }
    let counts: CategoryCounts = evaluated.iter().map(|p| p.category).collect();

    tracing::info!(
        patients = evaluated.len(),
        full = counts.full,
        missing = counts.missing,
        non_compliant = counts.non_compliant,
        failed = failures.len(),
        "Cohort compliance evaluated"
    );

    Ok(Outcome {
        value: CohortCompliance {
            patients: evaluated,
            counts,
        },
        failures,
    })
}
