//! Monthly trend series over a doctor's patient panel.
//!
//! Every series has one point per calendar month, oldest first, ending with the
//! month containing `now`. Months with no data are present with a zero count.
//!
//! The compliance series takes the cohort registered in each month and
//! categorizes those patients on their entire sample history, so it describes
//! the current standing of a historical cohort rather than that month's
//! activity.

use std::collections::HashSet;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::cancel::{run_until_cancelled, CancelFlag};
use super::compliance::categorize_samples;
use super::error::{require_id, EngineError, Outcome, UnitFailure};
use super::fanout::fan_out;
use crate::config::EngineConfig;
use crate::gateway::{DataGateway, GatewayError};
use crate::models::{ComplianceCategory, HealthSample, LabPanel, Patient};

/// One calendar month, `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// `YYYY-MM`
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthBucket {
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.contains_date(at.date())
    }
}

/// `months` consecutive buckets ending with the month of `now`.
pub fn month_buckets(now: NaiveDate, months: u32) -> Result<Vec<MonthBucket>, EngineError> {
    if months == 0 {
        return Err(EngineError::InvalidArgument(
            "trend needs at least one month".into(),
        ));
    }
    let current = now.with_day(1).ok_or_else(|| {
        EngineError::InvalidArgument(format!("cannot take month start of {now}"))
    })?;
    let oldest = current
        .checked_sub_months(Months::new(months - 1))
        .ok_or_else(|| EngineError::InvalidArgument(format!("{months} months before {now}")))?;

    let mut buckets = Vec::with_capacity(months as usize);
    let mut start = oldest;
    for _ in 0..months {
        let end = start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| EngineError::InvalidArgument(format!("month after {start}")))?;
        buckets.push(MonthBucket {
            label: format!("{:04}-{:02}", start.year(), start.month()),
            start,
            end,
        });
        start = end;
    }
    Ok(buckets)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub count: u32,
}

pub type TrendSeries = Vec<TrendPoint>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceTrend {
    pub full: TrendSeries,
    pub missing: TrendSeries,
    pub non_compliant: TrendSeries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendReport {
    pub registrations: TrendSeries,
    pub lab_submissions: TrendSeries,
    pub compliance: ComplianceTrend,
}

impl TrendReport {
    /// Every point zero.
    pub fn empty(buckets: &[MonthBucket]) -> Self {
        let zeros = || series(buckets, |_| 0);
        Self {
            registrations: zeros(),
            lab_submissions: zeros(),
            compliance: ComplianceTrend {
                full: zeros(),
                missing: zeros(),
                non_compliant: zeros(),
            },
        }
    }
}

fn series(buckets: &[MonthBucket], count: impl Fn(&MonthBucket) -> u32) -> TrendSeries {
    buckets
        .iter()
        .map(|bucket| TrendPoint {
            label: bucket.label.clone(),
            count: count(bucket),
        })
        .collect()
}

pub fn registration_series(buckets: &[MonthBucket], patients: &[Patient]) -> TrendSeries {
    series(buckets, |bucket| {
        patients
            .iter()
            .filter(|p| bucket.contains(p.registered_at))
            .count() as u32
    })
}

/// Distinct patients with at least one panel submitted in each month.
pub fn lab_submission_series(buckets: &[MonthBucket], panels: &[LabPanel]) -> TrendSeries {
    series(buckets, |bucket| {
        panels
            .iter()
            .filter(|panel| bucket.contains_date(panel.submission_date))
            .map(|panel| panel.patient_id.as_str())
            .collect::<HashSet<_>>()
            .len() as u32
    })
}

/// Category tallies per registration-month cohort.
pub fn compliance_series(
    buckets: &[MonthBucket],
    cohort: &[(NaiveDateTime, ComplianceCategory)],
) -> ComplianceTrend {
    let tally = |category: ComplianceCategory| {
        series(buckets, |bucket| {
            cohort
                .iter()
                .filter(|(registered_at, c)| *c == category && bucket.contains(*registered_at))
                .count() as u32
        })
    };
    ComplianceTrend {
        full: tally(ComplianceCategory::FullCompliance),
        missing: tally(ComplianceCategory::MissingLogs),
        non_compliant: tally(ComplianceCategory::NonCompliant),
    }
}

/// Records fetched for one patient. Samples are only fetched for patients in a
/// trend cohort.
struct PatientHistory {
    index: usize,
    panels: Result<Vec<LabPanel>, GatewayError>,
    samples: Option<Result<Vec<HealthSample>, GatewayError>>,
}

async fn fetch_history<G>(
    gateway: &G,
    index: usize,
    patient: &Patient,
    in_cohort: bool,
) -> PatientHistory
where
    G: DataGateway + ?Sized,
{
    let panels = gateway.all_lab_panels(&patient.id);
    if in_cohort {
        let (panels, samples) = tokio::join!(panels, gateway.all_health_samples(&patient.id));
        PatientHistory {
            index,
            panels,
            samples: Some(samples),
        }
    } else {
        PatientHistory {
            index,
            panels: panels.await,
            samples: None,
        }
    }
}

/// Registration, lab-submission and compliance series for the patients of
/// `doctor_ids`.
///
/// A failed patient listing yields an all-zero report with every month
/// flagged. A failed per-patient fetch only affects that patient: a sample
/// failure counts it as `MissingLogs`, a panel failure leaves it out of the
/// lab series.
pub async fn aggregate_trends<G>(
    gateway: &G,
    doctor_ids: &[String],
    months: u32,
    now: NaiveDateTime,
    config: &EngineConfig,
    cancel: &CancelFlag,
) -> Result<Outcome<TrendReport>, EngineError>
where
    G: DataGateway + ?Sized,
{
    for id in doctor_ids {
        require_id(id, "doctor")?;
    }
    let buckets = month_buckets(now.date(), months)?;

    let patients = match run_until_cancelled(cancel, gateway.list_patients(doctor_ids)).await? {
        Ok(patients) => patients,
        Err(e) => {
            tracing::warn!(error = %e, "Patient listing failed, trend months zeroed");
            let failures = buckets
                .iter()
                .map(|bucket| UnitFailure::month(&bucket.label, &e))
                .collect();
            return Ok(Outcome {
                value: TrendReport::empty(&buckets),
                failures,
            });
        }
    };

    let window_start = buckets.first().map(|b| b.start);
    let window_end = buckets.last().map(|b| b.end);
    let in_window = |p: &Patient| {
        let day = p.registered_at.date();
        window_start.is_some_and(|s| day >= s) && window_end.is_some_and(|e| day < e)
    };

    let work = fan_out(
        patients.iter().enumerate(),
        config.max_concurrent_fetches,
        |(index, patient)| fetch_history(gateway, index, patient, in_window(patient)),
    );
    let mut histories = run_until_cancelled(cancel, work).await?;
    histories.sort_by_key(|h| h.index);

    let mut failures = Vec::new();
    let mut panels = Vec::new();
    let mut cohort = Vec::new();
    let mut failed_patients = HashSet::new();

    for history in histories {
        let patient = &patients[history.index];
        match history.panels {
            Ok(mut found) => panels.append(&mut found),
            Err(e) => {
                tracing::warn!(
                    patient_id = %patient.id,
                    error = %e,
                    "Lab panels unavailable for trend"
                );
                failures.push(UnitFailure::patient(&patient.id, &e));
                failed_patients.insert(history.index);
            }
        }
        match history.samples {
            None => {}
            Some(Ok(samples)) => {
                cohort.push((patient.registered_at, categorize_samples(&samples)));
            }
            Some(Err(e)) => {
                tracing::warn!(
                    patient_id = %patient.id,
                    error = %e,
                    "Samples unavailable for trend"
                );
                if failed_patients.insert(history.index) {
                    failures.push(UnitFailure::patient(&patient.id, &e));
                }
                cohort.push((patient.registered_at, ComplianceCategory::MissingLogs));
            }
        }
    }

    let report = TrendReport {
        registrations: registration_series(&buckets, &patients),
        lab_submissions: lab_submission_series(&buckets, &panels),
        compliance: compliance_series(&buckets, &cohort),
    };

    tracing::info!(
        patients = patients.len(),
        cohort = cohort.len(),
        months = buckets.len(),
        failed = failures.len(),
        "Trend aggregation complete"
    );

    Ok(Outcome {
        value: report,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;
    use crate::gateway::InMemoryGateway;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn counts(series: &TrendSeries) -> Vec<u32> {
        series.iter().map(|p| p.count).collect()
    }

    fn doctors() -> Vec<String> {
        vec!["d-1".to_string()]
    }

    fn now() -> NaiveDateTime {
        at(2026, 10, 18, 12)
    }

    async fn six_month_report<G>(gateway: &G) -> Outcome<TrendReport>
    where
        G: DataGateway + ?Sized,
    {
        aggregate_trends(
            gateway,
            &doctors(),
            6,
            now(),
            &EngineConfig::default(),
            &CancelFlag::new(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn six_buckets_end_with_current_month() {
        let buckets = month_buckets(day(2026, 10, 18), 6).unwrap();
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["2026-05", "2026-06", "2026-07", "2026-08", "2026-09", "2026-10"]);
        assert_eq!(buckets[5].end, day(2026, 11, 1));
    }

    #[test]
    fn buckets_cross_year_boundary() {
        let buckets = month_buckets(day(2026, 2, 28), 3).unwrap();
        assert_eq!(buckets[0].label, "2025-12");
        assert_eq!(buckets[0].end, day(2026, 1, 1));
        assert_eq!(buckets[2].end, day(2026, 3, 1));
    }

    #[test]
    fn zero_months_is_invalid() {
        assert!(matches!(
            month_buckets(day(2026, 10, 18), 0),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn month_bounds_are_half_open() {
        let buckets = month_buckets(day(2026, 10, 18), 2).unwrap();
        assert!(buckets[0].contains(at(2026, 9, 30, 23)));
        assert!(!buckets[0].contains(at(2026, 10, 1, 0)));
        assert!(buckets[1].contains(at(2026, 10, 1, 0)));
    }

    #[test]
    fn patient_counted_once_per_month_with_panels() {
        let buckets = month_buckets(day(2026, 10, 18), 6).unwrap();
        let panels = vec![
            full_panel("l-1", "p-1", day(2026, 9, 2)),
            full_panel("l-2", "p-1", day(2026, 9, 20)),
            full_panel("l-3", "p-2", day(2026, 9, 21)),
            full_panel("l-4", "p-1", day(2026, 10, 1)),
            full_panel("l-5", "p-3", day(2026, 1, 1)),
        ];
        assert_eq!(counts(&lab_submission_series(&buckets, &panels)), [0, 0, 0, 0, 2, 1]);
    }

    #[tokio::test]
    async fn empty_panel_yields_full_zero_series() {
        let gateway = InMemoryGateway::new();
        let outcome = six_month_report(&gateway).await;

        let report = outcome.value;
        assert_eq!(counts(&report.registrations), [0; 6]);
        assert_eq!(counts(&report.lab_submissions), [0; 6]);
        assert_eq!(counts(&report.compliance.full), [0; 6]);
        assert_eq!(counts(&report.compliance.missing), [0; 6]);
        assert_eq!(counts(&report.compliance.non_compliant), [0; 6]);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn cohort_uses_entire_sample_history() {
        // Registered in May; metrics arrive later, in different months.
        let gateway = InMemoryGateway::new()
            .with_patient(patient("p-may", "d-1", at(2026, 5, 10, 9)))
            .with_patient(patient("p-sep", "d-1", at(2026, 9, 3, 9)))
            .with_patient(patient("p-other", "d-2", at(2026, 9, 3, 9)))
            .with_patient(patient("p-old", "d-1", at(2025, 1, 3, 9)))
            .with_sample(glucose("s-1", "p-may", at(2026, 6, 1, 8)))
            .with_sample(blood_pressure("s-2", "p-may", at(2026, 8, 1, 8)))
            .with_sample(wound_photo("s-3", "p-may", at(2026, 10, 1, 8)))
            .with_sample(risk("s-4", "p-sep", at(2026, 9, 4, 8), "high"))
            .with_lab_panel(full_panel("l-1", "p-old", day(2026, 7, 7)));

        let outcome = six_month_report(&gateway).await;
        let report = outcome.value;

        assert_eq!(counts(&report.registrations), [1, 0, 0, 0, 1, 0]);
        assert_eq!(counts(&report.lab_submissions), [0, 0, 1, 0, 0, 0]);
        assert_eq!(counts(&report.compliance.full), [1, 0, 0, 0, 0, 0]);
        assert_eq!(counts(&report.compliance.missing), [0; 6]);
        assert_eq!(counts(&report.compliance.non_compliant), [0, 0, 0, 0, 1, 0]);
    }

    #[tokio::test]
    async fn compliance_points_sum_to_registrations() {
        let gateway = InMemoryGateway::new()
            .with_patient(patient("p-1", "d-1", at(2026, 7, 1, 9)))
            .with_patient(patient("p-2", "d-1", at(2026, 7, 2, 9)))
            .with_patient(patient("p-3", "d-1", at(2026, 7, 3, 9)))
            .with_sample(glucose("s-1", "p-1", at(2026, 7, 5, 9)));

        let report = six_month_report(&gateway).await.value;

        for i in 0..6 {
            let sum = report.compliance.full[i].count
                + report.compliance.missing[i].count
                + report.compliance.non_compliant[i].count;
            assert_eq!(sum, report.registrations[i].count);
        }
    }

    #[tokio::test]
    async fn listing_failure_zeroes_every_month() {
        let mut gateway = FlakyGateway::new(InMemoryGateway::new());
        gateway.fail_listing = true;

        let outcome = six_month_report(&gateway).await;

        assert_eq!(counts(&outcome.value.registrations), [0; 6]);
        assert_eq!(outcome.failures.len(), 6);
        assert_eq!(
            outcome.failures[0].unit,
            crate::engine::FailedUnit::Month("2026-05".into())
        );
    }

    #[tokio::test]
    async fn patient_failures_are_isolated() {
        let inner = InMemoryGateway::new()
            .with_patient(patient("p-ok", "d-1", at(2026, 8, 1, 9)))
            .with_patient(patient("p-nosamples", "d-1", at(2026, 8, 2, 9)))
            .with_patient(patient("p-nopanels", "d-1", at(2026, 8, 3, 9)))
            .with_sample(glucose("s-1", "p-ok", at(2026, 8, 5, 9)))
            .with_sample(blood_pressure("s-2", "p-ok", at(2026, 8, 5, 9)))
            .with_sample(wound_photo("s-3", "p-ok", at(2026, 8, 5, 9)))
            .with_sample(glucose("s-4", "p-nosamples", at(2026, 8, 5, 9)))
            .with_sample(blood_pressure("s-5", "p-nosamples", at(2026, 8, 5, 9)))
            .with_sample(wound_photo("s-6", "p-nosamples", at(2026, 8, 5, 9)))
            .with_lab_panel(full_panel("l-1", "p-ok", day(2026, 8, 6)))
            .with_lab_panel(full_panel("l-2", "p-nopanels", day(2026, 8, 6)));
        let gateway = FlakyGateway::new(inner)
            .failing_samples("p-nosamples")
            .failing_panels("p-nopanels");

        let outcome = six_month_report(&gateway).await;
        let report = outcome.value;

        assert_eq!(counts(&report.registrations), [0, 0, 0, 3, 0, 0]);
        assert_eq!(counts(&report.lab_submissions), [0, 0, 0, 1, 0, 0]);
        assert_eq!(counts(&report.compliance.full), [0, 0, 0, 1, 0, 0]);
        assert_eq!(counts(&report.compliance.missing), [0, 0, 0, 2, 0, 0]);
        assert_eq!(outcome.failures.len(), 2);
    }

    #[tokio::test]
    async fn blank_doctor_id_is_rejected() {
        let gateway = InMemoryGateway::new();
        let result = aggregate_trends(
            &gateway,
            &["".to_string()],
            6,
            now(),
            &EngineConfig::default(),
            &CancelFlag::new(),
        )
        .await;
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn cancelled_aggregation_publishes_nothing() {
        let inner = InMemoryGateway::new().with_patient(patient("p-1", "d-1", at(2026, 9, 1, 9)));
        let mut gateway = FlakyGateway::new(inner);
        gateway.stall_samples = true;
        let cancel = CancelFlag::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let config = EngineConfig::default();
        let result = aggregate_trends(&gateway, &doctors(), 6, now(), &config, &cancel).await;
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[tokio::test]
    async fn identical_input_identical_report() {
        let gateway = InMemoryGateway::new()
            .with_patient(patient("p-1", "d-1", at(2026, 6, 1, 9)))
            .with_patient(patient("p-2", "d-1", at(2026, 10, 2, 9)))
            .with_sample(risk("s-1", "p-2", at(2026, 10, 3, 9), "HIGH"));
        let config = EngineConfig {
            max_concurrent_fetches: 1,
            ..EngineConfig::default()
        };

        let first = aggregate_trends(&gateway, &doctors(), 6, now(), &config, &CancelFlag::new())
            .await
            .unwrap();
        let second = six_month_report(&gateway).await;
        assert_eq!(first, second);
    }
}
