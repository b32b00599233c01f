//! Patient status and compliance aggregation.
//!
//! All rules are pure functions over records already fetched through a
//! [`DataGateway`](crate::gateway::DataGateway). The async entry points only
//! gather records (fanning out per patient with bounded concurrency) and then
//! hand them to those functions.

pub mod appointments;
pub mod cancel;
pub mod compliance;
pub mod error;
pub mod fanout;
pub mod selection;
pub mod status;
pub mod trends;

#[cfg(test)]
mod test_support;

pub use appointments::{query_window, resolve_appointments, transition, AppointmentView};
pub use cancel::{run_until_cancelled, CancelFlag};
pub use compliance::{
    categorize_samples, evaluate_cohort, evaluate_compliance, CategoryCounts, CohortCompliance,
    ComplianceEvidence, PatientCompliance,
};
pub use error::{EngineError, FailedUnit, Outcome, UnitFailure};
pub use selection::{PhotoLookup, SelectionDebouncer, WoundPhoto};
pub use status::{
    classification_badge, classify, classify_all, lab_status, profile_status, BadgeTone,
    ClassificationBadge, PatientStatus,
};
pub use trends::{
    aggregate_trends, month_buckets, ComplianceTrend, MonthBucket, TrendPoint, TrendReport,
    TrendSeries,
};
