//! Active appointments for the "today" and "upcoming" dashboard views.
//!
//! The gateway query uses a widened calendar window so that stored timestamps
//! near midnight are never lost to a zone shift on the store side. The
//! authoritative filter is applied here on the date portion of the stored
//! string, so the widening never adds rows to the result.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use crate::config::EngineConfig;
use crate::db::repository::DATE_FORMAT;
use crate::gateway::DataGateway;
use crate::models::{Appointment, AppointmentScope, AppointmentState, DateWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentView {
    Today,
    Upcoming,
}

/// Window sent to the gateway for `view`.
pub fn query_window(view: AppointmentView, today: NaiveDate, config: &EngineConfig) -> DateWindow {
    match view {
        AppointmentView::Today => {
            DateWindow::around(today, config.today_buffer_days, config.today_buffer_days + 1)
        }
        AppointmentView::Upcoming => DateWindow::new(
            today,
            today + Duration::days(i64::from(config.upcoming_window_days)),
        ),
    }
}

/// Keep active appointments matching `view` and order them by stored time.
pub fn filter_view(
    appointments: Vec<Appointment>,
    view: AppointmentView,
    today: NaiveDate,
) -> Vec<Appointment> {
    let today_key = today.format(DATE_FORMAT).to_string();
    let mut kept: Vec<Appointment> = appointments
        .into_iter()
        .filter(|a| a.state.is_active())
        .filter(|a| match view {
            AppointmentView::Today => a.date_key() == today_key,
            AppointmentView::Upcoming => a.date_key() >= today_key.as_str(),
        })
        .collect();
    kept.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
    kept
}

/// Pending and in-queue appointments for `scope` in `view`, relative to
/// `today` in the clinic's time base.
pub async fn resolve_appointments<G>(
    gateway: &G,
    scope: &AppointmentScope,
    view: AppointmentView,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<Vec<Appointment>, EngineError>
where
    G: DataGateway + ?Sized,
{
    if scope.is_blank() {
        return Err(EngineError::InvalidArgument(
            "appointment scope names no secretary or doctor".into(),
        ));
    }

    let window = query_window(view, today, config);
    let fetched = gateway.all_appointments(scope, window).await?;
    let fetched_count = fetched.len();
    let kept = filter_view(fetched, view, today);

    tracing::debug!(
        view = ?view,
        fetched = fetched_count,
        kept = kept.len(),
        "Resolved appointment view"
    );
    Ok(kept)
}

/// Validate a requested state change.
pub fn transition(
    current: AppointmentState,
    next: AppointmentState,
) -> Result<AppointmentState, EngineError> {
    if current.can_transition_to(next) {
        Ok(next)
    } else {
        Err(EngineError::InvalidTransition {
            from: current,
            to: next,
        })
    }
}
