use serde::{Deserialize, Serialize};

use super::enums::AppointmentState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub secretary_id: Option<String>,
    /// Stored verbatim in the clinic's fixed time base, e.g. `2026-10-18 09:30:00`.
    pub scheduled_at: String,
    pub state: AppointmentState,
    pub notes: Option<String>,
}

impl Appointment {
    /// Calendar date portion of `scheduled_at`, taken from the string as stored
    /// without any timezone conversion.
    pub fn date_key(&self) -> &str {
        let raw = self.scheduled_at.trim_start();
        let end = raw.find(|c: char| c == 'T' || c == ' ').unwrap_or(raw.len());
        &raw[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(scheduled: &str) -> Appointment {
        Appointment {
            id: "a-1".into(),
            patient_id: "p-1".into(),
            doctor_id: "d-1".into(),
            secretary_id: None,
            scheduled_at: scheduled.into(),
            state: AppointmentState::Pending,
            notes: None,
        }
    }

    #[test]
    fn date_key_reads_space_and_t_separators() {
        assert_eq!(at("2026-10-18 23:30:00").date_key(), "2026-10-18");
        assert_eq!(at("2026-10-18T00:15:00Z").date_key(), "2026-10-18");
    }

    #[test]
    fn date_only_value_is_its_own_key() {
        assert_eq!(at("2026-10-19").date_key(), "2026-10-19");
    }
}
