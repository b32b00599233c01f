use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection};

use super::{placeholders, DATE_FORMAT};
use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentScope, AppointmentState, DateWindow};

const APPOINTMENT_COLUMNS: &str =
    "id, patient_id, doctor_id, secretary_id, scheduled_at, state, notes";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO appointments ({APPOINTMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ),
        params![
            appt.id,
            appt.patient_id,
            appt.doctor_id,
            appt.secretary_id,
            appt.scheduled_at,
            appt.state.as_str(),
            appt.notes,
        ],
    )?;
    Ok(())
}

/// Appointments in scope whose stored date portion falls inside `window`.
/// Comparison is on the raw `YYYY-MM-DD` prefix; states are not filtered here.
pub fn get_appointments_in_window(
    conn: &Connection,
    scope: &AppointmentScope,
    window: &DateWindow,
) -> Result<Vec<Appointment>, DatabaseError> {
    let start = window.start.format(DATE_FORMAT).to_string();
    let end = window.end.format(DATE_FORMAT).to_string();

    let (scope_clause, mut bind): (String, Vec<String>) = match scope {
        AppointmentScope::Secretary(id) => ("secretary_id = ?3".into(), vec![id.clone()]),
        AppointmentScope::Doctors(ids) => {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            (
                format!("doctor_id IN ({})", placeholders(3, ids.len())),
                ids.clone(),
            )
        }
    };

    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE substr(scheduled_at, 1, 10) BETWEEN ?1 AND ?2
           AND {scope_clause}
         ORDER BY scheduled_at ASC, id ASC"
    );
    let mut values = vec![start, end];
    values.append(&mut bind);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), row_to_appointment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn row_to_appointment(row: &rusqlite::Row) -> Result<Appointment, rusqlite::Error> {
    let state_str: String = row.get(5)?;
    let state = AppointmentState::from_str(&state_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        secretary_id: row.get(3)?,
        scheduled_at: row.get(4)?,
        state,
        notes: row.get(6)?,
    })
}
