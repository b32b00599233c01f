use rusqlite::{params, params_from_iter, Connection};

use super::{format_datetime, parse_datetime, placeholders};
use crate::db::DatabaseError;
use crate::models::{Demographics, Patient, Phase};

const PATIENT_COLUMNS: &str = "id, first_name, last_name, date_of_birth, contact_number, email,
     address, gender, allergies, diabetes_type, smoking_status, emergency_contact,
     phase, doctor_id, registered_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let d = &patient.demographics;
    conn.execute(
        &format!(
            "INSERT INTO patients ({PATIENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            patient.id,
            d.first_name,
            d.last_name,
            d.date_of_birth,
            d.contact_number,
            d.email,
            d.address,
            d.gender,
            d.allergies,
            d.diabetes_type,
            d.smoking_status,
            d.emergency_contact,
            patient.phase.as_stored(),
            patient.doctor_id,
            format_datetime(&patient.registered_at),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &str) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id], row_to_patient)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Patients assigned to any of the given doctors, oldest registration first.
/// An empty doctor list selects nobody.
pub fn list_patients_for_doctors(
    conn: &Connection,
    doctor_ids: &[String],
) -> Result<Vec<Patient>, DatabaseError> {
    if doctor_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {PATIENT_COLUMNS} FROM patients
         WHERE doctor_id IN ({})
         ORDER BY registered_at ASC, id ASC",
        placeholders(1, doctor_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(doctor_ids.iter()), row_to_patient)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn row_to_patient(row: &rusqlite::Row) -> Result<Patient, rusqlite::Error> {
    let phase: String = row.get(12)?;
    let registered: String = row.get(14)?;

    Ok(Patient {
        id: row.get(0)?,
        demographics: Demographics {
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            date_of_birth: row.get(3)?,
            contact_number: row.get(4)?,
            email: row.get(5)?,
            address: row.get(6)?,
            gender: row.get(7)?,
            allergies: row.get(8)?,
            diabetes_type: row.get(9)?,
            smoking_status: row.get(10)?,
            emergency_contact: row.get(11)?,
        },
        phase: Phase::from(phase),
        doctor_id: row.get(13)?,
        registered_at: parse_datetime(14, &registered)?,
    })
}
