use rusqlite::types::Value;
use rusqlite::{params, Connection};

use super::{format_datetime, loose_number, loose_reading, parse_datetime};
use crate::db::DatabaseError;
use crate::models::HealthSample;

const SAMPLE_COLUMNS: &str = "id, patient_id, submitted_at, blood_glucose, systolic, diastolic,
     wound_photo_url, risk_classification, risk_score";

pub fn insert_health_sample(conn: &Connection, sample: &HealthSample) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO health_samples ({SAMPLE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            sample.id,
            sample.patient_id,
            format_datetime(&sample.submitted_at),
            sample.blood_glucose,
            sample.systolic,
            sample.diastolic,
            sample.wound_photo_url,
            sample.risk_classification,
            sample.risk_score,
        ],
    )?;
    Ok(())
}

/// Full sample history for a patient, in storage order.
pub fn get_health_samples_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<HealthSample>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SAMPLE_COLUMNS} FROM health_samples
         WHERE patient_id = ?1
         ORDER BY submitted_at ASC, rowid ASC"
    ))?;
    let rows = stmt.query_map(params![patient_id], row_to_health_sample)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn row_to_health_sample(row: &rusqlite::Row) -> Result<HealthSample, rusqlite::Error> {
    let submitted: String = row.get(2)?;

    Ok(HealthSample {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        submitted_at: parse_datetime(2, &submitted)?,
        blood_glucose: loose_reading(row.get::<_, Value>(3)?),
        systolic: loose_reading(row.get::<_, Value>(4)?),
        diastolic: loose_reading(row.get::<_, Value>(5)?),
        wound_photo_url: row.get(6)?,
        risk_classification: row.get(7)?,
        risk_score: loose_number(row.get::<_, Value>(8)?),
    })
}
