use rusqlite::types::Value;
use rusqlite::{params, Connection};

use super::{loose_reading, parse_date, DATE_FORMAT};
use crate::db::DatabaseError;
use crate::models::{LabPanel, LabValues, Reading};

const LAB_COLUMNS: &str = "id, patient_id, submission_date,
     hba1c, fasting_glucose, creatinine, blood_urea_nitrogen, egfr, ast, alt,
     total_cholesterol, ldl_cholesterol, hdl_cholesterol, triglycerides, urine_albumin";

pub fn insert_lab_panel(conn: &Connection, panel: &LabPanel) -> Result<(), DatabaseError> {
    let v = &panel.values;
    conn.execute(
        &format!(
            "INSERT INTO lab_panels ({LAB_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            panel.id,
            panel.patient_id,
            panel.submission_date.format(DATE_FORMAT).to_string(),
            v.hba1c,
            v.fasting_glucose,
            v.creatinine,
            v.blood_urea_nitrogen,
            v.egfr,
            v.ast,
            v.alt,
            v.total_cholesterol,
            v.ldl_cholesterol,
            v.hdl_cholesterol,
            v.triglycerides,
            v.urine_albumin,
        ],
    )?;
    Ok(())
}

/// Most recent panel by submission date. Ties resolve to the last inserted row.
pub fn get_latest_lab_panel(
    conn: &Connection,
    patient_id: &str,
) -> Result<Option<LabPanel>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LAB_COLUMNS} FROM lab_panels
         WHERE patient_id = ?1
         ORDER BY submission_date DESC, rowid DESC
         LIMIT 1"
    ))?;
    let mut rows = stmt.query_map(params![patient_id], row_to_lab_panel)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Every panel for a patient, oldest submission first.
pub fn get_lab_panels_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<LabPanel>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LAB_COLUMNS} FROM lab_panels
         WHERE patient_id = ?1
         ORDER BY submission_date ASC, rowid ASC"
    ))?;
    let rows = stmt.query_map(params![patient_id], row_to_lab_panel)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn row_to_lab_panel(row: &rusqlite::Row) -> Result<LabPanel, rusqlite::Error> {
    let submitted: String = row.get(2)?;
    let mut values: [Option<Reading>; 12] = Default::default();
    for (i, slot) in values.iter_mut().enumerate() {
        *slot = loose_reading(row.get::<_, Value>(3 + i)?);
    }

    Ok(LabPanel {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        submission_date: parse_date(2, &submitted)?,
        values: LabValues::from_readings(values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::engine::lab_status;
    use crate::models::{Demographics, LabStatus, Patient, Phase};
    use chrono::NaiveDate;

    fn test_db() -> Connection {
        let conn = open_memory_database().unwrap();
        insert_patient(
            &conn,
            &Patient {
                id: "p-1".into(),
                demographics: Demographics::default(),
                phase: Phase::PostOperative,
                doctor_id: Some("d-1".into()),
                registered_at: NaiveDate::from_ymd_opt(2026, 1, 5)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            },
        )
        .unwrap();
        conn
    }

    fn make_panel(id: &str, month: u32, day: u32) -> LabPanel {
        LabPanel {
            id: id.into(),
            patient_id: "p-1".into(),
            submission_date: NaiveDate::from_ymd_opt(2026, month, day).unwrap(),
            values: LabValues::from_numbers([Some(4.2); 12]),
        }
    }

    #[test]
    fn latest_picks_newest_submission() {
        let conn = test_db();
        insert_lab_panel(&conn, &make_panel("lab-new", 6, 10)).unwrap();
        insert_lab_panel(&conn, &make_panel("lab-old", 2, 1)).unwrap();

        let latest = get_latest_lab_panel(&conn, "p-1").unwrap().unwrap();
        assert_eq!(latest.id, "lab-new");
    }

    #[test]
    fn latest_returns_none_for_empty() {
        let conn = test_db();
        assert!(get_latest_lab_panel(&conn, "p-1").unwrap().is_none());
    }

    #[test]
    fn all_panels_ascending() {
        let conn = test_db();
        insert_lab_panel(&conn, &make_panel("b", 4, 1)).unwrap();
        insert_lab_panel(&conn, &make_panel("a", 3, 1)).unwrap();
        insert_lab_panel(&conn, &make_panel("c", 5, 1)).unwrap();

        let ids: Vec<String> = get_lab_panels_for_patient(&conn, "p-1")
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn blank_text_column_reads_as_missing() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO lab_panels (id, patient_id, submission_date, hba1c, creatinine, egfr)
             VALUES ('raw', 'p-1', '2026-07-01', '6.8', '', 91)",
            [],
        )
        .unwrap();

        let panel = get_latest_lab_panel(&conn, "p-1").unwrap().unwrap();
        assert_eq!(panel.values.hba1c, Some(Reading::Number(6.8)));
        assert_eq!(panel.values.creatinine, None);
        assert_eq!(panel.values.egfr, Some(Reading::Number(91.0)));
        assert_eq!(panel.values.missing_fields().len(), 10);
    }

    #[test]
    fn censored_value_completes_stored_panel() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO lab_panels (id, patient_id, submission_date,
                 hba1c, fasting_glucose, creatinine, blood_urea_nitrogen, egfr, ast, alt,
                 total_cholesterol, ldl_cholesterol, hdl_cholesterol, triglycerides,
                 urine_albumin)
             VALUES ('censored', 'p-1', '2026-07-01',
                 6.1, 98, 0.9, 14, 91, 22, 25, 180, 100, 55, 120, '<3.0')",
            [],
        )
        .unwrap();

        let panel = get_latest_lab_panel(&conn, "p-1").unwrap().unwrap();
        assert_eq!(panel.values.urine_albumin, Some(Reading::Text("<3.0".into())));
        assert!(panel.values.is_complete());
        assert_eq!(lab_status(Some(&panel)), LabStatus::Submitted);
    }

    #[test]
    fn coded_reading_survives_insert() {
        let conn = test_db();
        let mut panel = make_panel("coded", 8, 2);
        panel.values.ast = Some(Reading::Text("N/A".into()));
        insert_lab_panel(&conn, &panel).unwrap();

        let loaded = get_latest_lab_panel(&conn, "p-1").unwrap().unwrap();
        assert_eq!(loaded, panel);
    }
}
