//! Fixture loading for writable stores
//!
//! Creates the admissions table and inserts raw rows as they would appear
//! in the source extract. Only in-memory stores are writable; file stores
//! open read-only and reject the insert.

use rusqlite::params;

use super::errors::StoreResult;
use super::sqlite::{admissions_schema, SqliteStore};
use super::value::SqlValue;
use crate::engine::columns;

/// One admission in storage form. Dates are raw `MM/DD/YY` text and sex
/// is the stored code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdmissionRow {
    pub name: Option<String>,
    pub region: Option<String>,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub diagnosis: Option<String>,
    pub center: Option<String>,
    pub admission_date: Option<String>,
    pub contact_end_date: Option<String>,
    pub length_of_stay: SqlValue,
}

impl AdmissionRow {
    /// Row with every column the filters read set
    pub fn new(name: &str, region: &str, birth_date: &str, sex: &str, diagnosis: &str, center: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            region: Some(region.to_string()),
            birth_date: Some(birth_date.to_string()),
            sex: Some(sex.to_string()),
            diagnosis: Some(diagnosis.to_string()),
            center: Some(center.to_string()),
            ..Default::default()
        }
    }

    pub fn admitted(mut self, admission_date: &str, contact_end_date: Option<&str>) -> Self {
        self.admission_date = Some(admission_date.to_string());
        self.contact_end_date = contact_end_date.map(str::to_string);
        self
    }

    pub fn stay(mut self, days: impl Into<SqlValue>) -> Self {
        self.length_of_stay = days.into();
        self
    }
}

impl SqliteStore {
    /// Create `table` if missing and insert `rows` in one transaction
    pub fn seed(&self, table: &str, rows: &[AdmissionRow]) -> StoreResult<usize> {
        let insert = format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}, {}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            table,
            columns::NAME,
            columns::REGION,
            columns::BIRTH_DATE,
            columns::SEX,
            columns::DIAGNOSIS,
            columns::CENTER,
            columns::ADMISSION_DATE,
            columns::CONTACT_END_DATE,
            columns::LENGTH_OF_STAY,
        );

        self.with_connection(|conn| {
            conn.execute_batch(&admissions_schema(table))?;
            let tx = conn.unchecked_transaction()?;
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare(&insert)?;
                for row in rows {
                    inserted += stmt.execute(params![
                        row.name,
                        row.region,
                        row.birth_date,
                        row.sex,
                        row.diagnosis,
                        row.center,
                        row.admission_date,
                        row.contact_end_date,
                        row.length_of_stay,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
    }
}
