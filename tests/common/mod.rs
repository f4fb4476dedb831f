//! Shared fixture for integration tests
//!
//! 24 raw admissions. Twelve of them are men from MADRID born 1980-1990;
//! the rest exercise every exclusion path: wrong sex, year just outside the
//! range, other regions, unparseable birth dates, a missing diagnosis, a
//! missing name and a repeat admission of one patient.

#![allow(dead_code)]

use std::sync::Arc;

use admissions_engine::engine::{AdmissionsEngine, BirthYearRule, EngineSettings};
use admissions_engine::store::{AdmissionRow, SqliteStore};

pub const TABLE: &str = "DATOS_ORIGINALES";

/// Men from MADRID born 1980-1990, in name order
pub const MADRID_MEN_1980S: [&str; 12] = [
    "ALVAREZ PEREZ, JUAN",
    "BLANCO RUIZ, PEDRO",
    "CASTRO GIL, LUIS",
    "DIAZ MORA, ANDRES",
    "ESTEBAN SOTO, RAUL",
    "FERNANDEZ LOPEZ, IVAN",
    "GARCIA VEGA, DIEGO",
    "HERRERO PARDO, JOSE",
    "IGLESIAS CANO, MARIO",
    "JIMENEZ RIOS, ALVARO",
    "LOPEZ SANZ, CARLOS",
    "MARTIN ORTEGA, SERGIO",
];

/// Rows with region, diagnosis, center and a parseable birth date
pub const BASELINE_RECORDS: u64 = 21;

pub fn admissions() -> Vec<AdmissionRow> {
    vec![
        AdmissionRow::new("ALVAREZ PEREZ, JUAN", "MADRID", "01/01/80", "1", "F32", "C1")
            .admitted("01/10/20", Some("01/15/20"))
            .stay(5),
        AdmissionRow::new("BLANCO RUIZ, PEDRO", "MADRID", "06/15/81", "1", "F20", "C2").stay(12),
        AdmissionRow::new("CASTRO GIL, LUIS", "MADRID", "03/03/82", "1", "F32", "C1"),
        AdmissionRow::new("DIAZ MORA, ANDRES", "MADRID", "09/09/83", "1", "F32", "C2").stay("n/a"),
        AdmissionRow::new("ESTEBAN SOTO, RAUL", "MADRID", "11/11/84", "1", "F20", "C1"),
        AdmissionRow::new("FERNANDEZ LOPEZ, IVAN", "MADRID", "02/02/85", "1", "F32", "C1"),
        AdmissionRow::new("GARCIA VEGA, DIEGO", "MADRID", "04/04/86", "1", "F32", "C2"),
        AdmissionRow::new("HERRERO PARDO, JOSE", "MADRID", "05/05/87", "1", "F41", "C1"),
        AdmissionRow::new("IGLESIAS CANO, MARIO", "MADRID", "07/07/88", "1", "F32", "C1"),
        AdmissionRow::new("JIMENEZ RIOS, ALVARO", "MADRID", "08/08/89", "1", "F20", "C2"),
        AdmissionRow::new("LOPEZ SANZ, CARLOS", "MADRID", "10/10/90", "1", "F32", "C1"),
        AdmissionRow::new("MARTIN ORTEGA, SERGIO", "MADRID", "12/31/90", "1", "F32", "C2"),
        AdmissionRow::new("NAVARRO DIAZ, LUCIA", "MADRID", "03/14/85", "2", "F32", "C1")
            .admitted("02/01/21", Some("02/09/21"))
            .stay(8),
        AdmissionRow::new("ORTIZ LEON, PABLO", "MADRID", "12/31/79", "1", "F32", "C1"),
        AdmissionRow::new("PRIETO MAS, HUGO", "MADRID", "01/01/91", "1", "F32", "C2"),
        AdmissionRow::new("QUINTANA ROS, ELENA", "GALICIA", "05/20/85", "2", "F32", "C3"),
        AdmissionRow::new("RAMOS VIDAL, OSCAR", "GALICIA", "05/20/85", "1", "F20", "C3"),
        AdmissionRow::new("SANCHEZ PAZ, JAVIER", "MADRID", "1985-03-01", "1", "F32", "C1"),
        AdmissionRow::new("TORRES GIL, ADRIAN", "MADRID", "02/30/85", "1", "F32", "C1"),
        AdmissionRow {
            diagnosis: None,
            ..AdmissionRow::new("URIBE SOLA, MARCOS", "MADRID", "06/06/85", "1", "", "C1")
        },
        AdmissionRow {
            name: None,
            ..AdmissionRow::new("", "GALICIA", "09/09/50", "2", "F32", "C3")
        },
        AdmissionRow::new("VIDAL ROCA, ALBA", "ANDALUCIA", "01/01/20", "3", "F32", "C4"),
        AdmissionRow::new("ZAMORA LUZ, NORA", "ANDALUCIA", "04/04/24", "2", "F32", "C4"),
        AdmissionRow::new("NAVARRO DIAZ, LUCIA", "MADRID", "03/14/85", "2", "F32", "C1")
            .admitted("06/01/21", None),
    ]
}

pub fn seeded_store(rows: &[AdmissionRow], rule: BirthYearRule) -> SqliteStore {
    let store = SqliteStore::open_in_memory(rule).unwrap();
    store.seed(TABLE, rows).unwrap();
    store
}

pub fn engine_over(rows: &[AdmissionRow], settings: EngineSettings) -> AdmissionsEngine {
    engine_with_rule(rows, BirthYearRule::default(), settings)
}

pub fn engine_with_rule(
    rows: &[AdmissionRow],
    rule: BirthYearRule,
    settings: EngineSettings,
) -> AdmissionsEngine {
    AdmissionsEngine::new(Arc::new(seeded_store(rows, rule)), settings)
}

/// Engine over [`admissions`] with default settings
pub fn engine() -> AdmissionsEngine {
    engine_over(&admissions(), EngineSettings::default())
}
