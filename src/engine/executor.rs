//! # Record Query Executor
//!
//! Counts the records matching a [`FilterCriteria`] and fetches one page of
//! them. Both queries share the same predicate set and run on one session.
//!
//! Ordering is total over the projected columns, so the same criteria over
//! unchanged data always produce the same page and the same record ids.

use super::birth_year::birth_year_expr;
use super::columns;
use super::criteria::{FilterCriteria, Pagination};
use super::errors::EngineResult;
use super::predicate::{build_predicates, PredicateSet};
use super::response::{PageResult, PatientRecord};
use super::sex::Sex;
use super::{EngineContext, EngineSession};
use crate::store::{Row, StoreError};

/// Alias of the normalized birth year in the page query
const BIRTH_YEAR_ALIAS: &str = "ANIO_NACIMIENTO";
const TOTAL_ALIAS: &str = "TOTAL";
const ROW_LIMIT: &str = "row_limit";
const ROW_OFFSET: &str = "row_offset";

pub struct RecordQueryExecutor<'a> {
    ctx: EngineContext<'a>,
}

impl<'a> RecordQueryExecutor<'a> {
    pub fn new(ctx: EngineContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, criteria: &FilterCriteria) -> EngineResult<PageResult> {
        let pagination = criteria.pagination();
        let predicates = self.predicates(criteria);

        let mut session = self.ctx.session()?;
        let total_records = self.count(&mut session, &predicates)?;

        let data = if pagination.offset() >= total_records {
            Vec::new()
        } else {
            self.fetch_page(&mut session, predicates, pagination)?
        };

        Ok(PageResult {
            data,
            total_records,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total_records),
            rows_per_page: pagination.rows_per_page,
        })
    }

    /// Baseline clauses followed by the criteria clauses
    pub fn predicates(&self, criteria: &FilterCriteria) -> PredicateSet {
        let mut set = baseline_predicates();
        set.extend(build_predicates(criteria));
        set
    }

    pub fn count_sql(&self, predicates: &PredicateSet) -> String {
        format!(
            "SELECT COUNT(*) AS {} FROM {} {}",
            TOTAL_ALIAS,
            self.ctx.settings.table,
            predicates.where_sql()
        )
    }

    pub fn page_sql(&self, predicates: &PredicateSet) -> String {
        let projection = [
            columns::NAME.to_string(),
            columns::REGION.to_string(),
            format!("{} AS {}", birth_year_expr(), BIRTH_YEAR_ALIAS),
            columns::SEX.to_string(),
            columns::DIAGNOSIS.to_string(),
            columns::CENTER.to_string(),
            columns::ADMISSION_DATE.to_string(),
            columns::CONTACT_END_DATE.to_string(),
            columns::LENGTH_OF_STAY.to_string(),
        ];
        let ordering = [
            columns::NAME,
            columns::CENTER,
            columns::ADMISSION_DATE,
            columns::CONTACT_END_DATE,
            BIRTH_YEAR_ALIAS,
            columns::SEX,
            columns::DIAGNOSIS,
            columns::REGION,
            columns::LENGTH_OF_STAY,
        ]
        .iter()
        .map(|column| format!("{} ASC", column))
        .collect::<Vec<_>>();

        format!(
            "SELECT {} FROM {} {} ORDER BY {} LIMIT :{} OFFSET :{}",
            projection.join(", "),
            self.ctx.settings.table,
            predicates.where_sql(),
            ordering.join(", "),
            ROW_LIMIT,
            ROW_OFFSET
        )
    }

    fn count(&self, session: &mut EngineSession<'_>, predicates: &PredicateSet) -> EngineResult<u64> {
        let rows = session.query(&self.count_sql(predicates), predicates.params())?;
        match rows.first() {
            Some(row) => Ok(row.get_count(TOTAL_ALIAS)?),
            None => Ok(0),
        }
    }

    fn fetch_page(
        &self,
        session: &mut EngineSession<'_>,
        predicates: PredicateSet,
        pagination: Pagination,
    ) -> EngineResult<Vec<PatientRecord>> {
        let sql = self.page_sql(&predicates);
        let offset = pagination.offset();

        let mut bound = predicates;
        bound.bind(ROW_LIMIT, pagination.rows_per_page);
        bound.bind(ROW_OFFSET, offset);

        let rows = session.query(&sql, bound.params())?;
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.rows().enumerate() {
            records.push(to_record(row, offset + index as u64 + 1)?);
        }
        Ok(records)
    }
}

/// Rows every filter starts from: region, diagnosis and center present,
/// birth date parseable
fn baseline_predicates() -> PredicateSet {
    let mut set = PredicateSet::new();
    set.require(format!("{} IS NOT NULL", columns::REGION))
        .require(format!("{} IS NOT NULL", columns::DIAGNOSIS))
        .require(format!("{} IS NOT NULL", columns::CENTER))
        .require(format!("{} IS NOT NULL", birth_year_expr()));
    set
}

fn to_record(row: Row<'_>, id: u64) -> EngineResult<PatientRecord> {
    let anio_nacimiento = row
        .get_i64(BIRTH_YEAR_ALIAS)?
        .and_then(|year| i32::try_from(year).ok())
        .ok_or_else(|| StoreError::Decode {
            column: BIRTH_YEAR_ALIAS.to_string(),
            reason: "birth year missing from filtered row".to_string(),
        })?;
    let sex_code = row.get_text(columns::SEX)?.unwrap_or_default();

    Ok(PatientRecord {
        id,
        nombre: row.get_text(columns::NAME)?,
        comunidad: row.get_text(columns::REGION)?.unwrap_or_default(),
        anio_nacimiento,
        sexo: Sex::from_code(&sex_code).label().to_string(),
        diagnostico: row.get_text(columns::DIAGNOSIS)?.unwrap_or_default(),
        centro: row.get_text(columns::CENTER)?.unwrap_or_default(),
        fecha_ingreso: row.get_text(columns::ADMISSION_DATE)?,
        fecha_fin_contacto: row.get_text(columns::CONTACT_END_DATE)?,
        estancia_dias: row.get(columns::LENGTH_OF_STAY)?.as_i64().unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineSettings;
    use crate::observability::MetricsRegistry;
    use crate::store::{Params, RecordStore, RowSet, SqlValue, StoreResult, StoreSession};
    use std::sync::Mutex;

    /// Answers count queries with `total` and page queries with `page`,
    /// recording every statement it sees
    struct ScriptedStore {
        total: i64,
        page: RowSet,
        seen: Mutex<Vec<(String, Params)>>,
    }

    struct ScriptedSession<'a>(&'a ScriptedStore);

    impl RecordStore for ScriptedStore {
        fn acquire(&self) -> StoreResult<Box<dyn StoreSession + '_>> {
            Ok(Box::new(ScriptedSession(self)))
        }
    }

    impl StoreSession for ScriptedSession<'_> {
        fn query(&mut self, sql: &str, params: &Params) -> StoreResult<RowSet> {
            self.0
                .seen
                .lock()
                .unwrap()
                .push((sql.to_string(), params.clone()));
            if sql.starts_with("SELECT COUNT(*)") {
                Ok(RowSet::new(
                    vec!["TOTAL".to_string()],
                    vec![vec![SqlValue::Integer(self.0.total)]],
                ))
            } else {
                Ok(self.0.page.clone())
            }
        }
    }

    fn page_columns() -> Vec<String> {
        [
            "NOMBRE",
            "COMUNIDAD_AUTONOMA",
            "ANIO_NACIMIENTO",
            "SEXO",
            "CATEGORIA",
            "CENTRO_RECODIFICADO",
            "FECHA_DE_INGRESO",
            "FECHA_DE_FIN_CONTACTO",
            "ESTANCIA_DIAS",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect()
    }

    fn page_row(name: &str, sex: &str, stay: SqlValue) -> Vec<SqlValue> {
        vec![
            SqlValue::from(name),
            SqlValue::from("MADRID"),
            SqlValue::Integer(1985),
            SqlValue::from(sex),
            SqlValue::from("F32"),
            SqlValue::from("C1"),
            SqlValue::from("01/15/20"),
            SqlValue::Null,
            stay,
        ]
    }

    fn run(store: &ScriptedStore, criteria: &FilterCriteria) -> PageResult {
        let settings = EngineSettings::default();
        let metrics = MetricsRegistry::new();
        let ctx = EngineContext::new(store, &settings, &metrics);
        RecordQueryExecutor::new(ctx).execute(criteria).unwrap()
    }

    #[test]
    fn test_baseline_precedes_criteria() {
        let settings = EngineSettings::default();
        let metrics = MetricsRegistry::new();
        let store = ScriptedStore {
            total: 0,
            page: RowSet::default(),
            seen: Mutex::new(Vec::new()),
        };
        let executor = RecordQueryExecutor::new(EngineContext::new(&store, &settings, &metrics));

        let set = executor.predicates(&FilterCriteria::new().with_diagnoses(["F32"]));
        assert_eq!(set.clauses().len(), 5);
        assert_eq!(set.clauses()[0], "COMUNIDAD_AUTONOMA IS NOT NULL");
        assert_eq!(set.clauses()[3], "BIRTH_YEAR(FECHA_DE_NACIMIENTO) IS NOT NULL");
        assert_eq!(set.clauses()[4], "CATEGORIA IN (:diagnostico_0)");
    }

    #[test]
    fn test_page_sql_orders_by_name_first() {
        let settings = EngineSettings::default();
        let metrics = MetricsRegistry::new();
        let store = ScriptedStore {
            total: 0,
            page: RowSet::default(),
            seen: Mutex::new(Vec::new()),
        };
        let executor = RecordQueryExecutor::new(EngineContext::new(&store, &settings, &metrics));

        let sql = executor.page_sql(&PredicateSet::new());
        assert!(sql.contains("FROM DATOS_ORIGINALES WHERE 1 = 1"));
        assert!(sql.contains("ORDER BY NOMBRE ASC, CENTRO_RECODIFICADO ASC, FECHA_DE_INGRESO ASC"));
        assert!(sql.ends_with("LIMIT :row_limit OFFSET :row_offset"));
    }

    #[test]
    fn test_records_numbered_from_offset() {
        let store = ScriptedStore {
            total: 12,
            page: RowSet::new(
                page_columns(),
                vec![
                    page_row("ANA", "2", SqlValue::Integer(3)),
                    page_row("LUIS", "1", SqlValue::Null),
                ],
            ),
            seen: Mutex::new(Vec::new()),
        };

        let page = run(&store, &FilterCriteria::new().with_page(2, 5));
        assert_eq!(page.total_records, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.data[0].id, 6);
        assert_eq!(page.data[1].id, 7);
        assert_eq!(page.data[0].sexo, "Mujer");
        assert_eq!(page.data[1].sexo, "Hombre");
        assert_eq!(page.data[1].estancia_dias, 0);

        let seen = store.seen.lock().unwrap();
        let (_, params) = &seen[1];
        assert_eq!(params["row_limit"], SqlValue::Integer(5));
        assert_eq!(params["row_offset"], SqlValue::Integer(5));
    }

    #[test]
    fn test_non_numeric_stay_reads_as_zero() {
        let store = ScriptedStore {
            total: 1,
            page: RowSet::new(
                page_columns(),
                vec![page_row("ANA", "3", SqlValue::from("n/a"))],
            ),
            seen: Mutex::new(Vec::new()),
        };

        let page = run(&store, &FilterCriteria::new());
        assert_eq!(page.data[0].estancia_dias, 0);
        assert_eq!(page.data[0].sexo, "Otros");
    }

    #[test]
    fn test_page_past_end_skips_data_query() {
        let store = ScriptedStore {
            total: 3,
            page: RowSet::default(),
            seen: Mutex::new(Vec::new()),
        };

        let page = run(&store, &FilterCriteria::new().with_page(9, 5));
        assert!(page.data.is_empty());
        assert_eq!(page.total_records, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(store.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_count_query_binds_only_criteria_params() {
        let store = ScriptedStore {
            total: 0,
            page: RowSet::default(),
            seen: Mutex::new(Vec::new()),
        };

        run(&store, &FilterCriteria::new().with_regions(["MADRID"]));
        let seen = store.seen.lock().unwrap();
        let (sql, params) = &seen[0];
        assert!(sql.starts_with("SELECT COUNT(*) AS TOTAL FROM DATOS_ORIGINALES"));
        assert_eq!(params.len(), 1);
        assert!(!params.contains_key("row_limit"));
    }
}
