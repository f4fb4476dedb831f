//! # Filter Options Resolver
//!
//! Lists the values each filter dimension can take, read fresh from the
//! store on every call.

use super::birth_year::birth_year_expr;
use super::columns;
use super::errors::EngineResult;
use super::predicate::PredicateSet;
use super::response::{FilterOptions, YearRange};
use super::sex::SEX_LABELS;
use super::{EngineContext, EngineSession};

/// Reported when no record has a parseable birth date
pub const FALLBACK_YEAR_RANGE: YearRange = YearRange {
    min: 1950,
    max: 2005,
};

const VALUE_ALIAS: &str = "OPTION_VALUE";
const MIN_ALIAS: &str = "MIN_YEAR";
const MAX_ALIAS: &str = "MAX_YEAR";
const REGION_PARAM: &str = "region";

pub struct FilterOptionsResolver<'a> {
    ctx: EngineContext<'a>,
}

impl<'a> FilterOptionsResolver<'a> {
    pub fn new(ctx: EngineContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn resolve(&self) -> EngineResult<FilterOptions> {
        let mut session = self.ctx.session()?;
        Ok(FilterOptions {
            comunidades: self.distinct(&mut session, columns::REGION, PredicateSet::new())?,
            sexos: SEX_LABELS.iter().map(|label| label.to_string()).collect(),
            diagnosticos: self.distinct(&mut session, columns::DIAGNOSIS, PredicateSet::new())?,
            centros: self.distinct(&mut session, columns::CENTER, PredicateSet::new())?,
            anio_nacimiento_range: self.year_range(&mut session)?,
        })
    }

    /// Centers with at least one admission from `region`, compared
    /// case-insensitively
    pub fn centers_for_region(&self, region: &str) -> EngineResult<Vec<String>> {
        let mut set = PredicateSet::new();
        set.require(format!("UPPER({}) = UPPER(:{})", columns::REGION, REGION_PARAM))
            .bind(REGION_PARAM, region);

        let mut session = self.ctx.session()?;
        self.distinct(&mut session, columns::CENTER, set)
    }

    fn distinct(
        &self,
        session: &mut EngineSession<'_>,
        column: &str,
        mut filter: PredicateSet,
    ) -> EngineResult<Vec<String>> {
        filter.require(format!("{} IS NOT NULL", column));
        let sql = format!(
            "SELECT DISTINCT {} AS {} FROM {} {} ORDER BY {} ASC",
            column,
            VALUE_ALIAS,
            self.ctx.settings.table,
            filter.where_sql(),
            VALUE_ALIAS
        );

        let rows = session.query(&sql, filter.params())?;
        let mut values = Vec::with_capacity(rows.len());
        for row in rows.rows() {
            if let Some(value) = row.get_text(VALUE_ALIAS)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    fn year_range(&self, session: &mut EngineSession<'_>) -> EngineResult<YearRange> {
        let year = birth_year_expr();
        let sql = format!(
            "SELECT MIN({}) AS {}, MAX({}) AS {} FROM {} WHERE {} IS NOT NULL",
            year, MIN_ALIAS, year, MAX_ALIAS, self.ctx.settings.table, year
        );

        let rows = session.query(&sql, &Default::default())?;
        let Some(row) = rows.first() else {
            return Ok(FALLBACK_YEAR_RANGE);
        };
        let min = row.get_i64(MIN_ALIAS)?.and_then(|y| i32::try_from(y).ok());
        let max = row.get_i64(MAX_ALIAS)?.and_then(|y| i32::try_from(y).ok());

        Ok(match (min, max) {
            (Some(min), Some(max)) => YearRange { min, max },
            _ => FALLBACK_YEAR_RANGE,
        })
    }
}
