//! # Demographic Aggregator
//!
//! Distinct-patient breakdowns for one diagnosis: a birth-year pyramid
//! split by sex, an age histogram and a sex split.
//!
//! A patient is identified by `NOMBRE || '_' || CENTRO_RECODIFICADO`.
//! Bucket boundaries live in [`BIRTH_YEAR_BUCKETS`] and [`AGE_BUCKETS`];
//! the SQL that assigns rows to buckets is rendered from those tables and
//! the results are zero-filled here, so every bucket is always present.

use super::birth_year::birth_year_expr;
use super::columns;
use super::errors::EngineResult;
use super::predicate::PredicateSet;
use super::response::{AgeHistogram, Demographics, PyramidBucket, SexDistribution};
use super::sex::Sex;
use super::{EngineContext, EngineSession};

const BUCKET_ALIAS: &str = "BUCKET";
const SEX_ALIAS: &str = "SEX_CODE";
const PATIENTS_ALIAS: &str = "PATIENTS";
const DIAGNOSIS_PARAM: &str = "diagnosis";
const REFERENCE_YEAR_PARAM: &str = "reference_year";

/// A named closed interval, or open-ended when `max` is `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub label: &'static str,
    pub min: i32,
    pub max: Option<i32>,
}

impl Bucket {
    pub const fn closed(label: &'static str, min: i32, max: i32) -> Self {
        Self {
            label,
            min,
            max: Some(max),
        }
    }

    pub const fn open(label: &'static str, min: i32) -> Self {
        Self {
            label,
            min,
            max: None,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }

    fn condition_sql(&self, expr: &str) -> String {
        match self.max {
            Some(max) => format!("{} BETWEEN {} AND {}", expr, self.min, max),
            None => format!("{} >= {}", expr, self.min),
        }
    }
}

/// Pyramid intervals over the normalized birth year
pub const BIRTH_YEAR_BUCKETS: [Bucket; 9] = [
    Bucket::closed("1926-1929", 1926, 1929),
    Bucket::closed("1930-1939", 1930, 1939),
    Bucket::closed("1940-1949", 1940, 1949),
    Bucket::closed("1950-1959", 1950, 1959),
    Bucket::closed("1960-1969", 1960, 1969),
    Bucket::closed("1970-1979", 1970, 1979),
    Bucket::closed("1980-1989", 1980, 1989),
    Bucket::closed("1990-1999", 1990, 1999),
    Bucket::open("2000+", 2000),
];

/// Histogram intervals over age at the reference year
pub const AGE_BUCKETS: [Bucket; 9] = [
    Bucket::closed("0-9", 0, 9),
    Bucket::closed("10-19", 10, 19),
    Bucket::closed("20-29", 20, 29),
    Bucket::closed("30-39", 30, 39),
    Bucket::closed("40-49", 40, 49),
    Bucket::closed("50-59", 50, 59),
    Bucket::closed("60-69", 60, 69),
    Bucket::closed("70-79", 70, 79),
    Bucket::open("80+", 80),
];

/// Index of the first bucket containing `value`
pub fn bucket_index(buckets: &[Bucket], value: i32) -> Option<usize> {
    buckets.iter().position(|bucket| bucket.contains(value))
}

/// `CASE` expression mapping `expr` to its bucket index, NULL when no
/// bucket contains it. Bounds are table constants, never request values.
pub fn bucket_case_sql(expr: &str, buckets: &[Bucket]) -> String {
    let mut sql = String::from("CASE");
    for (index, bucket) in buckets.iter().enumerate() {
        sql.push_str(&format!(" WHEN {} THEN {}", bucket.condition_sql(expr), index));
    }
    sql.push_str(" ELSE NULL END");
    sql
}

fn distinct_patients_sql() -> String {
    format!(
        "COUNT(DISTINCT {} || '_' || {})",
        columns::NAME,
        columns::CENTER
    )
}

pub struct DemographicAggregator<'a> {
    ctx: EngineContext<'a>,
}

impl<'a> DemographicAggregator<'a> {
    pub fn new(ctx: EngineContext<'a>) -> Self {
        Self { ctx }
    }

    /// All three breakdowns, queried over one session
    pub fn aggregate(&self, diagnosis: &str) -> EngineResult<Demographics> {
        let mut session = self.ctx.session()?;
        Ok(Demographics {
            pyramid: self.pyramid_with(&mut session, diagnosis)?,
            histogram: self.histogram_with(&mut session, diagnosis)?,
            sex_split: self.sex_split_with(&mut session, diagnosis)?,
        })
    }

    pub fn age_pyramid(&self, diagnosis: &str) -> EngineResult<Vec<PyramidBucket>> {
        let mut session = self.ctx.session()?;
        self.pyramid_with(&mut session, diagnosis)
    }

    pub fn age_histogram(&self, diagnosis: &str) -> EngineResult<AgeHistogram> {
        let mut session = self.ctx.session()?;
        self.histogram_with(&mut session, diagnosis)
    }

    pub fn sex_distribution(&self, diagnosis: &str) -> EngineResult<SexDistribution> {
        let mut session = self.ctx.session()?;
        self.sex_split_with(&mut session, diagnosis)
    }

    /// Rows counted by every breakdown
    pub fn diagnosis_gate(&self, diagnosis: &str) -> PredicateSet {
        let mut set = PredicateSet::new();
        set.compare(columns::DIAGNOSIS, "=", DIAGNOSIS_PARAM, diagnosis)
            .require(format!("{} IS NOT NULL", birth_year_expr()))
            .require(format!("{} IS NOT NULL", columns::NAME))
            .require(format!("{} IS NOT NULL", columns::CENTER));
        set
    }

    pub fn pyramid_sql(&self, gate: &PredicateSet) -> String {
        format!(
            "SELECT {} AS {}, {} AS {}, {} AS {} FROM {} {} GROUP BY {}, {}",
            bucket_case_sql(&birth_year_expr(), &BIRTH_YEAR_BUCKETS),
            BUCKET_ALIAS,
            Sex::code_sql(columns::SEX),
            SEX_ALIAS,
            distinct_patients_sql(),
            PATIENTS_ALIAS,
            self.ctx.settings.table,
            gate.where_sql(),
            BUCKET_ALIAS,
            SEX_ALIAS
        )
    }

    pub fn histogram_sql(&self, gate: &PredicateSet) -> String {
        let age = format!("(:{} - {})", REFERENCE_YEAR_PARAM, birth_year_expr());
        format!(
            "SELECT {} AS {}, {} AS {} FROM {} {} GROUP BY {}",
            bucket_case_sql(&age, &AGE_BUCKETS),
            BUCKET_ALIAS,
            distinct_patients_sql(),
            PATIENTS_ALIAS,
            self.ctx.settings.table,
            gate.where_sql(),
            BUCKET_ALIAS
        )
    }

    pub fn sex_split_sql(&self, gate: &PredicateSet) -> String {
        format!(
            "SELECT {} AS {}, {} AS {} FROM {} {} GROUP BY {}",
            Sex::code_sql(columns::SEX),
            SEX_ALIAS,
            distinct_patients_sql(),
            PATIENTS_ALIAS,
            self.ctx.settings.table,
            gate.where_sql(),
            SEX_ALIAS
        )
    }

    fn pyramid_with(
        &self,
        session: &mut EngineSession<'_>,
        diagnosis: &str,
    ) -> EngineResult<Vec<PyramidBucket>> {
        let mut gate = self.diagnosis_gate(diagnosis);
        gate.in_list(
            &Sex::code_sql(columns::SEX),
            "sex",
            [Sex::Male.code(), Sex::Female.code()],
            None,
        );

        let mut pyramid: Vec<PyramidBucket> = BIRTH_YEAR_BUCKETS
            .iter()
            .map(|bucket| PyramidBucket {
                intervalo: bucket.label.to_string(),
                hombres: 0,
                mujeres: 0,
            })
            .collect();

        let rows = session.query(&self.pyramid_sql(&gate), gate.params())?;
        for row in rows.rows() {
            let Some(slot) = bucket_slot(row.get_i64(BUCKET_ALIAS)?, pyramid.len()) else {
                continue;
            };
            let count = row.get_count(PATIENTS_ALIAS)?;
            match Sex::from_code(&row.get_text(SEX_ALIAS)?.unwrap_or_default()) {
                Sex::Male => pyramid[slot].hombres += count,
                Sex::Female => pyramid[slot].mujeres += count,
                Sex::Other => {}
            }
        }
        Ok(pyramid)
    }

    fn histogram_with(
        &self,
        session: &mut EngineSession<'_>,
        diagnosis: &str,
    ) -> EngineResult<AgeHistogram> {
        let mut gate = self.diagnosis_gate(diagnosis);
        gate.bind(REFERENCE_YEAR_PARAM, self.ctx.settings.reference_year);

        let mut counts = vec![0u64; AGE_BUCKETS.len()];
        let rows = session.query(&self.histogram_sql(&gate), gate.params())?;
        for row in rows.rows() {
            if let Some(slot) = bucket_slot(row.get_i64(BUCKET_ALIAS)?, counts.len()) {
                counts[slot] += row.get_count(PATIENTS_ALIAS)?;
            }
        }

        Ok(AgeHistogram {
            age_groups: AGE_BUCKETS.iter().map(|b| b.label.to_string()).collect(),
            counts,
            diagnosis: diagnosis.to_string(),
        })
    }

    fn sex_split_with(
        &self,
        session: &mut EngineSession<'_>,
        diagnosis: &str,
    ) -> EngineResult<SexDistribution> {
        let gate = self.diagnosis_gate(diagnosis);
        let rows = session.query(&self.sex_split_sql(&gate), gate.params())?;

        let mut male_count = 0;
        let mut female_count = 0;
        for row in rows.rows() {
            let count = row.get_count(PATIENTS_ALIAS)?;
            match Sex::from_code(&row.get_text(SEX_ALIAS)?.unwrap_or_default()) {
                Sex::Male => male_count += count,
                Sex::Female => female_count += count,
                Sex::Other => {}
            }
        }

        Ok(SexDistribution {
            male_count,
            female_count,
            total: male_count + female_count,
            diagnosis: diagnosis.to_string(),
        })
    }
}

fn bucket_slot(index: Option<i64>, len: usize) -> Option<usize> {
    index
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| i < len)
}
