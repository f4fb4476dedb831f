//! # Filter Predicate Builder
//!
//! Turns [`FilterCriteria`] into an ordered list of SQL predicate clauses
//! and the values bound to their placeholders. Values are never rendered
//! into SQL text; each gets a `:name` placeholder unique across the set.

use super::birth_year::birth_year_expr;
use super::columns;
use super::criteria::FilterCriteria;
use super::sex::Sex;
use crate::store::{Params, SqlValue};

/// Clauses that are ANDed together, with their bound values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    clauses: Vec<String>,
    params: Params,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause that binds nothing
    pub fn require(&mut self, clause: impl Into<String>) -> &mut Self {
        self.clauses.push(clause.into());
        self
    }

    /// Append `{lhs} {op} :{name}` and bind `value` to `name`
    pub fn compare(
        &mut self,
        lhs: &str,
        op: &str,
        name: &str,
        value: impl Into<SqlValue>,
    ) -> &mut Self {
        self.clauses.push(format!("{} {} :{}", lhs, op, name));
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Append `{lhs} IN (…)` with one placeholder per value, named
    /// `{prefix}_{index}`. `wrap` (e.g. `UPPER`) is applied to each
    /// placeholder. An empty value list appends nothing.
    pub fn in_list<I, V>(&mut self, lhs: &str, prefix: &str, values: I, wrap: Option<&str>) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let mut placeholders = Vec::new();
        for (i, value) in values.into_iter().enumerate() {
            let name = format!("{}_{}", prefix, i);
            placeholders.push(match wrap {
                Some(func) => format!("{}(:{})", func, name),
                None => format!(":{}", name),
            });
            self.params.insert(name, value.into());
        }

        if !placeholders.is_empty() {
            self.clauses
                .push(format!("{} IN ({})", lhs, placeholders.join(", ")));
        }
        self
    }

    /// Bind an extra value used outside the clauses (LIMIT, CASE, …)
    pub fn bind(&mut self, name: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Append every clause and binding of `other`
    pub fn extend(&mut self, other: PredicateSet) -> &mut Self {
        self.clauses.extend(other.clauses);
        self.params.extend(other.params);
        self
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_params(self) -> Params {
        self.params
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `WHERE 1 = 1 AND …` over every clause
    pub fn where_sql(&self) -> String {
        let mut sql = String::from("WHERE 1 = 1");
        for clause in &self.clauses {
            sql.push_str(" AND ");
            sql.push_str(clause);
        }
        sql
    }
}

/// Placeholder names used by criteria clauses
pub mod placeholders {
    pub const REGION: &str = "comunidad";
    pub const SEX: &str = "sexo";
    pub const DIAGNOSIS: &str = "diagnostico";
    pub const CENTER: &str = "centro";
    pub const BIRTH_YEAR_MIN: &str = "birth_year_min";
    pub const BIRTH_YEAR_MAX: &str = "birth_year_max";
}

/// Build the clauses expressing `criteria`. Pagination is not included.
pub fn build_predicates(criteria: &FilterCriteria) -> PredicateSet {
    let mut set = PredicateSet::new();

    set.in_list(
        &format!("UPPER({})", columns::REGION),
        placeholders::REGION,
        criteria.regions.iter().map(String::as_str),
        Some("UPPER"),
    );

    if let Some(min) = criteria.birth_year_min {
        set.compare(&birth_year_expr(), ">=", placeholders::BIRTH_YEAR_MIN, min);
    }
    if let Some(max) = criteria.birth_year_max {
        set.compare(&birth_year_expr(), "<=", placeholders::BIRTH_YEAR_MAX, max);
    }

    set.in_list(
        columns::SEX,
        placeholders::SEX,
        criteria.sex.iter().map(|label| Sex::from_label(label).code()),
        None,
    );

    set.in_list(
        columns::DIAGNOSIS,
        placeholders::DIAGNOSIS,
        criteria.diagnoses.iter().map(String::as_str),
        None,
    );

    set.in_list(
        columns::CENTER,
        placeholders::CENTER,
        criteria.centers.iter().map(String::as_str),
        None,
    );

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_criteria_has_no_clauses() {
        let set = build_predicates(&FilterCriteria::new());
        assert!(set.is_empty());
        assert!(set.params().is_empty());
        assert_eq!(set.where_sql(), "WHERE 1 = 1");
    }

    #[test]
    fn test_empty_lists_add_nothing() {
        let criteria = FilterCriteria::new()
            .with_regions(Vec::<String>::new())
            .with_sex(Vec::<String>::new())
            .with_diagnoses(Vec::<String>::new())
            .with_centers(Vec::<String>::new());
        assert!(build_predicates(&criteria).is_empty());
    }

    #[test]
    fn test_region_clause_is_case_insensitive() {
        let criteria = FilterCriteria::new().with_regions(["madrid", "Galicia"]);
        let set = build_predicates(&criteria);

        assert_eq!(
            set.clauses(),
            &["UPPER(COMUNIDAD_AUTONOMA) IN (UPPER(:comunidad_0), UPPER(:comunidad_1))".to_string()]
        );
        assert_eq!(set.params()["comunidad_0"], SqlValue::from("madrid"));
        assert_eq!(set.params()["comunidad_1"], SqlValue::from("Galicia"));
    }

    #[test]
    fn test_sex_labels_become_codes() {
        let criteria = FilterCriteria::new().with_sex(["Hombre", "Mujer", "Otros"]);
        let set = build_predicates(&criteria);

        assert_eq!(
            set.clauses(),
            &["SEXO IN (:sexo_0, :sexo_1, :sexo_2)".to_string()]
        );
        assert_eq!(set.params()["sexo_0"], SqlValue::from("1"));
        assert_eq!(set.params()["sexo_1"], SqlValue::from("2"));
        assert_eq!(set.params()["sexo_2"], SqlValue::from("3"));
    }

    #[test]
    fn test_birth_year_bounds_use_normalized_year() {
        let criteria = FilterCriteria::new().with_birth_years(Some(1980), Some(1990));
        let set = build_predicates(&criteria);

        assert_eq!(
            set.clauses(),
            &[
                "BIRTH_YEAR(FECHA_DE_NACIMIENTO) >= :birth_year_min".to_string(),
                "BIRTH_YEAR(FECHA_DE_NACIMIENTO) <= :birth_year_max".to_string(),
            ]
        );
        assert_eq!(set.params()["birth_year_min"], SqlValue::Integer(1980));
        assert_eq!(set.params()["birth_year_max"], SqlValue::Integer(1990));
    }

    #[test]
    fn test_single_bound() {
        let criteria = FilterCriteria::new().with_birth_years(None, Some(2000));
        let set = build_predicates(&criteria);
        assert_eq!(set.clauses().len(), 1);
        assert!(!set.params().contains_key("birth_year_min"));
    }

    #[test]
    fn test_placeholders_unique_across_dimensions() {
        let criteria = FilterCriteria::new()
            .with_regions(["A", "B"])
            .with_sex(["Hombre", "Mujer"])
            .with_diagnoses(["F32", "F33"])
            .with_centers(["C1", "C2"])
            .with_birth_years(Some(1950), Some(1990));
        let set = build_predicates(&criteria);

        assert_eq!(set.clauses().len(), 6);
        assert_eq!(set.params().len(), 10);

        let sql = set.where_sql();
        for name in set.params().keys() {
            let placeholder = format!(":{}", name);
            assert_eq!(sql.matches(&placeholder).count(), 1, "{}", placeholder);
        }
    }

    #[test]
    fn test_values_never_rendered_into_sql() {
        let criteria = FilterCriteria::new()
            .with_regions(["x') OR 1=1 --"])
            .with_centers(["'; DROP TABLE DATOS_ORIGINALES; --"]);
        let sql = build_predicates(&criteria).where_sql();
        assert!(!sql.contains("OR 1=1"));
        assert!(!sql.contains("DROP TABLE"));
    }

    #[test]
    fn test_where_sql_joins_with_and() {
        let mut set = PredicateSet::new();
        set.require("A IS NOT NULL").require("B IS NOT NULL");
        assert_eq!(set.where_sql(), "WHERE 1 = 1 AND A IS NOT NULL AND B IS NOT NULL");
    }

    #[test]
    fn test_extend_merges_clauses_and_params() {
        let mut base = PredicateSet::new();
        base.require("X IS NOT NULL");
        base.extend(build_predicates(&FilterCriteria::new().with_diagnoses(["F32"])));

        assert_eq!(base.clauses().len(), 2);
        assert_eq!(base.params()["diagnostico_0"], SqlValue::from("F32"));
    }
}
