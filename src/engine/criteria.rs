//! # Filter Criteria
//!
//! The filter request accepted by the record query executor. Every
//! dimension is optional; an empty list means the dimension is
//! unconstrained, not that nothing matches.

use serde::{Deserialize, Deserializer, Serialize};

/// Default page size when the request omits one
pub const DEFAULT_ROWS_PER_PAGE: u64 = 20;

/// Largest page a client may request
pub const MAX_ROWS_PER_PAGE: u64 = 100;

/// Independently combinable filter constraints plus pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Regions, compared case-insensitively
    #[serde(alias = "comunidades", deserialize_with = "null_as_empty")]
    pub regions: Vec<String>,

    /// Inclusive lower bound on the normalized birth year
    #[serde(alias = "año_nacimiento_min")]
    pub birth_year_min: Option<i32>,

    /// Inclusive upper bound on the normalized birth year
    #[serde(alias = "año_nacimiento_max")]
    pub birth_year_max: Option<i32>,

    /// Sex labels (`Hombre`, `Mujer`, anything else)
    #[serde(alias = "sexo", deserialize_with = "null_as_empty")]
    pub sex: Vec<String>,

    /// Diagnosis categories
    #[serde(alias = "diagnosticos", deserialize_with = "null_as_empty")]
    pub diagnoses: Vec<String>,

    /// Treatment centers
    #[serde(alias = "centros", deserialize_with = "null_as_empty")]
    pub centers: Vec<String>,

    /// 1-based page number; values below 1 are read as 1
    #[serde(deserialize_with = "null_as_first_page")]
    pub page: i64,

    /// Page size; clamped to `[1, MAX_ROWS_PER_PAGE]`
    #[serde(alias = "rows_per_page", deserialize_with = "null_as_default_rows")]
    pub rows_per_page: i64,
}

// An explicit `null` reads the same as an omitted field.

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_first_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(1))
}

fn null_as_default_rows<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(DEFAULT_ROWS_PER_PAGE as i64))
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            birth_year_min: None,
            birth_year_max: None,
            sex: Vec::new(),
            diagnoses: Vec::new(),
            centers: Vec::new(),
            page: 1,
            rows_per_page: DEFAULT_ROWS_PER_PAGE as i64,
        }
    }
}

impl FilterCriteria {
    /// Criteria with no constraints, first page
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sex<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sex = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_diagnoses<I, S>(mut self, diagnoses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.diagnoses = diagnoses.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_centers<I, S>(mut self, centers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.centers = centers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_birth_years(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.birth_year_min = min;
        self.birth_year_max = max;
        self
    }

    pub fn with_page(mut self, page: i64, rows_per_page: i64) -> Self {
        self.page = page;
        self.rows_per_page = rows_per_page;
        self
    }

    /// Effective pagination after clamping
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.rows_per_page)
    }
}

/// Clamped page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub rows_per_page: u64,
}

impl Pagination {
    pub fn new(page: i64, rows_per_page: i64) -> Self {
        let page = u64::try_from(page).unwrap_or(0).max(1);
        let rows_per_page = u64::try_from(rows_per_page)
            .unwrap_or(0)
            .clamp(1, MAX_ROWS_PER_PAGE);
        Self {
            page,
            rows_per_page,
        }
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.rows_per_page)
    }

    /// `ceil(total_records / rows_per_page)`
    pub fn total_pages(&self, total_records: u64) -> u64 {
        total_records.div_ceil(self.rows_per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let criteria: FilterCriteria = serde_json::from_str("{}").unwrap();
        assert_eq!(criteria, FilterCriteria::new());
        assert_eq!(criteria.pagination().page, 1);
        assert_eq!(criteria.pagination().rows_per_page, 20);
    }

    #[test]
    fn test_camel_case_request() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{
                "regions": ["MADRID"],
                "birthYearMin": 1980,
                "birthYearMax": 1990,
                "sex": ["Hombre"],
                "diagnoses": ["F32"],
                "centers": ["C1"],
                "page": 2,
                "rowsPerPage": 5
            }"#,
        )
        .unwrap();

        assert_eq!(criteria.regions, vec!["MADRID"]);
        assert_eq!(criteria.birth_year_min, Some(1980));
        assert_eq!(criteria.birth_year_max, Some(1990));
        assert_eq!(criteria.pagination().offset(), 5);
    }

    #[test]
    fn test_dashboard_field_names_accepted() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{"comunidades": ["Galicia"], "sexo": ["Mujer"], "año_nacimiento_min": 1950}"#,
        )
        .unwrap();
        assert_eq!(criteria.regions, vec!["Galicia"]);
        assert_eq!(criteria.sex, vec!["Mujer"]);
        assert_eq!(criteria.birth_year_min, Some(1950));
    }

    #[test]
    fn test_null_dimensions_are_unconstrained() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{
                "regions": null,
                "sex": ["Hombre"],
                "diagnoses": null,
                "centros": null,
                "page": 1,
                "rowsPerPage": 5
            }"#,
        )
        .unwrap();

        assert!(criteria.regions.is_empty());
        assert!(criteria.diagnoses.is_empty());
        assert!(criteria.centers.is_empty());
        assert_eq!(criteria.sex, vec!["Hombre"]);
        assert_eq!(criteria.pagination().rows_per_page, 5);
    }

    #[test]
    fn test_null_paging_uses_defaults() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"page": null, "rowsPerPage": null}"#).unwrap();
        assert_eq!(criteria, FilterCriteria::new());
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(Pagination::new(1, 0).rows_per_page, 1);
        assert_eq!(Pagination::new(1, -3).rows_per_page, 1);
        assert_eq!(Pagination::new(1, 500).rows_per_page, 100);
        assert_eq!(Pagination::new(1, 37).rows_per_page, 37);
    }

    #[test]
    fn test_page_floor() {
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(-4, 10).page, 1);
        assert_eq!(Pagination::new(0, 10).offset(), 0);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let pagination = Pagination::new(1, 5);
        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(1), 1);
        assert_eq!(pagination.total_pages(5), 1);
        assert_eq!(pagination.total_pages(12), 3);
        assert_eq!(pagination.total_pages(15), 3);
    }
}
