//! # Filter and Aggregation Engine
//!
//! Read-only queries over the admissions table:
//!
//! - [`predicate`] turns filter criteria into bound predicate clauses
//! - [`birth_year`] owns the century rule for two-digit birth years
//! - [`executor`] counts and pages filtered records
//! - [`aggregator`] builds the pyramid, histogram and sex split
//! - [`options`] lists the values each filter can take
//!
//! Each operation acquires one store session when it starts and releases
//! it when it returns, successful or not. Count and page queries are not
//! wrapped in a transaction; a concurrent writer could make them disagree.

pub mod aggregator;
pub mod birth_year;
pub mod columns;
pub mod criteria;
pub mod errors;
pub mod executor;
pub mod options;
pub mod predicate;
pub mod response;
pub mod sex;

use std::sync::Arc;

pub use aggregator::{DemographicAggregator, AGE_BUCKETS, BIRTH_YEAR_BUCKETS};
pub use birth_year::{BirthYearRule, DEFAULT_CENTURY_CUTOFF};
pub use criteria::{FilterCriteria, Pagination, MAX_ROWS_PER_PAGE};
pub use errors::{EngineError, EngineResult};
pub use executor::RecordQueryExecutor;
pub use options::FilterOptionsResolver;
pub use predicate::{build_predicates, PredicateSet};
pub use response::{
    AgeHistogram, Demographics, FilterOptions, PageResult, PatientRecord, PyramidBucket,
    SexDistribution, YearRange,
};
pub use sex::Sex;

use crate::observability::{Logger, MetricsRegistry, ObservationScope};
use crate::store::{Params, RecordStore, RowSet, StoreSession};

/// Table and year settings shared by every component. The century rule
/// itself is registered with the store, not carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Admissions table name, validated as a plain identifier upstream
    pub table: String,
    /// Year ages are measured from in the histogram
    pub reference_year: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            table: "DATOS_ORIGINALES".to_string(),
            reference_year: DEFAULT_CENTURY_CUTOFF,
        }
    }
}

/// Borrowed handles a component runs with
#[derive(Clone, Copy)]
pub struct EngineContext<'a> {
    pub store: &'a dyn RecordStore,
    pub settings: &'a EngineSettings,
    pub metrics: &'a MetricsRegistry,
}

impl<'a> EngineContext<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        settings: &'a EngineSettings,
        metrics: &'a MetricsRegistry,
    ) -> Self {
        Self {
            store,
            settings,
            metrics,
        }
    }

    /// Acquire a session; it is released when dropped
    pub fn session(&self) -> EngineResult<EngineSession<'a>> {
        match self.store.acquire() {
            Ok(inner) => Ok(EngineSession {
                inner,
                metrics: self.metrics,
            }),
            Err(err) => {
                self.metrics.increment_queries_failed();
                Logger::error("STORE_ACQUIRE_FAILED", &[("reason", &err.to_string())]);
                Err(err.into())
            }
        }
    }
}

/// A store session that counts and logs every query
pub struct EngineSession<'a> {
    inner: Box<dyn StoreSession + 'a>,
    metrics: &'a MetricsRegistry,
}

impl EngineSession<'_> {
    pub fn query(&mut self, sql: &str, params: &Params) -> EngineResult<RowSet> {
        Logger::trace(
            "STORE_QUERY",
            &[("params", &params.len().to_string()), ("sql", sql)],
        );
        match self.inner.query(sql, params) {
            Ok(rows) => {
                self.metrics.increment_queries_executed();
                Ok(rows)
            }
            Err(err) => {
                self.metrics.increment_queries_failed();
                Logger::error("STORE_QUERY_FAILED", &[("reason", &err.to_string())]);
                Err(err.into())
            }
        }
    }
}

/// Owning entry point used by the HTTP server and the CLI
pub struct AdmissionsEngine {
    store: Arc<dyn RecordStore>,
    settings: EngineSettings,
    metrics: Arc<MetricsRegistry>,
}

impl AdmissionsEngine {
    pub fn new(store: Arc<dyn RecordStore>, settings: EngineSettings) -> Self {
        Self::with_metrics(store, settings, Arc::new(MetricsRegistry::new()))
    }

    pub fn with_metrics(
        store: Arc<dyn RecordStore>,
        settings: EngineSettings,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            store,
            settings,
            metrics,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    fn context(&self) -> EngineContext<'_> {
        EngineContext::new(self.store.as_ref(), &self.settings, &self.metrics)
    }

    /// One page of records matching `criteria`
    pub fn filter_patients(&self, criteria: &FilterCriteria) -> EngineResult<PageResult> {
        self.metrics.increment_filter_requests();
        let pagination = criteria.pagination();
        let scope = ObservationScope::new("PATIENT_FILTER")
            .with_field("page", pagination.page.to_string())
            .with_field("rows_per_page", pagination.rows_per_page.to_string());

        let result = RecordQueryExecutor::new(self.context()).execute(criteria);
        match &result {
            Ok(page) => scope.complete_with(&[("total_records", &page.total_records.to_string())]),
            Err(err) => scope.fail(&err.cause().to_string()),
        }
        result
    }

    /// Values available for every filter dimension
    pub fn filter_options(&self) -> EngineResult<FilterOptions> {
        self.metrics.increment_options_requests();
        let scope = ObservationScope::new("FILTER_OPTIONS");
        observed(scope, FilterOptionsResolver::new(self.context()).resolve())
    }

    /// Centers that treat patients from `region`
    pub fn centers_for_region(&self, region: &str) -> EngineResult<Vec<String>> {
        self.metrics.increment_options_requests();
        let scope = ObservationScope::new("REGION_CENTERS").with_field("region", region);
        observed(
            scope,
            FilterOptionsResolver::new(self.context()).centers_for_region(region),
        )
    }

    pub fn age_pyramid(&self, diagnosis: &str) -> EngineResult<Vec<PyramidBucket>> {
        self.metrics.increment_aggregation_requests();
        let scope = ObservationScope::new("AGE_PYRAMID").with_field("diagnosis", diagnosis);
        observed(
            scope,
            DemographicAggregator::new(self.context()).age_pyramid(diagnosis),
        )
    }

    pub fn age_histogram(&self, diagnosis: &str) -> EngineResult<AgeHistogram> {
        self.metrics.increment_aggregation_requests();
        let scope = ObservationScope::new("AGE_HISTOGRAM").with_field("diagnosis", diagnosis);
        observed(
            scope,
            DemographicAggregator::new(self.context()).age_histogram(diagnosis),
        )
    }

    pub fn sex_distribution(&self, diagnosis: &str) -> EngineResult<SexDistribution> {
        self.metrics.increment_aggregation_requests();
        let scope = ObservationScope::new("SEX_DISTRIBUTION").with_field("diagnosis", diagnosis);
        observed(
            scope,
            DemographicAggregator::new(self.context()).sex_distribution(diagnosis),
        )
    }

    /// Pyramid, histogram and sex split over one session
    pub fn demographics(&self, diagnosis: &str) -> EngineResult<Demographics> {
        self.metrics.increment_aggregation_requests();
        let scope = ObservationScope::new("DEMOGRAPHICS").with_field("diagnosis", diagnosis);
        observed(
            scope,
            DemographicAggregator::new(self.context()).aggregate(diagnosis),
        )
    }
}

fn observed<T>(scope: ObservationScope, result: EngineResult<T>) -> EngineResult<T> {
    match &result {
        Ok(_) => scope.complete(),
        Err(err) => scope.fail(&err.cause().to_string()),
    }
    result
}
