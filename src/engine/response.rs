//! # Response Shapes
//!
//! Serialized results of engine operations. Field names are the ones the
//! dashboard reads.

use serde::Serialize;

/// One admission as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRecord {
    /// 1-based position in the ordered result set
    pub id: u64,
    pub nombre: Option<String>,
    pub comunidad: String,
    #[serde(rename = "año_nacimiento")]
    pub anio_nacimiento: i32,
    pub sexo: String,
    pub diagnostico: String,
    pub centro: String,
    pub fecha_ingreso: Option<String>,
    pub fecha_fin_contacto: Option<String>,
    /// 0 when absent
    pub estancia_dias: i64,
}

/// One page of filtered records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub data: Vec<PatientRecord>,
    pub total_records: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub rows_per_page: u64,
}

/// Inclusive birth-year range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

/// Values available to populate filter controls
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub comunidades: Vec<String>,
    pub sexos: Vec<String>,
    pub diagnosticos: Vec<String>,
    pub centros: Vec<String>,
    #[serde(rename = "año_nacimiento_range")]
    pub anio_nacimiento_range: YearRange,
}

/// Birth-year interval of the age pyramid with distinct patients by sex
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PyramidBucket {
    pub intervalo: String,
    pub hombres: u64,
    pub mujeres: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeHistogram {
    pub age_groups: Vec<String>,
    pub counts: Vec<u64>,
    pub diagnosis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SexDistribution {
    pub male_count: u64,
    pub female_count: u64,
    /// `male_count + female_count`
    pub total: u64,
    pub diagnosis: String,
}

/// All three breakdowns for one diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub pyramid: Vec<PyramidBucket>,
    pub histogram: AgeHistogram,
    pub sex_split: SexDistribution,
}
