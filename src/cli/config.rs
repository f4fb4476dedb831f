//! Configuration file
//!
//! ```json
//! {
//!   "http": { "host": "0.0.0.0", "port": 8000, "cors_origins": ["http://localhost:5173"] },
//!   "store": { "path": "admissions.db", "table": "DATOS_ORIGINALES", "pool_size": 4 },
//!   "birth_year": { "century_cutoff": 2025, "reference_year": 2025 },
//!   "log_level": "info"
//! }
//! ```
//!
//! Every field is optional.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::engine::{AdmissionsEngine, BirthYearRule, EngineSettings, DEFAULT_CENTURY_CUTOFF};
use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::store::{SqliteStore, StoreConfig};

/// Century rule and histogram reference year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthYearConfig {
    /// Two-digit years resolving after this move to the 1900s (default: 2025)
    #[serde(default = "default_year")]
    pub century_cutoff: i32,

    /// Year ages are measured from (default: 2025)
    #[serde(default = "default_year")]
    pub reference_year: i32,
}

fn default_year() -> i32 {
    DEFAULT_CENTURY_CUTOFF
}

impl Default for BirthYearConfig {
    fn default() -> Self {
        Self {
            century_cutoff: default_year(),
            reference_year: default_year(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub birth_year: BirthYearConfig,

    /// Minimum severity written (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            store: StoreConfig::default(),
            birth_year: BirthYearConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        self.http.validate().map_err(CliError::config_error)?;
        self.store.validate().map_err(CliError::config_error)?;

        if !(1900..=2099).contains(&self.birth_year.century_cutoff) {
            return Err(CliError::config_error(format!(
                "birth_year.century_cutoff {} must be between 1900 and 2099",
                self.birth_year.century_cutoff
            )));
        }

        if self.birth_year.reference_year < 1900 {
            return Err(CliError::config_error(format!(
                "birth_year.reference_year {} must be >= 1900",
                self.birth_year.reference_year
            )));
        }

        self.severity()?;
        Ok(())
    }

    pub fn severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!("Invalid log_level: '{}'", self.log_level))
        })
    }

    pub fn birth_year_rule(&self) -> BirthYearRule {
        BirthYearRule::new(self.birth_year.century_cutoff)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            table: self.store.table.clone(),
            reference_year: self.birth_year.reference_year,
        }
    }

    /// Open the store and build the engine over it
    pub fn open_engine(&self) -> CliResult<AdmissionsEngine> {
        let store = SqliteStore::open(&self.store, self.birth_year_rule())
            .map_err(|e| CliError::boot_failed(format!("Failed to open store: {}", e)))?;
        Ok(AdmissionsEngine::new(Arc::new(store), self.engine_settings()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let file = write_config("{}");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.http.port, 8000);
        assert_eq!(config.engine_settings(), EngineSettings::default());
    }

    #[test]
    fn test_nested_overrides() {
        let file = write_config(
            r#"{
                "http": {"port": 9001},
                "store": {"path": ":memory:", "table": "INGRESOS"},
                "birth_year": {"century_cutoff": 2020, "reference_year": 2024},
                "log_level": "warn"
            }"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.http.port, 9001);
        assert_eq!(config.store.table, "INGRESOS");
        assert_eq!(config.severity().unwrap(), Severity::Warn);

        let settings = config.engine_settings();
        assert_eq!(settings.table, "INGRESOS");
        assert_eq!(config.birth_year_rule().century_cutoff, 2020);
        assert_eq!(settings.reference_year, 2024);
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let file = write_config(r#"{"store": {"table": "X; DROP TABLE Y"}}"#);
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.message().contains("identifier"));
    }

    #[test]
    fn test_rejects_zero_http_port() {
        let file = write_config(r#"{"http": {"port": 0}}"#);
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.message().contains("http.port"));
    }

    #[test]
    fn test_rejects_zero_pool() {
        let file = write_config(r#"{"store": {"pool_size": 0}}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_rejects_early_reference_year() {
        let file = write_config(r#"{"birth_year": {"reference_year": 1850}}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let file = write_config(r#"{"log_level": "chatty"}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
