//! CLI command implementations
//!
//! `serve` runs the HTTP API. The one-shot commands answer a single
//! request: the result (or the request's error) is printed as one JSON
//! line and the process exits 0. Config and boot failures exit non-zero.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};
use crate::engine::{AdmissionsEngine, FilterCriteria};
use crate::http_server::HttpServer;
use crate::observability::Logger;

/// Which breakdown `aggregate` returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Breakdown {
    AgePyramid,
    AgeHistogram,
    #[serde(alias = "gender-distribution")]
    SexDistribution,
    #[default]
    Demographics,
}

#[derive(Debug, Deserialize)]
pub struct AggregateRequest {
    #[serde(alias = "diagnostico")]
    pub diagnosis: String,
    #[serde(default)]
    pub breakdown: Breakdown,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Filter { config } => filter(&config),
        Command::Aggregate { config } => aggregate(&config),
        Command::Options { config, region } => options(&config, region.as_deref()),
    }
}

/// Load config, apply the log level and open the engine
fn boot(config_path: &Path) -> CliResult<(Config, AdmissionsEngine)> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    Logger::info(
        "CONFIG_LOADED",
        &[("path", &config_path.display().to_string())],
    );
    let engine = config.open_engine()?;
    Ok((config, engine))
}

/// Start the HTTP API
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let (config, engine) = boot(config_path)?;

    let http_config = match port {
        Some(port) => config.http.clone().on_port(port),
        None => config.http.clone(),
    };
    http_config.validate().map_err(CliError::config_error)?;
    let server = HttpServer::with_config(http_config, Arc::new(engine));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// One page of filtered records for the request on stdin
pub fn filter(config_path: &Path) -> CliResult<()> {
    let (_, engine) = boot(config_path)?;
    respond(read_request().and_then(|request| filter_response(&engine, request)))
}

/// One demographic breakdown for the request on stdin
pub fn aggregate(config_path: &Path) -> CliResult<()> {
    let (_, engine) = boot(config_path)?;
    respond(read_request().and_then(|request| aggregate_response(&engine, request)))
}

/// Filter options, or the centers of `region`
pub fn options(config_path: &Path, region: Option<&str>) -> CliResult<()> {
    let (_, engine) = boot(config_path)?;
    respond(options_response(&engine, region))
}

pub fn filter_response(engine: &AdmissionsEngine, request: Value) -> CliResult<Value> {
    let criteria: FilterCriteria = serde_json::from_value(request)
        .map_err(|e| CliError::invalid_request(format!("Invalid filter request: {}", e)))?;
    let page = engine.filter_patients(&criteria)?;
    Ok(serde_json::to_value(page)?)
}

pub fn aggregate_response(engine: &AdmissionsEngine, request: Value) -> CliResult<Value> {
    let request: AggregateRequest = serde_json::from_value(request)
        .map_err(|e| CliError::invalid_request(format!("Invalid aggregate request: {}", e)))?;
    let diagnosis = request.diagnosis.as_str();

    let value = match request.breakdown {
        Breakdown::AgePyramid => serde_json::to_value(engine.age_pyramid(diagnosis)?)?,
        Breakdown::AgeHistogram => serde_json::to_value(engine.age_histogram(diagnosis)?)?,
        Breakdown::SexDistribution => serde_json::to_value(engine.sex_distribution(diagnosis)?)?,
        Breakdown::Demographics => serde_json::to_value(engine.demographics(diagnosis)?)?,
    };
    Ok(value)
}

pub fn options_response(engine: &AdmissionsEngine, region: Option<&str>) -> CliResult<Value> {
    match region {
        Some(region) => Ok(serde_json::to_value(engine.centers_for_region(region)?)?),
        None => Ok(serde_json::to_value(engine.filter_options()?)?),
    }
}

/// Print the outcome of one request. Request errors become an error line;
/// anything else is returned to the caller.
fn respond(result: CliResult<Value>) -> CliResult<()> {
    match result {
        Ok(data) => write_response(data),
        Err(err) if err.is_request_error() => write_error(err.code_str(), err.message()),
        Err(err) => Err(err),
    }
}
