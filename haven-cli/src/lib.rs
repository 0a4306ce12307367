//! Command-line interface for the Haven wellbeing location engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;

mod engine;
mod error;
mod fs;
mod health;
mod predict;
mod prune;

pub use error::CliError;

pub(crate) use engine::{DefaultServiceBuilder, EngineConfig, Service, ServiceBuilder};
use health::{HealthArgs, run_health};
use predict::{PredictArgs, run_predict};
use prune::{PruneArgs, run_prune};

pub(crate) const ARG_CATALOG: &str = "catalog";
pub(crate) const ARG_GEODATA_BASE_URL: &str = "geodata-base-url";
pub(crate) const ARG_GEODATA_API_KEY: &str = "geodata-api-key";
pub(crate) const ARG_PREDICT_REQUEST: &str = "request";
pub(crate) const ARG_RADIUS_KM: &str = "radius-km";
pub(crate) const ARG_HEALTH_LOCATION: &str = "location-id";
pub(crate) const ARG_TREND_DAYS: &str = "trend-days";
pub(crate) const ARG_RETENTION_DAYS: &str = "retention-days";
pub(crate) const ENV_PREDICT_REQUEST: &str = "HAVEN_CMDS_PREDICT_REQUEST_PATH";
pub(crate) const ENV_HEALTH_LOCATION: &str = "HAVEN_CMDS_HEALTH_LOCATION_ID";

/// Catalog file used when none is configured.
pub(crate) const DEFAULT_CATALOG: &str = "haven.db";

/// Run the Haven CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Predict(args) => run_predict(args),
        Command::Health(args) => run_health(args),
        Command::Prune(args) => run_prune(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "haven",
    about = "Recommend outdoor locations suited to a user's wellbeing",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommend a location for a user state read from JSON.
    Predict(PredictArgs),
    /// Report the current health index and recent trend of a location.
    Health(HealthArgs),
    /// Delete characteristics and health indices beyond the retention window.
    Prune(PruneArgs),
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
