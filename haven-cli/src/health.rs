//! Health command implementation for the Haven CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use haven_core::{EnvironmentalProfile, HealthComponent, HealthIndex, Location, LocationId};
use haven_matcher::HealthStatus;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::SystemTime;

use crate::{
    ARG_CATALOG, ARG_GEODATA_API_KEY, ARG_GEODATA_BASE_URL, ARG_HEALTH_LOCATION, ARG_TREND_DAYS,
    CliError, DefaultServiceBuilder, ENV_HEALTH_LOCATION, EngineConfig, ServiceBuilder, write_json,
};

const DEFAULT_TREND_DAYS: u32 = 7;

/// CLI arguments for the `health` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Report the health index of a catalog location, refreshing \
                 its characteristics from the geodata service when they are \
                 stale, together with the indices recorded over recent days.",
    about = "Report the health of a catalog location"
)]
#[ortho_config(prefix = "HAVEN")]
pub(crate) struct HealthArgs {
    /// Catalog identifier of the location.
    #[arg(value_name = "id")]
    #[serde(default)]
    pub(crate) location_id: Option<u64>,
    /// Path to the SQLite location catalog.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Base URL of the geodata service.
    #[arg(long = ARG_GEODATA_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geodata_base_url: Option<String>,
    /// Bearer token for the geodata service.
    #[arg(long = ARG_GEODATA_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) geodata_api_key: Option<String>,
    /// Number of days of history to include.
    #[arg(long = ARG_TREND_DAYS, value_name = "days")]
    #[serde(default)]
    pub(crate) trend_days: Option<u32>,
}

impl HealthArgs {
    pub(crate) fn into_config(self) -> Result<HealthConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        HealthConfig::try_from(merged)
    }
}

/// Resolved `health` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct HealthConfig {
    pub(crate) location_id: LocationId,
    pub(crate) engine: EngineConfig,
    pub(crate) trend_days: u32,
}

impl TryFrom<HealthArgs> for HealthConfig {
    type Error = CliError;

    fn try_from(args: HealthArgs) -> Result<Self, Self::Error> {
        let location_id = args.location_id.ok_or(CliError::MissingArgument {
            field: ARG_HEALTH_LOCATION,
            env: ENV_HEALTH_LOCATION,
        })?;
        Ok(Self {
            location_id: LocationId(location_id),
            engine: EngineConfig::resolve(args.catalog, args.geodata_base_url, args.geodata_api_key),
            trend_days: args.trend_days.unwrap_or(DEFAULT_TREND_DAYS),
        })
    }
}

/// Labelled reading of one health component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ComponentReading {
    pub(crate) component: HealthComponent,
    pub(crate) score: f64,
    pub(crate) status: String,
    pub(crate) message: String,
}

/// Overall score at one point in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrendPoint {
    pub(crate) computed_at: SystemTime,
    pub(crate) overall: f64,
}

/// JSON document printed by `haven health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct HealthReport {
    pub(crate) location: Location,
    pub(crate) characteristics: EnvironmentalProfile,
    pub(crate) index: HealthIndex,
    pub(crate) interpretations: Vec<ComponentReading>,
    pub(crate) trend: Vec<TrendPoint>,
}

impl HealthReport {
    fn new(status: HealthStatus, history: &[HealthIndex]) -> Self {
        let interpretations = status
            .interpretations
            .iter()
            .map(|reading| ComponentReading {
                component: reading.component,
                score: reading.score,
                status: reading.status.as_str().to_owned(),
                message: reading.message.to_owned(),
            })
            .collect();
        let trend = history
            .iter()
            .map(|index| TrendPoint {
                computed_at: index.computed_at,
                overall: index.overall,
            })
            .collect();
        Self {
            location: status.location,
            characteristics: status.characteristics,
            index: status.index,
            interpretations,
            trend,
        }
    }
}

pub(crate) fn run_health(args: HealthArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_health_with(args, &DefaultServiceBuilder, &mut stdout)
}

pub(crate) fn run_health_with(
    args: HealthArgs,
    builder: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.engine.validate_sources()?;
    let service = builder.build(&config.engine)?;
    let status = service.health_status(config.location_id)?;
    let history = service.health_trends(config.location_id, config.trend_days)?;
    write_json(writer, &HealthReport::new(status, &history))
}
