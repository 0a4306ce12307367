//! Prune command implementation for the Haven CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

use crate::{
    ARG_CATALOG, ARG_RETENTION_DAYS, CliError, DefaultServiceBuilder, EngineConfig,
    ServiceBuilder, write_json,
};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// CLI arguments for the `prune` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Delete characteristics and health indices older than the retention window")]
#[ortho_config(prefix = "HAVEN")]
pub(crate) struct PruneArgs {
    /// Path to the SQLite location catalog.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Age in days beyond which history is removed (default 30).
    #[arg(long = ARG_RETENTION_DAYS, value_name = "days")]
    #[serde(default)]
    pub(crate) retention_days: Option<u32>,
}

impl PruneArgs {
    pub(crate) fn into_config(self) -> Result<PruneConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(PruneConfig::from(merged))
    }
}

/// Resolved `prune` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct PruneConfig {
    pub(crate) engine: EngineConfig,
    /// `None` defers to the service's retention.
    pub(crate) retention: Option<Duration>,
}

impl From<PruneArgs> for PruneConfig {
    fn from(args: PruneArgs) -> Self {
        Self {
            engine: EngineConfig::resolve(args.catalog, None, None),
            retention: args
                .retention_days
                .map(|days| Duration::from_secs(u64::from(days) * SECONDS_PER_DAY)),
        }
    }
}

/// JSON document printed by `haven prune`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PruneReport {
    pub(crate) observations: usize,
    pub(crate) health_indices: usize,
    pub(crate) total: usize,
}

pub(crate) fn run_prune(args: PruneArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_prune_with(args, &DefaultServiceBuilder, &mut stdout)
}

pub(crate) fn run_prune_with(
    args: PruneArgs,
    builder: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.engine.validate_sources()?;
    let service = builder.build(&config.engine)?;
    let summary = service.prune_history(config.retention)?;
    write_json(
        writer,
        &PruneReport {
            observations: summary.observations,
            health_indices: summary.health_indices,
            total: summary.total(),
        },
    )
}
