//! Predict command implementation for the Haven CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geo::Coord;
use haven_core::{Prediction, UserState};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};

use crate::engine::require_existing;
use crate::fs::open_utf8_file;
use crate::{
    ARG_CATALOG, ARG_GEODATA_API_KEY, ARG_GEODATA_BASE_URL, ARG_PREDICT_REQUEST, ARG_RADIUS_KM,
    CliError, DefaultServiceBuilder, ENV_PREDICT_REQUEST, EngineConfig, ServiceBuilder, write_json,
};

/// CLI arguments for the `predict` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Recommend an outdoor location for a user. The request is a \
                 JSON document with mental_state and physical_state maps and \
                 optional latitude, longitude and radius_km. Without \
                 coordinates the target environment is returned instead of \
                 a catalog match.",
    about = "Recommend a location for a user state"
)]
#[ortho_config(prefix = "HAVEN")]
pub(crate) struct PredictArgs {
    /// Path to a JSON file containing the predict request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
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
    /// Search radius used when the request gives none.
    #[arg(long = ARG_RADIUS_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) radius_km: Option<f64>,
}

impl PredictArgs {
    pub(crate) fn into_config(self) -> Result<PredictConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PredictConfig::try_from(merged)
    }
}

/// Resolved `predict` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct PredictConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Catalog and geodata settings.
    pub(crate) engine: EngineConfig,
    /// Radius applied when the request omits one.
    pub(crate) radius_km: Option<f64>,
}

impl PredictConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_PREDICT_REQUEST)?;
        self.engine.validate_sources()
    }
}

impl TryFrom<PredictArgs> for PredictConfig {
    type Error = CliError;

    fn try_from(args: PredictArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PREDICT_REQUEST,
            env: ENV_PREDICT_REQUEST,
        })?;
        Ok(Self {
            request_path,
            engine: EngineConfig::resolve(args.catalog, args.geodata_base_url, args.geodata_api_key),
            radius_km: args.radius_km,
        })
    }
}

/// Body of a predict request file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct PredictRequest {
    /// Mental and physical metrics.
    #[serde(flatten)]
    pub(crate) state: UserState,
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    #[serde(default)]
    pub(crate) radius_km: Option<f64>,
}

impl PredictRequest {
    /// Search origin, if the request names one.
    fn origin(&self, path: &Utf8Path) -> Result<Option<Coord<f64>>, CliError> {
        match (self.latitude, self.longitude) {
            (Some(y), Some(x)) => Ok(Some(Coord { x, y })),
            (None, None) => Ok(None),
            _ => Err(CliError::IncompleteOrigin {
                path: path.to_path_buf(),
            }),
        }
    }
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_predict_with(args, &DefaultServiceBuilder, &mut stdout)
}

pub(crate) fn run_predict_with(
    args: PredictArgs,
    builder: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let prediction = execute_predict(args, builder)?;
    write_json(writer, &prediction)
}

fn execute_predict(
    args: PredictArgs,
    builder: &dyn ServiceBuilder,
) -> Result<Prediction, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let request = load_predict_request(&config.request_path)?;
    let origin = request.origin(&config.request_path)?;
    let service = builder.build(&config.engine)?;
    let radius_km = request.radius_km.or(config.radius_km);
    Ok(service.predict(&request.state, origin, radius_km)?)
}

/// Loads a JSON-encoded [`PredictRequest`] from disk.
pub(crate) fn load_predict_request(path: &Utf8Path) -> Result<PredictRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PredictConfig, CliError> {
    let merged = PredictArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PredictConfig::try_from(merged)
}
