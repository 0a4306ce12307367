//! Error types emitted by the Haven CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use haven_data::http::SourceBuildError;
use haven_matcher::RecommendationError;
use thiserror::Error;

/// Errors emitted by the Haven CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the predict request file failed.
    #[error("failed to open predict request at {path:?}: {source}")]
    OpenRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Predict request JSON could not be decoded.
    #[error("failed to parse predict request JSON at {path:?}: {source}")]
    ParseRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The request carried only one of latitude and longitude.
    #[error("predict request at {path:?} must give both latitude and longitude or neither")]
    IncompleteOrigin { path: Utf8PathBuf },
    /// Opening the SQLite catalog failed.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    OpenCatalog(#[from] haven_core::SqliteCatalogError),
    /// Constructing the geodata source failed.
    #[error("failed to build geodata source for {base_url:?}: {source}")]
    BuildGeoDataSource {
        base_url: String,
        #[source]
        source: SourceBuildError,
    },
    /// The recommendation engine rejected the request.
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
