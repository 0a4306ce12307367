//! Wiring shared by every subcommand: catalog and geodata configuration and
//! construction of the recommendation service.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use haven_core::{GeoDataSource, LocationCatalog};
use haven_data::GeoDataGateway;
use haven_data::http::{HttpGeoDataSource, HttpGeoDataSourceConfig};
use haven_matcher::{LocationMatcher, RecommendationService};

use crate::{ARG_CATALOG, CliError, DEFAULT_CATALOG};

/// Recommendation service over type-erased catalog and geodata source.
pub(crate) type Service = RecommendationService<Arc<dyn LocationCatalog>, Arc<dyn GeoDataSource>>;

/// Resolved catalog and geodata settings.
#[derive(Debug, Clone)]
pub(crate) struct EngineConfig {
    /// Path to the SQLite catalog.
    pub(crate) catalog: Utf8PathBuf,
    /// Settings for the HTTP geodata source.
    pub(crate) geodata: HttpGeoDataSourceConfig,
}

impl EngineConfig {
    /// Merge optional layered values over the defaults.
    pub(crate) fn resolve(
        catalog: Option<Utf8PathBuf>,
        base_url: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        let catalog = catalog.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CATALOG));
        let mut geodata = base_url.map_or_else(HttpGeoDataSourceConfig::default, |url| {
            HttpGeoDataSourceConfig::new(url)
        });
        if let Some(key) = api_key {
            geodata = geodata.with_api_key(key);
        }
        Self { catalog, geodata }
    }

    /// Ensure the catalog file exists.
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.catalog, ARG_CATALOG)
    }
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match crate::fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Builds the recommendation service for the current invocation.
pub(crate) trait ServiceBuilder {
    fn build(&self, config: &EngineConfig) -> Result<Service, CliError>;
}

/// Opens the SQLite catalog and an HTTP geodata source.
pub(crate) struct DefaultServiceBuilder;

impl ServiceBuilder for DefaultServiceBuilder {
    fn build(&self, config: &EngineConfig) -> Result<Service, CliError> {
        let catalog = open_catalog(&config.catalog)?;
        let source = HttpGeoDataSource::with_config(config.geodata.clone()).map_err(|source| {
            CliError::BuildGeoDataSource {
                base_url: config.geodata.base_url.clone(),
                source,
            }
        })?;
        let source: Arc<dyn GeoDataSource> = Arc::new(source);
        let matcher = LocationMatcher::new(catalog, GeoDataGateway::new(source));
        Ok(RecommendationService::new(matcher))
    }
}

#[cfg(feature = "store-sqlite")]
fn open_catalog(path: &Utf8Path) -> Result<Arc<dyn LocationCatalog>, CliError> {
    let catalog = haven_core::SqliteCatalog::open(path.as_std_path())?;
    log::debug!("opened catalog at {path}");
    Ok(Arc::new(catalog))
}

#[cfg(not(feature = "store-sqlite"))]
fn open_catalog(_path: &Utf8Path) -> Result<Arc<dyn LocationCatalog>, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "opening a catalog",
    })
}
