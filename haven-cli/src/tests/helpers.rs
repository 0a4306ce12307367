//! Test helpers: temporary workspaces and an in-memory service builder.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use haven_core::test_support::ManualClock;
use haven_core::{
    GeoAttributes, GeoDataSource, Location, LocationCatalog, LocationId, MemoryCatalog,
};
use haven_data::GeoDataGateway;
use haven_data::test_support::StubGeoDataSource;
use haven_matcher::{LocationMatcher, RecommendationService};
use tempfile::TempDir;

use crate::{CliError, EngineConfig, Service, ServiceBuilder};

/// Position of the single catalog location served by [`StubServiceBuilder`].
pub(super) const MEADOW: Coord<f64> = Coord {
    x: -1.2577,
    y: 51.7520,
};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Temporary directory holding a placeholder catalog and a request path.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) catalog: Utf8PathBuf,
    pub(super) request: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let catalog = root.join("haven.db");
        let request = root.join("request.json");
        write_utf8(&catalog, b"placeholder catalog");
        Self {
            _dir: dir,
            root,
            catalog,
            request,
        }
    }

    pub(super) fn write_request(&self, payload: &str) {
        write_utf8(&self.request, payload.as_bytes());
    }
}

/// Mid-range predict request, optionally centred on a position.
pub(super) fn request_json(origin: Option<Coord<f64>>) -> String {
    let position = origin.map_or_else(String::new, |coord| {
        format!(r#", "latitude": {}, "longitude": {}"#, coord.y, coord.x)
    });
    format!(
        r#"{{
  "mental_state": {{
    "stress_level": 5, "anxiety_level": 5, "mood": 5, "sleep_quality": 5,
    "energy_level": 5, "focus_level": 5, "motivation": 5
  }},
  "physical_state": {{
    "heart_rate": 80, "physical_activity_level": 5, "pain_level": 5
  }}{position}
}}"#
    )
}

/// Builds a service over an in-memory catalog with one meadow and an
/// unavailable geodata source.
pub(super) struct StubServiceBuilder {
    pub(super) clock: Arc<ManualClock>,
}

impl StubServiceBuilder {
    pub(super) fn new() -> Self {
        Self {
            clock: Arc::new(ManualClock::at_epoch_secs(1_700_000_000)),
        }
    }
}

impl ServiceBuilder for StubServiceBuilder {
    fn build(&self, _config: &EngineConfig) -> Result<Service, CliError> {
        let meadow = Location::new(LocationId(3), "Port Meadow", MEADOW).with_attributes(
            GeoAttributes {
                greenness: Some(0.85),
                ..GeoAttributes::default()
            },
        );
        let catalog: Arc<dyn LocationCatalog> = Arc::new(MemoryCatalog::with_location(meadow));
        let source: Arc<dyn GeoDataSource> = Arc::new(StubGeoDataSource::unavailable());
        let matcher = LocationMatcher::new(catalog, GeoDataGateway::new(source))
            .with_clock(self.clock.clone());
        Ok(RecommendationService::new(matcher))
    }
}
