//! Behavioural tests for [`GeoDataGateway`].
//!
//! These tests use [`StubGeoDataSource`] to verify failure absorption and
//! merging without requiring a running geodata service.

use std::cell::RefCell;
use std::sync::Arc;

use haven_core::geodata::variables;
use haven_core::{Characteristic, Dataset, DatasetSample, EnvironmentalProfile};
use haven_data::test_support::StubGeoDataSource;
use haven_data::{GeoDataGateway, default_characteristics};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

type SourceCell = RefCell<Option<Arc<StubGeoDataSource>>>;
type ProfileCell = RefCell<Option<EnvironmentalProfile>>;

#[fixture]
fn source() -> SourceCell {
    RefCell::new(None)
}

#[fixture]
fn profile() -> ProfileCell {
    RefCell::new(None)
}

fn characteristic(profile: &ProfileCell, characteristic: Characteristic) -> f64 {
    profile
        .borrow()
        .as_ref()
        .and_then(|profile| profile.get(characteristic))
        .unwrap_or_else(|| panic!("{characteristic} should be present"))
}

// --- Given steps ---

#[given("a geodata source where every dataset fails")]
fn source_unavailable(#[from(source)] source: &SourceCell) {
    *source.borrow_mut() = Some(Arc::new(StubGeoDataSource::unavailable()));
}

#[given("a geodata source where only the climate dataset answers")]
fn source_with_climate(#[from(source)] source: &SourceCell) {
    let climate = DatasetSample::new()
        .with_variable(variables::TEMPERATURE_2M, vec![293.15])
        .with_variable(variables::DEWPOINT_2M, vec![283.15])
        .with_variable(variables::SURFACE_PRESSURE, vec![101_200.0]);
    *source.borrow_mut() = Some(Arc::new(
        StubGeoDataSource::unavailable().with_sample(Dataset::Climate, climate),
    ));
}

// --- When steps ---

#[when("characteristics are requested for central London")]
fn request_london(#[from(source)] source: &SourceCell, #[from(profile)] profile: &ProfileCell) {
    let guard = source.borrow();
    let stub = guard.as_ref().expect("source must be initialised");
    let gateway = GeoDataGateway::new(Arc::clone(stub));
    *profile.borrow_mut() = Some(gateway.get_characteristics(51.5074, -0.1278));
}

// --- Then steps ---

#[then("the characteristics equal the defaults table")]
fn then_defaults(#[from(profile)] profile: &ProfileCell) {
    assert_eq!(profile.borrow().as_ref(), Some(&default_characteristics()));
}

#[then("the temperature comes from the climate dataset")]
fn then_temperature(#[from(profile)] profile: &ProfileCell) {
    let temperature = characteristic(profile, Characteristic::Temperature);
    assert!((temperature - 20.0).abs() < 1e-9, "got {temperature}");
}

#[then("the humidity is derived from the dewpoint")]
fn then_humidity(#[from(profile)] profile: &ProfileCell) {
    let humidity = characteristic(profile, Characteristic::Humidity);
    assert!((humidity - 52.54).abs() < 0.01, "got {humidity}");
}

#[then("the air quality comes from the defaults table")]
fn then_air_quality(#[from(profile)] profile: &ProfileCell) {
    assert_eq!(characteristic(profile, Characteristic::AirQuality), 50.0);
    assert_eq!(characteristic(profile, Characteristic::AirPressure), 1012.0);
}

#[then("each of the four datasets was requested once")]
fn then_four_requests(#[from(source)] source: &SourceCell) {
    let guard = source.borrow();
    let stub = guard.as_ref().expect("source must be initialised");
    assert_eq!(stub.calls(), 4);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/gateway.feature", name = $title)]
        fn $fn_name(source: SourceCell, profile: ProfileCell) {
            let _ = (source, profile);
        }
    };
}

register_scenario!(
    total_failure_yields_defaults,
    "Every provider failing yields the defaults table"
);
register_scenario!(
    partial_failure_keeps_answers,
    "A partial failure keeps the datasets that answered"
);
register_scenario!(
    datasets_requested_once,
    "Every dataset is requested once per lookup"
);
