//! Behavioural tests for [`RecommendationService`].
#![expect(clippy::expect_used, reason = "tests should fail fast when setup breaks")]
#![expect(clippy::float_arithmetic, reason = "tests offset coordinates")]

use std::cell::RefCell;
use std::sync::Arc;

use geo::Coord;
use haven_core::test_support::ManualClock;
use haven_core::{
    FeatureVector, GeoAttributes, Location, LocationId, MemoryCatalog, Prediction,
    TargetProfileStrategy, UserState,
};
use haven_data::GeoDataGateway;
use haven_data::test_support::StubGeoDataSource;
use haven_matcher::{LocationMatcher, RecommendationService};
use haven_scorer::FixedTargetProfile;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

type Service = RecommendationService<MemoryCatalog, Arc<StubGeoDataSource>>;
type ServiceCell = RefCell<Option<Service>>;
type SourceCell = RefCell<Option<Arc<StubGeoDataSource>>>;
type StateCell = RefCell<Option<UserState>>;
type PredictionCell = RefCell<Option<Prediction>>;

const PARK: Coord<f64> = Coord {
    x: -0.1167,
    y: 51.5033,
};

#[fixture]
fn service() -> ServiceCell {
    RefCell::new(None)
}

#[fixture]
fn source() -> SourceCell {
    RefCell::new(None)
}

#[fixture]
fn state() -> StateCell {
    RefCell::new(None)
}

#[fixture]
fn prediction() -> PredictionCell {
    RefCell::new(None)
}

fn predicted(prediction: &PredictionCell) -> Prediction {
    prediction
        .borrow()
        .clone()
        .expect("prediction should have been made")
}

fn request(
    service: &ServiceCell,
    state: &StateCell,
    prediction: &PredictionCell,
    origin: Option<Coord<f64>>,
    radius_km: Option<f64>,
) {
    let service_guard = service.borrow();
    let state_guard = state.borrow();
    let result = service_guard
        .as_ref()
        .expect("service must be initialised")
        .predict(
            state_guard.as_ref().expect("state must be initialised"),
            origin,
            radius_km,
        )
        .expect("prediction should succeed");
    *prediction.borrow_mut() = Some(result);
}

// --- Given steps ---

#[given("a catalog with a riverside park")]
fn catalog_with_park(#[from(service)] service: &ServiceCell, #[from(source)] source: &SourceCell) {
    let park = Location::new(LocationId(1), "Riverside Park", PARK).with_attributes(GeoAttributes {
        greenness: Some(0.8),
        water_proximity_m: Some(50.0),
        ..GeoAttributes::default()
    });
    let stub = Arc::new(StubGeoDataSource::unavailable());
    let matcher = LocationMatcher::new(
        MemoryCatalog::with_location(park),
        GeoDataGateway::new(Arc::clone(&stub)),
    )
    .with_clock(Arc::new(ManualClock::at_epoch_secs(1_700_000_000)));
    *service.borrow_mut() = Some(RecommendationService::new(matcher));
    *source.borrow_mut() = Some(stub);
}

#[given("a user whose metrics all sit mid-range")]
fn mid_range_user(#[from(state)] state: &StateCell) {
    let mental = [
        "stress_level",
        "anxiety_level",
        "mood",
        "sleep_quality",
        "energy_level",
        "focus_level",
        "motivation",
    ]
    .map(|name| (name.to_owned(), 5.0));
    let physical = [
        ("heart_rate", 80.0),
        ("blood_pressure_systolic", 115.0),
        ("blood_pressure_diastolic", 75.0),
        ("body_temperature", 37.0),
        ("respiratory_rate", 16.0),
        ("physical_activity_level", 5.0),
        ("pain_level", 5.0),
    ]
    .map(|(name, value)| (name.to_owned(), value));
    *state.borrow_mut() = Some(UserState::new(mental, physical));
}

// --- When steps ---

#[when("a prediction is requested without coordinates")]
fn predict_without_origin(
    #[from(service)] service: &ServiceCell,
    #[from(state)] state: &StateCell,
    #[from(prediction)] prediction: &PredictionCell,
) {
    request(service, state, prediction, None, None);
}

#[when("a prediction is requested one kilometre away with a zero radius")]
fn predict_with_zero_radius(
    #[from(service)] service: &ServiceCell,
    #[from(state)] state: &StateCell,
    #[from(prediction)] prediction: &PredictionCell,
) {
    let origin = Coord {
        x: PARK.x,
        y: PARK.y + 0.009,
    };
    request(service, state, prediction, Some(origin), Some(0.0));
}

#[when("a prediction is requested beside the park")]
fn predict_beside_park(
    #[from(service)] service: &ServiceCell,
    #[from(state)] state: &StateCell,
    #[from(prediction)] prediction: &PredictionCell,
) {
    request(service, state, prediction, Some(PARK), None);
}

// --- Then steps ---

#[then("the confidence is the fallback placeholder")]
fn then_fallback_confidence(#[from(prediction)] prediction: &PredictionCell) {
    assert_eq!(predicted(prediction).confidence, 0.85);
}

#[then("no similar locations are listed")]
fn then_no_similar(#[from(prediction)] prediction: &PredictionCell) {
    assert!(predicted(prediction).similar_locations.is_none());
}

#[then("the characteristics equal the target profile")]
fn then_target_profile(#[from(prediction)] prediction: &PredictionCell) {
    let target = FixedTargetProfile::default().target_profile(&FeatureVector::default());
    assert_eq!(predicted(prediction).characteristics, target);
}

#[then("the similar locations list is empty")]
fn then_empty_similar(#[from(prediction)] prediction: &PredictionCell) {
    assert_eq!(predicted(prediction).similar_locations, Some(Vec::new()));
}

#[then("the riverside park is recommended")]
fn then_park(#[from(prediction)] prediction: &PredictionCell) {
    let result = predicted(prediction);
    assert_eq!(result.location_name.as_deref(), Some("Riverside Park"));
    assert_eq!(result.distance_km, Some(0.0));
    assert_eq!(result.similar_locations.map(|list| list.len()), Some(1));
}

#[then("its characteristics were fetched once")]
fn then_fetched_once(#[from(source)] source: &SourceCell) {
    let guard = source.borrow();
    let stub = guard.as_ref().expect("source must be initialised");
    assert_eq!(stub.calls(), 4);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/recommendation.feature", name = $title)]
        fn $fn_name(
            service: ServiceCell,
            source: SourceCell,
            state: StateCell,
            prediction: PredictionCell,
        ) {
            let _ = (service, source, state, prediction);
        }
    };
}

register_scenario!(
    no_coordinates_returns_target,
    "A request without coordinates returns the target profile"
);
register_scenario!(
    zero_radius_excludes_elsewhere,
    "A zero radius excludes every location elsewhere"
);
register_scenario!(
    nearby_park_is_recommended,
    "A nearby park is recommended with fresh data"
);
