#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for health index scoring.

use std::cell::RefCell;
use std::time::SystemTime;

use haven_core::{Characteristic, EnvironmentalProfile, HealthComponent, HealthIndex};
use haven_scorer::{HealthIndexScorer, HealthStatusLabel};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Shared state for health index scenarios.
pub struct TestContext {
    scorer: RefCell<Option<HealthIndexScorer>>,
    profile: RefCell<EnvironmentalProfile>,
    index: RefCell<Option<HealthIndex>>,
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        scorer: RefCell::new(None),
        profile: RefCell::new(EnvironmentalProfile::new()),
        index: RefCell::new(None),
    }
}

fn scored(context: &TestContext) -> HealthIndex {
    context
        .index
        .borrow()
        .clone()
        .expect("profile should have been scored")
}

#[given("the default health index scorer")]
fn default_scorer(context: &TestContext) {
    *context.scorer.borrow_mut() = Some(HealthIndexScorer::default());
}

#[given("a profile with a PM2.5 reading of ten thousand")]
fn extreme_pm25(context: &TestContext) {
    *context.profile.borrow_mut() = EnvironmentalProfile::new()
        .with(Characteristic::Pm25, 10_000.0)
        .with(Characteristic::Temperature, 21.0);
}

#[given("an empty profile")]
fn empty_profile(context: &TestContext) {
    *context.profile.borrow_mut() = EnvironmentalProfile::new();
}

#[given("a profile at the centre of every comfortable range")]
fn centred_profile(context: &TestContext) {
    let scorer = context.scorer.borrow();
    let config = scorer.as_ref().expect("scorer configured").config();
    let mut profile = EnvironmentalProfile::new();
    for component in [
        HealthComponent::Climate,
        HealthComponent::Environmental,
        HealthComponent::Noise,
    ] {
        profile.extend(config.table(component).midpoint_profile().iter());
    }
    // Pollutants score best at their lower bound.
    for (characteristic, range) in config.air_quality.iter() {
        profile.insert(characteristic, range.min());
    }
    *context.profile.borrow_mut() = profile;
}

#[when("the profile is scored")]
fn score_profile(context: &TestContext) {
    let scorer = context.scorer.borrow();
    let index = scorer
        .as_ref()
        .expect("scorer configured")
        .score(&context.profile.borrow(), SystemTime::UNIX_EPOCH);
    *context.index.borrow_mut() = Some(index);
}

#[then("the air quality component is zero")]
fn air_quality_zero(context: &TestContext) {
    assert_eq!(scored(context).components.air_quality, 0.0);
}

#[then("every component lies between zero and one")]
fn components_in_unit_range(context: &TestContext) {
    let index = scored(context);
    assert!(index
        .components
        .iter()
        .all(|(_, score)| (0.0..=1.0).contains(&score)));
    assert!((0.0..=1.0).contains(&index.overall));
}

#[then("an air quality recommendation is given")]
fn air_quality_recommendation(context: &TestContext) {
    assert!(scored(context)
        .recommendations
        .iter()
        .any(|text| text.starts_with("Air quality is suboptimal")));
}

#[then("every component is one half")]
fn components_neutral(context: &TestContext) {
    let index = scored(context);
    assert!(index.components.iter().all(|(_, score)| score == 0.5));
    assert_eq!(index.overall, 0.5);
}

#[then("the limited data disclaimer is given")]
fn limited_data_disclaimer(context: &TestContext) {
    assert_eq!(
        scored(context).recommendations.first().map(String::as_str),
        Some("Limited data available. Health index is based on default values.")
    );
}

#[then("the overall score is one")]
fn overall_is_one(context: &TestContext) {
    assert!((scored(context).overall - 1.0).abs() < 1e-9);
}

#[then("no recommendation is given")]
fn no_recommendation(context: &TestContext) {
    assert!(scored(context).recommendations.is_empty());
}

#[then("every component is interpreted as excellent")]
fn interpreted_excellent(context: &TestContext) {
    let scorer = context.scorer.borrow();
    let readings = scorer
        .as_ref()
        .expect("scorer configured")
        .interpret(&scored(context));
    assert_eq!(readings.len(), 4);
    assert!(readings
        .iter()
        .all(|reading| reading.status == HealthStatusLabel::Excellent));
}

#[scenario(path = "tests/features/health_index.feature", index = 0)]
fn extreme_pollution_clamps(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/health_index.feature", index = 1)]
fn empty_profile_is_neutral(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/health_index.feature", index = 2)]
fn ideal_conditions_score_full_marks(context: TestContext) {
    let _ = context;
}
