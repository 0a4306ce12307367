//! Translate a user's raw state into features and a target profile.
//!
//! Each metric is rescaled linearly against a reference range, so `0.0`
//! sits at the range's lower bound and `1.0` at its upper bound. Metrics
//! outside their reference range extrapolate beyond `0.0..=1.0` unless the
//! metric is marked clamp-only. Missing metrics take the midpoint of their
//! reference range.
//!
//! Normalisation never fails; [`ProfileNormaliser::validate`] is the
//! separate gate that rejects malformed input.

use haven_core::{
    Characteristic, EnvironmentalProfile, FeatureVector, FieldViolation, TargetProfileStrategy,
    UserState, ValidationError, ViolationKind,
};

use crate::OptimalRange;

/// Which half of [`UserState`] a metric is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    /// Mental metrics on a `0..=10` scale.
    Mental,
    /// Physical metrics in native units.
    Physical,
}

/// How one user metric is validated and normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    /// Metric name as it appears in the user state.
    pub name: String,
    /// Map the metric is read from.
    pub source: MetricSource,
    /// Range mapped onto `0.0..=1.0`.
    pub reference: OptimalRange,
    /// Inclusive bounds accepted by validation.
    pub accepted: OptimalRange,
    /// Whether validation rejects a missing value.
    pub required: bool,
    /// Whether the normalised value is clamped to `0.0..=1.0`.
    pub clamp: bool,
}

impl MetricSpec {
    /// A required `0..=10` scale metric, clamped after normalisation.
    #[must_use]
    pub fn scale_of_ten(name: &str, source: MetricSource) -> Self {
        let scale = OptimalRange::fixed(0.0, 10.0);
        Self {
            name: name.to_owned(),
            source,
            reference: scale,
            accepted: scale,
            required: true,
            clamp: true,
        }
    }

    /// An optional vital sign that extrapolates outside its reference range.
    #[must_use]
    pub fn vital(name: &str, reference: OptimalRange, accepted: OptimalRange) -> Self {
        Self {
            name: name.to_owned(),
            source: MetricSource::Physical,
            reference,
            accepted,
            required: false,
            clamp: false,
        }
    }

    fn read(&self, state: &UserState) -> Option<f64> {
        match self.source {
            MetricSource::Mental => state.mental(&self.name),
            MetricSource::Physical => state.physical(&self.name),
        }
    }

    fn normalise(&self, raw: Option<f64>) -> f64 {
        let Some(value) = raw.filter(|value| value.is_finite()) else {
            if raw.is_some() {
                log::debug!("treating non-finite {} as missing", self.name);
            }
            return self.reference.rescale(self.reference.midpoint());
        };
        let scaled = self.reference.rescale(value);
        if self.clamp {
            scaled.clamp(0.0, 1.0)
        } else {
            scaled
        }
    }

    fn check(&self, raw: Option<f64>) -> Option<FieldViolation> {
        let kind = match raw {
            None if self.required => ViolationKind::Missing,
            None => return None,
            Some(value) if !value.is_finite() => ViolationKind::NotFinite,
            Some(value) if !self.accepted.contains(value) => ViolationKind::OutOfRange { value },
            Some(_) => return None,
        };
        Some(FieldViolation {
            field: self.name.clone(),
            kind,
            min: self.accepted.min(),
            max: self.accepted.max(),
        })
    }
}

/// Ordered metric table driving feature extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct NormaliserConfig {
    /// Metrics in feature-vector order.
    pub metrics: Vec<MetricSpec>,
}

impl Default for NormaliserConfig {
    fn default() -> Self {
        let mental = [
            "stress_level",
            "anxiety_level",
            "mood",
            "sleep_quality",
            "energy_level",
            "focus_level",
            "motivation",
        ]
        .into_iter()
        .map(|name| MetricSpec::scale_of_ten(name, MetricSource::Mental));

        let vitals = [
            ("heart_rate", (60.0, 100.0), (20.0, 250.0)),
            ("blood_pressure_systolic", (90.0, 140.0), (50.0, 260.0)),
            ("blood_pressure_diastolic", (60.0, 90.0), (30.0, 160.0)),
            ("body_temperature", (36.0, 38.0), (30.0, 45.0)),
            ("respiratory_rate", (12.0, 20.0), (4.0, 60.0)),
        ]
        .into_iter()
        .map(|(name, (low, high), (floor, ceiling))| {
            MetricSpec::vital(
                name,
                OptimalRange::fixed(low, high),
                OptimalRange::fixed(floor, ceiling),
            )
        });

        let physical_scales = ["physical_activity_level", "pain_level"]
            .into_iter()
            .map(|name| MetricSpec::scale_of_ten(name, MetricSource::Physical));

        Self {
            metrics: mental.chain(vitals).chain(physical_scales).collect(),
        }
    }
}

/// Placeholder mapping that ignores the user's features.
///
/// Returns the same comfortable outdoor profile for every input until a
/// learned strategy is substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTargetProfile {
    profile: EnvironmentalProfile,
}

impl FixedTargetProfile {
    /// Use `profile` as the constant target.
    #[must_use]
    pub const fn new(profile: EnvironmentalProfile) -> Self {
        Self { profile }
    }
}

impl Default for FixedTargetProfile {
    fn default() -> Self {
        Self::new(
            [
                (Characteristic::Temperature, 22.5),
                (Characteristic::Humidity, 50.0),
                (Characteristic::AirPressure, 1015.0),
                (Characteristic::AirQuality, 30.0),
                (Characteristic::Elevation, 500.0),
                (Characteristic::SunshineHours, 7.0),
                (Characteristic::WindSpeed, 10.0),
                (Characteristic::Precipitation, 2.0),
                (Characteristic::UvIndex, 4.0),
                (Characteristic::NoiseLevel, 50.0),
            ]
            .into_iter()
            .collect(),
        )
    }
}

impl TargetProfileStrategy for FixedTargetProfile {
    fn target_profile(&self, _features: &FeatureVector) -> EnvironmentalProfile {
        self.profile.clone()
    }
}

/// Validates user state, extracts features and derives the target profile.
///
/// # Examples
///
/// ```
/// use haven_core::{Characteristic, UserState};
/// use haven_scorer::ProfileNormaliser;
///
/// let normaliser = ProfileNormaliser::default();
/// let state = UserState::new([("stress_level".to_owned(), 8.0)], [("heart_rate".to_owned(), 110.0)]);
///
/// let features = normaliser.features(&state);
/// assert_eq!(features.get("stress_level"), Some(0.8));
/// assert_eq!(features.get("mood"), Some(0.5));
/// assert!((features.get("heart_rate").unwrap() - 1.25).abs() < 1e-12);
///
/// let target = normaliser.target_profile(&features);
/// assert_eq!(target.get(Characteristic::Temperature), Some(22.5));
/// ```
pub struct ProfileNormaliser {
    config: NormaliserConfig,
    strategy: Box<dyn TargetProfileStrategy>,
}

impl std::fmt::Debug for ProfileNormaliser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileNormaliser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ProfileNormaliser {
    fn default() -> Self {
        Self::new(
            NormaliserConfig::default(),
            Box::new(FixedTargetProfile::default()),
        )
    }
}

impl ProfileNormaliser {
    /// Build a normaliser from a metric table and a target strategy.
    #[must_use]
    pub fn new(config: NormaliserConfig, strategy: Box<dyn TargetProfileStrategy>) -> Self {
        Self { config, strategy }
    }

    /// Metric table in use.
    #[must_use]
    pub const fn config(&self) -> &NormaliserConfig {
        &self.config
    }

    /// Check every metric, reporting all violations together.
    ///
    /// Unknown metric names are ignored.
    ///
    /// # Errors
    /// Returns [`ValidationError`] listing each missing required metric and
    /// each non-finite or out-of-bounds value.
    pub fn validate(&self, state: &UserState) -> Result<(), ValidationError> {
        let violations: Vec<_> = self
            .config
            .metrics
            .iter()
            .filter_map(|metric| metric.check(metric.read(state)))
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }

    /// Normalised features in table order.
    #[must_use]
    pub fn features(&self, state: &UserState) -> FeatureVector {
        FeatureVector::new(
            self.config
                .metrics
                .iter()
                .map(|metric| (metric.name.clone(), metric.normalise(metric.read(state)))),
        )
    }

    /// Target environment for the given features.
    #[must_use]
    pub fn target_profile(&self, features: &FeatureVector) -> EnvironmentalProfile {
        self.strategy.target_profile(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn neutral_state() -> UserState {
        let mental = [
            "stress_level",
            "anxiety_level",
            "mood",
            "sleep_quality",
            "energy_level",
            "focus_level",
            "motivation",
        ]
        .into_iter()
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
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value));
        UserState::new(mental, physical)
    }

    #[fixture]
    fn normaliser() -> ProfileNormaliser {
        ProfileNormaliser::default()
    }

    #[rstest]
    fn neutral_state_normalises_to_midpoints(normaliser: ProfileNormaliser) {
        let state = neutral_state();
        normaliser.validate(&state).expect("neutral state is valid");
        let features = normaliser.features(&state);
        assert_eq!(features.len(), 14);
        assert!(features.values().all(|value| (value - 0.5).abs() < 1e-12));
    }

    #[rstest]
    fn missing_metrics_default_to_midpoint(normaliser: ProfileNormaliser) {
        let features = normaliser.features(&UserState::default());
        assert_eq!(features.get("sleep_quality"), Some(0.5));
        assert_eq!(features.get("body_temperature"), Some(0.5));
    }

    #[rstest]
    #[case("heart_rate", 50.0, -0.25)]
    #[case("respiratory_rate", 24.0, 1.5)]
    fn vitals_extrapolate(
        normaliser: ProfileNormaliser,
        #[case] metric: &str,
        #[case] value: f64,
        #[case] expected: f64,
    ) {
        let state = UserState::new([], [(metric.to_owned(), value)]);
        let features = normaliser.features(&state);
        let actual = features.get(metric).expect("feature present");
        assert!((actual - expected).abs() < 1e-12);
    }

    #[rstest]
    fn scale_metrics_are_clamped(normaliser: ProfileNormaliser) {
        let state = UserState::new([("mood".to_owned(), 14.0)], [("pain_level".to_owned(), -2.0)]);
        let features = normaliser.features(&state);
        assert_eq!(features.get("mood"), Some(1.0));
        assert_eq!(features.get("pain_level"), Some(0.0));
    }

    #[rstest]
    fn validation_reports_every_problem(normaliser: ProfileNormaliser) {
        let state = UserState::new(
            [("stress_level".to_owned(), 11.0), ("mood".to_owned(), f64::NAN)],
            [("heart_rate".to_owned(), 300.0)],
        );
        let error = normaliser.validate(&state).expect_err("state is invalid");

        assert!(error.mentions("stress_level"));
        assert!(error.mentions("mood"));
        assert!(error.mentions("heart_rate"));
        assert!(error.mentions("pain_level"));
        assert!(!error.mentions("respiratory_rate"));
        let stress = error
            .violations
            .iter()
            .find(|violation| violation.field == "stress_level")
            .expect("stress violation");
        assert_eq!(stress.kind, ViolationKind::OutOfRange { value: 11.0 });
        assert_eq!((stress.min, stress.max), (0.0, 10.0));
    }

    #[rstest]
    fn unknown_metrics_are_ignored(normaliser: ProfileNormaliser) {
        let mut state = neutral_state().mental_metrics().clone();
        state.insert("curiosity".to_owned(), 42.0);
        let physical = neutral_state().physical_metrics().clone();
        let with_extra = UserState::new(state, physical);
        assert!(normaliser.validate(&with_extra).is_ok());
        assert_eq!(normaliser.features(&with_extra).get("curiosity"), None);
    }

    #[rstest]
    fn fixed_target_ignores_features(normaliser: ProfileNormaliser) {
        let calm = normaliser.features(&neutral_state());
        let stressed = normaliser.features(&UserState::new([("stress_level".to_owned(), 10.0)], []));
        assert_eq!(
            normaliser.target_profile(&calm),
            normaliser.target_profile(&stressed)
        );
        assert_eq!(normaliser.target_profile(&calm).len(), 10);
    }
}
