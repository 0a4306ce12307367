//! Top-level recommendation entry point.
//!
//! [`RecommendationService`] turns a [`UserState`] into a [`Prediction`] by
//! normalising it, deriving a target profile and, when an origin is given,
//! ranking nearby catalog locations against that target.

use std::time::{Duration, SystemTime};

use geo::Coord;
use haven_core::{
    EnvironmentalProfile, FeatureVector, GeoDataSource, HealthIndex, Location, LocationCatalog,
    LocationId, Prediction, PruneSummary, SimilarLocation, UserState,
};
use haven_scorer::{ImprovementScorer, Interpretation, ProfileNormaliser};

use crate::{LocationMatcher, RecommendationError};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Tunables for [`RecommendationService`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Search radius used when the caller gives none.
    pub default_radius_km: f64,
    /// Confidence reported when no location was matched.
    pub fallback_confidence: f64,
    /// Maximum number of ranked entries returned as similar locations.
    pub alternatives: usize,
    /// Anchor of the placeholder coordinates reported without a match.
    pub placeholder_origin: Coord<f64>,
    /// Degrees spanned by the placeholder coordinates.
    pub placeholder_span_degrees: f64,
    /// Number of leading features that drive the placeholder latitude.
    pub placeholder_group: usize,
    /// Age beyond which [`RecommendationService::prune_history`] removes rows
    /// by default.
    pub retention: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_radius_km: 20.0,
            fallback_confidence: 0.85,
            alternatives: 5,
            placeholder_origin: Coord { x: -5.0, y: 40.0 },
            placeholder_span_degrees: 10.0,
            placeholder_group: 7,
            retention: Duration::from_secs(30 * SECONDS_PER_DAY),
        }
    }
}

/// Current health of one catalog location.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    /// The location described.
    pub location: Location,
    /// Characteristics the index was computed from.
    pub characteristics: EnvironmentalProfile,
    /// Latest health index.
    pub index: HealthIndex,
    /// Per-component labels for the index.
    pub interpretations: Vec<Interpretation>,
}

/// Produces predictions and location health reports.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use haven_core::{MemoryCatalog, UserState};
/// use haven_data::GeoDataGateway;
/// use haven_data::test_support::StubGeoDataSource;
/// use haven_matcher::{LocationMatcher, RecommendationService};
///
/// let matcher = LocationMatcher::new(
///     MemoryCatalog::new(),
///     GeoDataGateway::new(StubGeoDataSource::unavailable()),
/// );
/// let service = RecommendationService::new(matcher);
/// let mental = [
///     "stress_level", "anxiety_level", "mood", "sleep_quality",
///     "energy_level", "focus_level", "motivation",
/// ]
/// .map(|name| (name.to_owned(), 5.0));
/// let physical = ["physical_activity_level", "pain_level"].map(|name| (name.to_owned(), 5.0));
/// let state = UserState::new(mental, physical);
///
/// let prediction = service.predict(&state, None, None)?;
/// assert_eq!(prediction.confidence, 0.85);
/// assert!(prediction.similar_locations.is_none());
/// # Ok::<(), haven_matcher::RecommendationError>(())
/// ```
#[derive(Debug)]
pub struct RecommendationService<C, S>
where
    C: LocationCatalog,
    S: GeoDataSource,
{
    matcher: LocationMatcher<C, S>,
    normaliser: ProfileNormaliser,
    improvement: ImprovementScorer,
    config: ServiceConfig,
}

impl<C, S> RecommendationService<C, S>
where
    C: LocationCatalog,
    S: GeoDataSource,
{
    /// Build a service around `matcher` with default scorers.
    #[must_use]
    pub fn new(matcher: LocationMatcher<C, S>) -> Self {
        Self {
            matcher,
            normaliser: ProfileNormaliser::default(),
            improvement: ImprovementScorer::default(),
            config: ServiceConfig::default(),
        }
    }

    /// Replace the profile normaliser.
    #[must_use]
    pub fn with_normaliser(mut self, normaliser: ProfileNormaliser) -> Self {
        self.normaliser = normaliser;
        self
    }

    /// Replace the improvement scorer.
    #[must_use]
    pub fn with_improvement_scorer(mut self, improvement: ImprovementScorer) -> Self {
        self.improvement = improvement;
        self
    }

    /// Replace the service configuration.
    #[must_use]
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Matcher in use.
    #[must_use]
    pub const fn matcher(&self) -> &LocationMatcher<C, S> {
        &self.matcher
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Recommend a place for `state`.
    ///
    /// Without an `origin` (`x` = longitude, `y` = latitude) no matching
    /// happens: the prediction carries the target profile, placeholder
    /// coordinates and the fallback confidence. With an origin but no
    /// location in range the same placeholder is returned with an empty
    /// list of similar locations.
    ///
    /// # Errors
    /// Returns [`RecommendationError::Validation`] for an invalid state,
    /// [`RecommendationError::Match`] for an unusable origin or radius and
    /// [`RecommendationError::Catalog`] when the catalog fails.
    pub fn predict(
        &self,
        state: &UserState,
        origin: Option<Coord<f64>>,
        radius_km: Option<f64>,
    ) -> Result<Prediction, RecommendationError> {
        self.normaliser.validate(state)?;
        let features = self.normaliser.features(state);
        let target = self.normaliser.target_profile(&features);

        let Some(origin) = origin else {
            return Ok(self.placeholder(&features, target, None));
        };
        let radius_km = radius_km.unwrap_or(self.config.default_radius_km);
        let ranked = self.matcher.find_matches(&target, origin, radius_km)?;

        let Some(best) = ranked.first() else {
            log::info!(
                "no catalog location within {radius_km} km of ({}, {})",
                origin.y,
                origin.x
            );
            return Ok(self.placeholder(&features, target, Some(Vec::new())));
        };
        let similar_locations = ranked
            .iter()
            .take(self.config.alternatives)
            .map(SimilarLocation::from)
            .collect();
        Ok(Prediction {
            latitude: best.location.latitude(),
            longitude: best.location.longitude(),
            confidence: best.similarity_score,
            improvement_score: self.improvement.improvement_score(&best.characteristics),
            characteristics: best.characteristics.clone(),
            location_id: Some(best.location.id),
            location_name: Some(best.location.name.clone()),
            distance_km: Some(best.distance_km),
            similar_locations: Some(similar_locations),
        })
    }

    /// Current health of a catalog location, refreshing it if stale.
    ///
    /// # Errors
    /// Returns [`RecommendationError::NotFound`] for an unknown id and
    /// [`RecommendationError::Catalog`] when the catalog fails.
    pub fn health_status(&self, id: LocationId) -> Result<HealthStatus, RecommendationError> {
        let location = self.matcher.catalog().location(id)?;
        let (characteristics, index) = self.matcher.snapshot_for(&location)?;
        let interpretations = self.matcher.health_scorer().interpret(&index);
        Ok(HealthStatus {
            location,
            characteristics,
            index,
            interpretations,
        })
    }

    /// Health indices recorded for `id` over the last `days` days, oldest
    /// first.
    ///
    /// # Errors
    /// Returns [`RecommendationError::NotFound`] for an unknown id and
    /// [`RecommendationError::Catalog`] when the catalog fails.
    pub fn health_trends(
        &self,
        id: LocationId,
        days: u32,
    ) -> Result<Vec<HealthIndex>, RecommendationError> {
        let window = Duration::from_secs(u64::from(days).saturating_mul(SECONDS_PER_DAY));
        let since = self.before_now(window);
        Ok(self.matcher.catalog().health_history(id, since)?)
    }

    /// Delete observations and health indices older than `retention`,
    /// or the configured retention when `None`.
    ///
    /// # Errors
    /// Returns [`RecommendationError::Catalog`] when the catalog fails.
    pub fn prune_history(
        &self,
        retention: Option<Duration>,
    ) -> Result<PruneSummary, RecommendationError> {
        let retention = retention.unwrap_or(self.config.retention);
        let summary = self.matcher.catalog().prune_before(self.before_now(retention))?;
        log::info!(
            "pruned {} observations and {} health indices older than {retention:?}",
            summary.observations,
            summary.health_indices
        );
        Ok(summary)
    }

    fn before_now(&self, age: Duration) -> SystemTime {
        self.matcher
            .now()
            .checked_sub(age)
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    fn placeholder(
        &self,
        features: &FeatureVector,
        target: EnvironmentalProfile,
        similar_locations: Option<Vec<SimilarLocation>>,
    ) -> Prediction {
        let (latitude, longitude) = self.placeholder_position(features);
        Prediction {
            latitude,
            longitude,
            confidence: self.config.fallback_confidence,
            improvement_score: self.improvement.improvement_score(&target),
            characteristics: target,
            location_id: None,
            location_name: None,
            distance_km: None,
            similar_locations,
        }
    }

    /// Coordinates derived from the leading and trailing feature means.
    #[expect(clippy::float_arithmetic, reason = "placeholder coordinate offsets")]
    fn placeholder_position(&self, features: &FeatureVector) -> (f64, f64) {
        let group = self.config.placeholder_group;
        let span = self.config.placeholder_span_degrees;
        let origin = self.config.placeholder_origin;
        let leading = mean(features.values().take(group));
        let trailing = mean(features.values().skip(group));
        (origin.y + leading * span, origin.x + trailing * span)
    }
}

#[expect(clippy::float_arithmetic, reason = "running mean")]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0.0), |(sum, count), value| {
        (sum + value, count + 1.0)
    });
    if count > 0.0 { sum / count } else { 0.0 }
}
