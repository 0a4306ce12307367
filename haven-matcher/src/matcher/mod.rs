//! Radius-limited ranking of catalog locations against a target profile.
//!
//! Matching keeps the catalog fresh as a side effect: any candidate whose
//! characteristics or health index have aged out is refreshed through the
//! [`GeoDataGateway`] before it is scored, so results never mix fresh and
//! stale data.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use geo::Coord;
use haven_core::{
    CatalogError, Clock, EnvironmentalProfile, GeoDataSource, HealthIndex, Location,
    LocationCatalog, Observation, RankedCandidate, SystemClock,
};
use haven_data::GeoDataGateway;
use haven_scorer::{ConfigError, HealthIndexScorer, SimilarityScorer};

use crate::MatchError;
use crate::distance::geodesic_km;
use crate::refresh::{RefreshLocks, hold};

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Configuration for [`LocationMatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Maximum age of characteristics and health indices used for scoring.
    pub freshness_window: Duration,
    /// Weight of similarity in the combined score.
    pub similarity_weight: f64,
    /// Weight of the overall health index in the combined score.
    pub health_weight: f64,
    /// Upper bound on concurrent refreshes within one request.
    pub refresh_parallelism: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(60 * 60),
            similarity_weight: 0.6,
            health_weight: 0.4,
            refresh_parallelism: 8,
        }
    }
}

impl MatcherConfig {
    /// Check the combined-score weights.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidWeight`] for a negative or non-finite
    /// weight and [`ConfigError::WeightsDoNotSumToOne`] when the weights do
    /// not add up to one.
    #[expect(clippy::float_arithmetic, reason = "summing weights")]
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("similarity_weight", self.similarity_weight),
            ("health_weight", self.health_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    name: name.to_owned(),
                    value,
                });
            }
        }
        let total = self.similarity_weight + self.health_weight;
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne { total });
        }
        Ok(())
    }
}

/// Characteristics and health index current enough to score.
#[derive(Debug, Clone)]
struct Snapshot {
    profile: EnvironmentalProfile,
    index: HealthIndex,
}

/// A candidate inside the search radius.
struct InRadius {
    location: Location,
    distance_km: f64,
}

/// Ranks catalog locations by similarity to a target profile and health.
///
/// The matcher is generic over the catalog and the upstream geodata source
/// so tests can substitute in-memory doubles for both.
pub struct LocationMatcher<C, S>
where
    C: LocationCatalog,
    S: GeoDataSource,
{
    catalog: C,
    gateway: GeoDataGateway<S>,
    similarity: SimilarityScorer,
    health: HealthIndexScorer,
    clock: Arc<dyn Clock>,
    config: MatcherConfig,
    locks: RefreshLocks,
}

impl<C, S> std::fmt::Debug for LocationMatcher<C, S>
where
    C: LocationCatalog,
    S: GeoDataSource,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationMatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C, S> LocationMatcher<C, S>
where
    C: LocationCatalog,
    S: GeoDataSource,
{
    /// Construct a matcher using default configuration and scorers.
    #[must_use]
    pub fn new(catalog: C, gateway: GeoDataGateway<S>) -> Self {
        Self {
            catalog,
            gateway,
            similarity: SimilarityScorer::default(),
            health: HealthIndexScorer::default(),
            clock: Arc::new(SystemClock),
            config: MatcherConfig::default(),
            locks: RefreshLocks::default(),
        }
    }

    /// Replace the configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the combined-score weights are invalid.
    pub fn with_config(mut self, config: MatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replace the clock used for freshness decisions and timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the similarity scorer.
    #[must_use]
    pub fn with_similarity_scorer(mut self, similarity: SimilarityScorer) -> Self {
        self.similarity = similarity;
        self
    }

    /// Replace the health index scorer.
    #[must_use]
    pub fn with_health_scorer(mut self, health: HealthIndexScorer) -> Self {
        self.health = health;
        self
    }

    /// Catalog in use.
    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Health index scorer in use.
    #[must_use]
    pub const fn health_scorer(&self) -> &HealthIndexScorer {
        &self.health
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Current time according to the matcher's clock.
    #[must_use]
    pub fn now(&self) -> SystemTime {
        self.clock.now()
    }

    /// Rank catalog locations within `radius_km` of `origin`.
    ///
    /// `origin` is `(longitude, latitude)`. Candidates are ordered by
    /// combined score (highest first), then distance, then location id.
    /// An empty result is not an error.
    ///
    /// # Errors
    /// Returns [`MatchError::InvalidRadius`] or [`MatchError::InvalidOrigin`]
    /// for unusable arguments and [`MatchError::Catalog`] when the catalog
    /// cannot be read or updated.
    pub fn find_matches(
        &self,
        target: &EnvironmentalProfile,
        origin: Coord<f64>,
        radius_km: f64,
    ) -> Result<Vec<RankedCandidate>, MatchError> {
        validate_query(origin, radius_km)?;

        let in_radius: Vec<InRadius> = self
            .catalog
            .locations()?
            .into_iter()
            .filter_map(|location| {
                let distance_km = geodesic_km(origin, location.position);
                (distance_km <= radius_km).then_some(InRadius {
                    location,
                    distance_km,
                })
            })
            .collect();
        log::debug!(
            "{} catalog locations within {radius_km} km of ({}, {})",
            in_radius.len(),
            origin.y,
            origin.x
        );

        let snapshots = self.fresh_snapshots(&in_radius)?;
        let mut ranked: Vec<RankedCandidate> = in_radius
            .into_iter()
            .zip(snapshots)
            .map(|(candidate, snapshot)| self.rank(target, candidate, snapshot))
            .collect();
        ranked.sort_by(|a, b| {
            b.combined_score
                .total_cmp(&a.combined_score)
                .then_with(|| a.distance_km.total_cmp(&b.distance_km))
                .then_with(|| a.location.id.cmp(&b.location.id))
        });
        Ok(ranked)
    }

    /// Fresh snapshot for a single location, refreshing it if needed.
    ///
    /// # Errors
    /// Returns [`CatalogError`] when the catalog cannot be read or updated.
    pub fn snapshot_for(
        &self,
        location: &Location,
    ) -> Result<(EnvironmentalProfile, HealthIndex), CatalogError> {
        let snapshot = self.fresh_snapshot(location)?;
        Ok((snapshot.profile, snapshot.index))
    }

    #[expect(clippy::float_arithmetic, reason = "weighted blend of scores")]
    fn rank(
        &self,
        target: &EnvironmentalProfile,
        candidate: InRadius,
        snapshot: Snapshot,
    ) -> RankedCandidate {
        let similarity_score = self.similarity.similarity(target, &snapshot.profile);
        let combined_score = self.config.similarity_weight * similarity_score
            + self.config.health_weight * snapshot.index.overall;
        RankedCandidate {
            location: candidate.location,
            distance_km: candidate.distance_km,
            similarity_score,
            characteristics: snapshot.profile,
            health_index: snapshot.index,
            combined_score,
        }
    }

    /// Snapshots for every candidate, in candidate order.
    ///
    /// Cached snapshots are read first; the stale remainder is refreshed in
    /// parallel batches.
    fn fresh_snapshots(&self, candidates: &[InRadius]) -> Result<Vec<Snapshot>, CatalogError> {
        let mut snapshots: Vec<Option<Snapshot>> = candidates
            .iter()
            .map(|candidate| self.cached_snapshot(&candidate.location))
            .collect::<Result<_, _>>()?;

        let stale: Vec<usize> = snapshots
            .iter()
            .enumerate()
            .filter(|(_, snapshot)| snapshot.is_none())
            .map(|(position, _)| position)
            .collect();
        if !stale.is_empty() {
            log::info!("refreshing {} stale locations", stale.len());
        }

        for batch in stale.chunks(self.config.refresh_parallelism.max(1)) {
            let refreshed = std::thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .filter_map(|&position| candidates.get(position).map(|c| (position, c)))
                    .map(|(position, candidate)| {
                        (
                            position,
                            scope.spawn(move || self.fresh_snapshot(&candidate.location)),
                        )
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|(position, handle)| {
                        let result = handle
                            .join()
                            .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
                        (position, result)
                    })
                    .collect::<Vec<_>>()
            });
            for (position, result) in refreshed {
                if let Some(slot) = snapshots.get_mut(position) {
                    *slot = Some(result?);
                }
            }
        }

        Ok(snapshots.into_iter().flatten().collect())
    }

    /// Snapshot for `location`, refreshing it behind its per-location lock.
    fn fresh_snapshot(&self, location: &Location) -> Result<Snapshot, CatalogError> {
        if let Some(snapshot) = self.cached_snapshot(location)? {
            return Ok(snapshot);
        }
        let slot = self.locks.slot(location.id);
        let _guard = hold(&slot);
        // Another request may have refreshed while this one waited.
        if let Some(snapshot) = self.cached_snapshot(location)? {
            return Ok(snapshot);
        }
        self.refresh(location)
    }

    /// Snapshot built purely from fresh catalog data, if there is one.
    fn cached_snapshot(&self, location: &Location) -> Result<Option<Snapshot>, CatalogError> {
        let now = self.clock.now();
        let Some(observation) = self.fresh_observation(location, now)? else {
            return Ok(None);
        };
        let Some(index) = self.current_index(location, &observation, now)? else {
            return Ok(None);
        };
        Ok(Some(Snapshot {
            profile: scoring_profile(location, &observation),
            index,
        }))
    }

    /// Fetch whatever is stale for `location` and record it.
    fn refresh(&self, location: &Location) -> Result<Snapshot, CatalogError> {
        let now = self.clock.now();
        let observation = if let Some(observation) = self.fresh_observation(location, now)? {
            observation
        } else {
            log::debug!("fetching characteristics for location {}", location.id);
            let profile = self
                .gateway
                .get_characteristics(location.latitude(), location.longitude());
            let observation = Observation::new(profile, self.clock.now());
            self.catalog
                .record_observation(location.id, observation.clone())?;
            observation
        };

        let profile = scoring_profile(location, &observation);
        let index = if let Some(index) = self.current_index(location, &observation, now)? {
            index
        } else {
            let index = self.health.score(&profile, self.clock.now());
            self.catalog.record_health_index(location.id, index.clone())?;
            index
        };
        Ok(Snapshot { profile, index })
    }

    fn fresh_observation(
        &self,
        location: &Location,
        now: SystemTime,
    ) -> Result<Option<Observation>, CatalogError> {
        Ok(self
            .catalog
            .latest_observation(location.id)?
            .filter(|observation| observation.is_fresh(now, self.config.freshness_window)))
    }

    /// Latest health index if it was computed from `observation` or later
    /// and is itself within the freshness window.
    fn current_index(
        &self,
        location: &Location,
        observation: &Observation,
        now: SystemTime,
    ) -> Result<Option<HealthIndex>, CatalogError> {
        Ok(self
            .catalog
            .latest_health_index(location.id)?
            .filter(|index| {
                index.computed_at >= observation.observed_at
                    && now
                        .duration_since(index.computed_at)
                        .ok()
                        .is_none_or(|age| age < self.config.freshness_window)
            }))
    }
}

/// Observed characteristics with the location's plausible static attributes
/// on top.
fn scoring_profile(location: &Location, observation: &Observation) -> EnvironmentalProfile {
    let mut profile = observation.profile.clone();
    profile.overlay(&location.static_profile());
    profile
}

fn validate_query(origin: Coord<f64>, radius_km: f64) -> Result<(), MatchError> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(MatchError::InvalidRadius { radius_km });
    }
    let latitude_ok = origin.y.is_finite() && (-90.0..=90.0).contains(&origin.y);
    let longitude_ok = origin.x.is_finite() && (-180.0..=180.0).contains(&origin.x);
    if !(latitude_ok && longitude_ok) {
        return Err(MatchError::InvalidOrigin {
            latitude: origin.y,
            longitude: origin.x,
        });
    }
    Ok(())
}
