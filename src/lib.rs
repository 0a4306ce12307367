//! Facade crate for the Haven wellbeing location engine.
//!
//! This crate re-exports the core domain types and scorers, and exposes the
//! geodata gateway, location matcher and recommendation service behind the
//! `matcher` feature.

#![forbid(unsafe_code)]

pub use haven_core::{
    CatalogError, Characteristic, Clock, ComponentScores, Dataset, DatasetSample,
    EnvironmentalProfile, FeatureVector, FieldViolation, GeoAttributes, GeoDataSource,
    HealthComponent, HealthIndex, Location, LocationCatalog, LocationId, MemoryCatalog,
    Observation, Prediction, PruneSummary, RankedCandidate, SimilarLocation, SystemClock,
    TargetProfileStrategy, UpstreamFetchError, UserState, ValidationError, ViolationKind,
};

#[cfg(feature = "store-sqlite")]
pub use haven_core::{SqliteCatalog, SqliteCatalogError};

pub use haven_scorer::{
    ComponentWeights, ConfigError, FeatureWeights, FixedTargetProfile, HealthIndexConfig,
    HealthIndexScorer, HealthStatusLabel, ImprovementRanges, ImprovementScorer, Interpretation,
    NormaliserConfig, ProfileNormaliser, SimilarityScorer,
};

#[cfg(feature = "matcher")]
pub use haven_data::{GatewayConfig, GeoDataGateway, default_characteristics};

#[cfg(feature = "matcher")]
pub use haven_data::http::{HttpGeoDataSource, HttpGeoDataSourceConfig};

#[cfg(feature = "matcher")]
pub use haven_matcher::{
    HealthStatus, LocationMatcher, MatchError, MatcherConfig, RecommendationError,
    RecommendationService, ServiceConfig, geodesic_km,
};
