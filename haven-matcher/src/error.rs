//! Error types for matching and recommendation.

use haven_core::{CatalogError, LocationId, ValidationError};
use thiserror::Error;

/// Errors raised by [`LocationMatcher::find_matches`](crate::LocationMatcher::find_matches).
#[derive(Debug, Error)]
pub enum MatchError {
    /// The search radius was negative or not finite.
    #[error("radius must be a finite, non-negative number of kilometres, got {radius_km}")]
    InvalidRadius {
        /// Rejected radius.
        radius_km: f64,
    },
    /// The origin was outside valid latitude and longitude bounds.
    #[error("origin ({latitude}, {longitude}) is not a valid position")]
    InvalidOrigin {
        /// Rejected latitude.
        latitude: f64,
        /// Rejected longitude.
        longitude: f64,
    },
    /// The catalog could not be read or updated.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors raised by [`RecommendationService`](crate::RecommendationService).
#[derive(Debug, Error)]
pub enum RecommendationError {
    /// The user state failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The referenced location does not exist.
    #[error("location {id} not found")]
    NotFound {
        /// Missing location.
        id: LocationId,
    },
    /// Matching failed.
    #[error(transparent)]
    Match(MatchError),
    /// The catalog could not be read or updated.
    #[error(transparent)]
    Catalog(CatalogError),
}

impl From<CatalogError> for RecommendationError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound { id } => Self::NotFound { id },
            other => Self::Catalog(other),
        }
    }
}

impl From<MatchError> for RecommendationError {
    fn from(error: MatchError) -> Self {
        match error {
            MatchError::Catalog(catalog) => catalog.into(),
            other => Self::Match(other),
        }
    }
}
