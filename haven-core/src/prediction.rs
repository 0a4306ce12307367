//! Matching results and the prediction returned to API callers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{EnvironmentalProfile, HealthIndex, Location, LocationId};

/// A catalog location scored against a target profile.
///
/// Transient: never persisted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    /// The matched location.
    pub location: Location,
    /// Geodesic distance from the search origin in kilometres.
    pub distance_km: f64,
    /// Weighted cosine similarity to the target profile.
    pub similarity_score: f64,
    /// Characteristics used for scoring.
    pub characteristics: EnvironmentalProfile,
    /// Health index for the same characteristics snapshot.
    pub health_index: HealthIndex,
    /// Blend of similarity and overall health used for ranking.
    pub combined_score: f64,
}

/// Summary of a runner-up location.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimilarLocation {
    /// Location name.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Distance from the search origin in kilometres.
    pub distance_km: f64,
    /// Similarity to the target profile.
    pub similarity_score: f64,
    /// Characteristics used for scoring.
    pub characteristics: EnvironmentalProfile,
}

impl From<&RankedCandidate> for SimilarLocation {
    fn from(candidate: &RankedCandidate) -> Self {
        Self {
            name: candidate.location.name.clone(),
            latitude: candidate.location.latitude(),
            longitude: candidate.location.longitude(),
            distance_km: candidate.distance_km,
            similarity_score: candidate.similarity_score,
            characteristics: candidate.characteristics.clone(),
        }
    }
}

/// Recommendation returned for one user state.
///
/// Location fields are absent on the no-origin path, where the prediction
/// carries the target profile and placeholder coordinates instead.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Prediction {
    /// Latitude of the recommended point.
    pub latitude: f64,
    /// Longitude of the recommended point.
    pub longitude: f64,
    /// Similarity of the best match, or a fixed placeholder.
    pub confidence: f64,
    /// Characteristics of the best match, or the target profile.
    pub characteristics: EnvironmentalProfile,
    /// How close the characteristics are to ideal outdoor conditions.
    pub improvement_score: f64,
    /// Catalog identifier of the best match. In-process only; it is not
    /// part of the serialised prediction.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub location_id: Option<LocationId>,
    /// Name of the best match.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub location_name: Option<String>,
    /// Distance to the best match in kilometres.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub distance_km: Option<f64>,
    /// Top-ranked matches, best first.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub similar_locations: Option<Vec<SimilarLocation>>,
}
