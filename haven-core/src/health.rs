//! Health index snapshots derived from a location's characteristics.
//!
//! Every score in this module lies in `0.0..=1.0`. The overall score is a
//! weighted sum of the four component scores.

use std::time::SystemTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four health index components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HealthComponent {
    /// Particulates and gaseous pollutants.
    AirQuality,
    /// Temperature, humidity and wind.
    Climate,
    /// Greenness, urban density and water proximity.
    Environmental,
    /// Day and night noise.
    Noise,
}

impl HealthComponent {
    /// Every component in reporting order.
    pub const ALL: [Self; 4] = [
        Self::AirQuality,
        Self::Climate,
        Self::Environmental,
        Self::Noise,
    ];

    /// Return the component as a snake_case `&str`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AirQuality => "air_quality",
            Self::Climate => "climate",
            Self::Environmental => "environmental",
            Self::Noise => "noise",
        }
    }
}

impl std::fmt::Display for HealthComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-component scores, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentScores {
    /// Air quality score.
    pub air_quality: f64,
    /// Climate score.
    pub climate: f64,
    /// Environmental score.
    pub environmental: f64,
    /// Noise score.
    pub noise: f64,
}

impl ComponentScores {
    /// Scores with every component set to `value`.
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            air_quality: value,
            climate: value,
            environmental: value,
            noise: value,
        }
    }

    /// Score for a single component.
    #[must_use]
    pub const fn get(&self, component: HealthComponent) -> f64 {
        match component {
            HealthComponent::AirQuality => self.air_quality,
            HealthComponent::Climate => self.climate,
            HealthComponent::Environmental => self.environmental,
            HealthComponent::Noise => self.noise,
        }
    }

    /// Iterate over `(component, score)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (HealthComponent, f64)> + '_ {
        HealthComponent::ALL
            .into_iter()
            .map(|component| (component, self.get(component)))
    }
}

/// Composite wellbeing score for one characteristics snapshot.
///
/// One index exists per (location, timestamp); the newest is authoritative.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HealthIndex {
    /// Component scores.
    pub components: ComponentScores,
    /// Weighted overall score in `0.0..=1.0`.
    pub overall: f64,
    /// Human-readable advice for weak components.
    pub recommendations: Vec<String>,
    /// When the index was computed.
    pub computed_at: SystemTime,
}
