//! Weighted cosine similarity between environmental profiles.

use std::collections::BTreeMap;

use haven_core::{Characteristic, EnvironmentalProfile};

use crate::ConfigError;

/// Per-characteristic importance used when comparing profiles.
///
/// Characteristics without an explicit weight use the default weight.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWeights {
    weights: BTreeMap<Characteristic, f64>,
    default_weight: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        let weights = [
            (Characteristic::Temperature, 1.0),
            (Characteristic::Humidity, 0.8),
            (Characteristic::AirPressure, 0.6),
            (Characteristic::AirQuality, 1.0),
            (Characteristic::Elevation, 0.7),
            (Characteristic::SunshineHours, 0.9),
            (Characteristic::WindSpeed, 0.6),
            (Characteristic::Precipitation, 0.8),
            (Characteristic::UvIndex, 0.7),
            (Characteristic::NoiseLevel, 0.9),
        ]
        .into_iter()
        .collect();
        Self {
            weights,
            default_weight: 1.0,
        }
    }
}

impl FeatureWeights {
    /// Weights with every characteristic at `default_weight`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidWeight`] when the weight is negative or
    /// not finite.
    pub fn uniform(default_weight: f64) -> Result<Self, ConfigError> {
        check_weight("default", default_weight)?;
        Ok(Self {
            weights: BTreeMap::new(),
            default_weight,
        })
    }

    /// Override one characteristic's weight.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidWeight`] when the weight is negative or
    /// not finite.
    pub fn with(mut self, characteristic: Characteristic, weight: f64) -> Result<Self, ConfigError> {
        check_weight(characteristic.as_str(), weight)?;
        self.weights.insert(characteristic, weight);
        Ok(self)
    }

    /// Weight applied to `characteristic`.
    #[must_use]
    pub fn weight(&self, characteristic: Characteristic) -> f64 {
        self.weights
            .get(&characteristic)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

fn check_weight(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight {
            name: name.to_owned(),
            value,
        })
    }
}

/// Scores how closely two profiles resemble each other.
///
/// Only characteristics present in both profiles contribute. The result is
/// symmetric, lies in `-1.0..=1.0`, and is `0.0` when the profiles share no
/// characteristic or either weighted vector has zero length.
///
/// # Examples
///
/// ```
/// use haven_core::{Characteristic, EnvironmentalProfile};
/// use haven_scorer::SimilarityScorer;
///
/// let scorer = SimilarityScorer::default();
/// let a = EnvironmentalProfile::new()
///     .with(Characteristic::Temperature, 20.0)
///     .with(Characteristic::Humidity, 55.0);
/// let b = EnvironmentalProfile::new().with(Characteristic::NoiseLevel, 40.0);
///
/// assert_eq!(scorer.similarity(&a, &a), 1.0);
/// assert_eq!(scorer.similarity(&a, &b), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityScorer {
    weights: FeatureWeights,
}

impl SimilarityScorer {
    /// Build a scorer with custom weights.
    #[must_use]
    pub const fn new(weights: FeatureWeights) -> Self {
        Self { weights }
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    /// Weighted cosine similarity of the shared characteristics.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "cosine similarity")]
    pub fn similarity(&self, a: &EnvironmentalProfile, b: &EnvironmentalProfile) -> f64 {
        let mut dot = 0.0_f64;
        let mut norm_a = 0.0_f64;
        let mut norm_b = 0.0_f64;
        let mut shared = false;

        // Profiles iterate in characteristic order, so the sums are
        // accumulated identically for (a, b) and (b, a).
        for (characteristic, left) in a.iter() {
            let Some(right) = b.get(characteristic) else {
                continue;
            };
            shared = true;
            let weight = self.weights.weight(characteristic);
            let wa = left * weight;
            let wb = right * weight;
            dot += wa * wb;
            norm_a += wa * wa;
            norm_b += wb * wb;
        }

        if !shared || norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        let mut denominator = (norm_a * norm_b).sqrt();
        if !denominator.is_finite() || denominator == 0.0 {
            denominator = norm_a.sqrt() * norm_b.sqrt();
        }
        let score = dot / denominator;
        if score.is_nan() {
            log::debug!("similarity undefined for non-finite profile values");
            return 0.0;
        }
        score.clamp(-1.0, 1.0)
    }
}
