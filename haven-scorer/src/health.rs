//! Four-component health index scoring.
//!
//! Each component averages the scores of its present metrics; a component
//! with no present metric scores the neutral value. The overall score is the
//! weighted sum of the components, and every component below the
//! recommendation threshold contributes a fixed piece of advice.

use std::time::SystemTime;

use haven_core::{Characteristic, ComponentScores, EnvironmentalProfile, HealthComponent, HealthIndex};

use crate::{ConfigError, OptimalRange, RangeTable, Scoring};

const WEIGHT_TOLERANCE: f64 = 1e-9;

const LIMITED_DATA: &str = "Limited data available. Health index is based on default values.";
const OPTIMAL_WEATHER: &str = "Visit during optimal weather conditions for best experience.";

/// Relative importance of each component in the overall score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentWeights {
    /// Air quality weight.
    pub air_quality: f64,
    /// Climate weight.
    pub climate: f64,
    /// Environmental weight.
    pub environmental: f64,
    /// Noise weight.
    pub noise: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            air_quality: 0.3,
            climate: 0.25,
            environmental: 0.25,
            noise: 0.2,
        }
    }
}

impl ComponentWeights {
    /// Weight for a single component.
    #[must_use]
    pub const fn get(&self, component: HealthComponent) -> f64 {
        match component {
            HealthComponent::AirQuality => self.air_quality,
            HealthComponent::Climate => self.climate,
            HealthComponent::Environmental => self.environmental,
            HealthComponent::Noise => self.noise,
        }
    }

    /// Check that every weight is usable and the weights sum to one.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidWeight`] for a negative or non-finite
    /// weight and [`ConfigError::WeightsDoNotSumToOne`] otherwise.
    #[expect(clippy::float_arithmetic, reason = "summing weights")]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut total = 0.0;
        for component in HealthComponent::ALL {
            let value = self.get(component);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    name: component.as_str().to_owned(),
                    value,
                });
            }
            total += value;
        }
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne { total });
        }
        Ok(())
    }

    #[expect(clippy::float_arithmetic, reason = "weighted sum")]
    fn combine(&self, scores: &ComponentScores) -> f64 {
        scores
            .iter()
            .map(|(component, score)| self.get(component) * score)
            .sum()
    }
}

/// Score boundaries for the `Excellent`, `Good` and `Moderate` labels.
///
/// Scores below `moderate` are labelled `Poor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpretationThresholds {
    /// Lowest score labelled `Excellent`.
    pub excellent: f64,
    /// Lowest score labelled `Good`.
    pub good: f64,
    /// Lowest score labelled `Moderate`.
    pub moderate: f64,
}

impl InterpretationThresholds {
    /// Thresholds from known-good constants.
    #[must_use]
    pub const fn new(excellent: f64, good: f64, moderate: f64) -> Self {
        Self {
            excellent,
            good,
            moderate,
        }
    }

    fn validate(&self, component: HealthComponent) -> Result<(), ConfigError> {
        let unit = 0.0..=1.0;
        let ordered = self.excellent >= self.good && self.good >= self.moderate;
        if [self.excellent, self.good, self.moderate]
            .iter()
            .all(|value| unit.contains(value))
            && ordered
        {
            Ok(())
        } else {
            Err(ConfigError::InvalidThreshold {
                name: component.as_str().to_owned(),
            })
        }
    }

    fn label(&self, score: f64) -> HealthStatusLabel {
        if score >= self.excellent {
            HealthStatusLabel::Excellent
        } else if score >= self.good {
            HealthStatusLabel::Good
        } else if score >= self.moderate {
            HealthStatusLabel::Moderate
        } else {
            HealthStatusLabel::Poor
        }
    }
}

/// Qualitative label for a component score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthStatusLabel {
    /// Ideal conditions.
    Excellent,
    /// Favourable conditions.
    Good,
    /// Room for improvement.
    Moderate,
    /// Conditions likely to hurt wellbeing.
    Poor,
}

impl HealthStatusLabel {
    /// Lower-case name of the label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::Poor => "poor",
        }
    }

    /// Advice shown alongside the label.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "Ideal conditions for wellbeing.",
            Self::Good => "Generally favorable conditions.",
            Self::Moderate => "Some aspects could be improved.",
            Self::Poor => "Conditions may affect wellbeing.",
        }
    }
}

impl std::fmt::Display for HealthStatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labelled reading of one component.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    /// Component described.
    pub component: HealthComponent,
    /// Score from the index.
    pub score: f64,
    /// Qualitative label.
    pub status: HealthStatusLabel,
    /// Advice for the label.
    pub message: &'static str,
}

/// Range tables, weights and thresholds used by [`HealthIndexScorer`].
#[derive(Debug, Clone, PartialEq)]
pub struct HealthIndexConfig {
    /// Pollutant ranges, scored lower-is-better.
    pub air_quality: RangeTable,
    /// Weather ranges.
    pub climate: RangeTable,
    /// Surroundings ranges.
    pub environmental: RangeTable,
    /// Day and night noise ranges.
    pub noise: RangeTable,
    /// Component weights.
    pub weights: ComponentWeights,
    /// Components scoring below this receive a recommendation.
    pub recommendation_threshold: f64,
    /// Score for a component with no present metric.
    pub neutral_score: f64,
    /// Label boundaries for air quality.
    pub air_quality_labels: InterpretationThresholds,
    /// Label boundaries for climate.
    pub climate_labels: InterpretationThresholds,
    /// Label boundaries for environmental.
    pub environmental_labels: InterpretationThresholds,
    /// Label boundaries for noise.
    pub noise_labels: InterpretationThresholds,
}

impl Default for HealthIndexConfig {
    fn default() -> Self {
        use Characteristic as C;
        Self {
            air_quality: RangeTable::from_fixed(
                Scoring::LowerIsBetter,
                &[
                    (C::Pm25, 0.0, 10.0),
                    (C::Pm10, 0.0, 20.0),
                    (C::O3, 0.0, 100.0),
                    (C::No2, 0.0, 40.0),
                ],
            ),
            climate: RangeTable::from_fixed(
                Scoring::WithinRange,
                &[
                    (C::Temperature, 18.0, 25.0),
                    (C::Humidity, 40.0, 60.0),
                    (C::WindSpeed, 2.0, 10.0),
                ],
            ),
            environmental: RangeTable::from_fixed(
                Scoring::WithinRange,
                &[
                    (C::Greenness, 0.6, 1.0),
                    (C::UrbanDensity, 0.0, 2000.0),
                    (C::WaterProximity, 0.0, 500.0),
                ],
            ),
            noise: RangeTable::from_fixed(
                Scoring::WithinRange,
                &[(C::DayNoiseLevel, 45.0, 55.0), (C::NightNoiseLevel, 40.0, 50.0)],
            ),
            weights: ComponentWeights::default(),
            recommendation_threshold: 0.6,
            neutral_score: 0.5,
            air_quality_labels: InterpretationThresholds::new(0.8, 0.6, 0.4),
            climate_labels: InterpretationThresholds::new(0.8, 0.6, 0.4),
            environmental_labels: InterpretationThresholds::new(0.75, 0.5, 0.3),
            noise_labels: InterpretationThresholds::new(0.75, 0.5, 0.3),
        }
    }
}

impl HealthIndexConfig {
    /// Range table for a component.
    #[must_use]
    pub const fn table(&self, component: HealthComponent) -> &RangeTable {
        match component {
            HealthComponent::AirQuality => &self.air_quality,
            HealthComponent::Climate => &self.climate,
            HealthComponent::Environmental => &self.environmental,
            HealthComponent::Noise => &self.noise,
        }
    }

    /// Label boundaries for a component.
    #[must_use]
    pub const fn labels(&self, component: HealthComponent) -> &InterpretationThresholds {
        match component {
            HealthComponent::AirQuality => &self.air_quality_labels,
            HealthComponent::Climate => &self.climate_labels,
            HealthComponent::Environmental => &self.environmental_labels,
            HealthComponent::Noise => &self.noise_labels,
        }
    }

    /// Check weights, thresholds and every range.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        for (name, value) in [
            ("recommendation_threshold", self.recommendation_threshold),
            ("neutral_score", self.neutral_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold {
                    name: name.to_owned(),
                });
            }
        }
        for component in HealthComponent::ALL {
            self.labels(component).validate(component)?;
            for (_, range) in self.table(component).iter() {
                OptimalRange::new(range.min(), range.max())?;
            }
        }
        Ok(())
    }
}

fn recommendation(component: HealthComponent) -> &'static str {
    match component {
        HealthComponent::AirQuality => {
            "Air quality is suboptimal. Best visited during early morning or evening."
        }
        HealthComponent::Climate => {
            "Weather conditions may be challenging. Check forecast before visiting."
        }
        HealthComponent::Environmental => {
            "Environmental conditions are moderate. Consider alternative locations with more green space."
        }
        HealthComponent::Noise => {
            "Noise levels may be high. Bring noise-canceling headphones if seeking quiet."
        }
    }
}

/// Computes [`HealthIndex`] snapshots from environmental profiles.
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
/// use haven_core::{Characteristic, EnvironmentalProfile};
/// use haven_scorer::HealthIndexScorer;
///
/// let scorer = HealthIndexScorer::default();
/// let smoggy = EnvironmentalProfile::new().with(Characteristic::Pm25, 10_000.0);
/// let index = scorer.score(&smoggy, SystemTime::UNIX_EPOCH);
///
/// assert_eq!(index.components.air_quality, 0.0);
/// assert!((0.0..=1.0).contains(&index.overall));
/// assert!(index.recommendations[0].starts_with("Air quality is suboptimal"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthIndexScorer {
    config: HealthIndexConfig,
}

impl HealthIndexScorer {
    /// Build a scorer after validating `config`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the configuration is inconsistent.
    pub fn new(config: HealthIndexConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &HealthIndexConfig {
        &self.config
    }

    /// Score a profile.
    ///
    /// An empty profile yields [`HealthIndexScorer::default_index`].
    #[must_use]
    pub fn score(&self, profile: &EnvironmentalProfile, computed_at: SystemTime) -> HealthIndex {
        if profile.is_empty() {
            log::debug!("no characteristics to score, using the default health index");
            return self.default_index(computed_at);
        }
        let component = |component: HealthComponent| {
            self.config
                .table(component)
                .score(profile)
                .unwrap_or(self.config.neutral_score)
                .clamp(0.0, 1.0)
        };
        let components = ComponentScores {
            air_quality: component(HealthComponent::AirQuality),
            climate: component(HealthComponent::Climate),
            environmental: component(HealthComponent::Environmental),
            noise: component(HealthComponent::Noise),
        };
        let overall = self.config.weights.combine(&components).clamp(0.0, 1.0);
        let recommendations = components
            .iter()
            .filter(|(_, score)| *score < self.config.recommendation_threshold)
            .map(|(component, _)| recommendation(component).to_owned())
            .collect();
        HealthIndex {
            components,
            overall,
            recommendations,
            computed_at,
        }
    }

    /// Neutral index used when nothing is known about a location.
    #[must_use]
    pub fn default_index(&self, computed_at: SystemTime) -> HealthIndex {
        let neutral = self.config.neutral_score;
        HealthIndex {
            components: ComponentScores::uniform(neutral),
            overall: neutral,
            recommendations: vec![LIMITED_DATA.to_owned(), OPTIMAL_WEATHER.to_owned()],
            computed_at,
        }
    }

    /// Label every component of `index`.
    #[must_use]
    pub fn interpret(&self, index: &HealthIndex) -> Vec<Interpretation> {
        index
            .components
            .iter()
            .map(|(component, score)| {
                let status = self.config.labels(component).label(score);
                Interpretation {
                    component,
                    score,
                    status,
                    message: status.message(),
                }
            })
            .collect()
    }
}
