//! Mapping from a user's normalised state to a target environment.
//!
//! [`TargetProfileStrategy`] is the seam where a learned model plugs in. The
//! matcher only ever sees the [`EnvironmentalProfile`] it produces.

use crate::EnvironmentalProfile;

/// Normalised user metrics in a fixed order.
///
/// Values are usually in `0.0..=1.0` but may extrapolate beyond it for
/// metrics that are not clamped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    /// Build a vector from ordered `(metric, value)` pairs.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value for a named metric.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(metric, _)| metric == name)
            .map(|(_, value)| *value)
    }

    /// Values in feature order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + DoubleEndedIterator + '_ {
        self.entries.iter().map(|(_, value)| *value)
    }

    /// `(metric, value)` pairs in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries
            .iter()
            .map(|(metric, value)| (metric.as_str(), *value))
    }
}

/// Derive a target environmental profile from normalised user features.
///
/// Implementations must be deterministic for a given input.
///
/// # Examples
///
/// ```
/// use haven_core::{Characteristic, EnvironmentalProfile, FeatureVector, TargetProfileStrategy};
///
/// struct Warmer;
///
/// impl TargetProfileStrategy for Warmer {
///     fn target_profile(&self, features: &FeatureVector) -> EnvironmentalProfile {
///         let stress = features.get("stress_level").unwrap_or(0.5);
///         EnvironmentalProfile::new().with(Characteristic::Temperature, 18.0 + stress * 6.0)
///     }
/// }
///
/// let features = FeatureVector::new([("stress_level".to_owned(), 1.0)]);
/// let target = Warmer.target_profile(&features);
/// assert_eq!(target.get(Characteristic::Temperature), Some(24.0));
/// ```
pub trait TargetProfileStrategy: Send + Sync {
    /// Return the environment expected to suit the user.
    fn target_profile(&self, features: &FeatureVector) -> EnvironmentalProfile;
}

impl<T: TargetProfileStrategy + ?Sized> TargetProfileStrategy for Box<T> {
    fn target_profile(&self, features: &FeatureVector) -> EnvironmentalProfile {
        (**self).target_profile(features)
    }
}
