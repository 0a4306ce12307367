//! Environmental profiles keyed by [`Characteristic`].
//!
//! A profile is either a *target* derived from a user's state or an
//! *observed* snapshot tied to a location. Missing characteristics are
//! absent from the map; they are never stored as zero.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Characteristic;

/// Named numeric environmental measurements for a point or target.
///
/// # Examples
///
/// ```
/// use haven_core::{Characteristic, EnvironmentalProfile};
///
/// let profile = EnvironmentalProfile::new()
///     .with(Characteristic::Temperature, 21.0)
///     .with(Characteristic::Humidity, 45.0);
/// assert_eq!(profile.get(Characteristic::Temperature), Some(21.0));
/// assert!(profile.get(Characteristic::Pm25).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EnvironmentalProfile {
    values: BTreeMap<Characteristic, f64>,
}

impl EnvironmentalProfile {
    /// Create an empty profile.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Set a value while consuming `self`, enabling chaining.
    #[must_use]
    pub fn with(mut self, characteristic: Characteristic, value: f64) -> Self {
        self.insert(characteristic, value);
        self
    }

    /// Set a value, returning the previous one if present.
    pub fn insert(&mut self, characteristic: Characteristic, value: f64) -> Option<f64> {
        self.values.insert(characteristic, value)
    }

    /// Remove a value, returning it if present.
    pub fn remove(&mut self, characteristic: Characteristic) -> Option<f64> {
        self.values.remove(&characteristic)
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, characteristic: Characteristic) -> Option<f64> {
        self.values.get(&characteristic).copied()
    }

    /// Whether the profile holds a value for `characteristic`.
    #[must_use]
    pub fn contains(&self, characteristic: Characteristic) -> bool {
        self.values.contains_key(&characteristic)
    }

    /// Number of characteristics present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no characteristics are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over present characteristics in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Characteristic, f64)> + '_ {
        self.values.iter().map(|(key, value)| (*key, *value))
    }

    /// Iterate over present characteristic names.
    pub fn characteristics(&self) -> impl Iterator<Item = Characteristic> + '_ {
        self.values.keys().copied()
    }

    /// Copy every value from `other` into `self`, replacing existing entries.
    pub fn overlay(&mut self, other: &Self) {
        self.values.extend(other.iter());
    }

    /// Copy values from `other` only where `self` has none.
    pub fn fill_missing(&mut self, other: &Self) {
        for (characteristic, value) in other.iter() {
            self.values.entry(characteristic).or_insert(value);
        }
    }

    /// Drop non-finite or implausible values, returning what was removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use haven_core::{Characteristic, EnvironmentalProfile};
    ///
    /// let mut profile = EnvironmentalProfile::new()
    ///     .with(Characteristic::Humidity, 140.0)
    ///     .with(Characteristic::Temperature, 18.0);
    /// let rejected = profile.retain_plausible();
    /// assert_eq!(rejected, vec![(Characteristic::Humidity, 140.0)]);
    /// assert_eq!(profile.len(), 1);
    /// ```
    pub fn retain_plausible(&mut self) -> Vec<(Characteristic, f64)> {
        let mut rejected = Vec::new();
        self.values.retain(|characteristic, value| {
            let keep = characteristic.is_plausible(*value);
            if !keep {
                rejected.push((*characteristic, *value));
            }
            keep
        });
        rejected
    }
}

impl FromIterator<(Characteristic, f64)> for EnvironmentalProfile {
    fn from_iter<I: IntoIterator<Item = (Characteristic, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Characteristic, f64)> for EnvironmentalProfile {
    fn extend<I: IntoIterator<Item = (Characteristic, f64)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl<'a> IntoIterator for &'a EnvironmentalProfile {
    type Item = (&'a Characteristic, &'a f64);
    type IntoIter = std::collections::btree_map::Iter<'a, Characteristic, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn observed() -> EnvironmentalProfile {
        EnvironmentalProfile::new()
            .with(Characteristic::Temperature, 19.0)
            .with(Characteristic::Humidity, 55.0)
    }

    #[rstest]
    fn overlay_replaces_existing_values(mut observed: EnvironmentalProfile) {
        let attributes = EnvironmentalProfile::new()
            .with(Characteristic::Temperature, 12.0)
            .with(Characteristic::Elevation, 800.0);
        observed.overlay(&attributes);
        assert_eq!(observed.get(Characteristic::Temperature), Some(12.0));
        assert_eq!(observed.get(Characteristic::Elevation), Some(800.0));
        assert_eq!(observed.get(Characteristic::Humidity), Some(55.0));
    }

    #[rstest]
    fn fill_missing_keeps_existing_values(mut observed: EnvironmentalProfile) {
        let defaults = EnvironmentalProfile::new()
            .with(Characteristic::Temperature, 20.0)
            .with(Characteristic::AirQuality, 50.0);
        observed.fill_missing(&defaults);
        assert_eq!(observed.get(Characteristic::Temperature), Some(19.0));
        assert_eq!(observed.get(Characteristic::AirQuality), Some(50.0));
    }

    #[rstest]
    fn retain_plausible_drops_non_finite_values(mut observed: EnvironmentalProfile) {
        observed.insert(Characteristic::Pm25, f64::INFINITY);
        let rejected = observed.retain_plausible();
        assert_eq!(rejected.len(), 1);
        assert!(!observed.contains(Characteristic::Pm25));
        assert_eq!(observed.len(), 2);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_as_flat_map(observed: EnvironmentalProfile) {
        let json = serde_json::to_value(&observed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "temperature": 19.0, "humidity": 55.0 })
        );
    }
}
