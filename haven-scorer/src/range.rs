//! Optimal ranges and the two scoring shapes built on them.
//!
//! *Within-range* scoring gives `1.0` inside the range and decays linearly
//! with the distance to the nearest bound, reaching `0.0` one range-width
//! away. *Lower-is-better* scoring falls linearly from `1.0` at the lower
//! bound to `0.0` at the upper bound.

use std::collections::BTreeMap;

use haven_core::{Characteristic, EnvironmentalProfile};

use crate::ConfigError;

/// Inclusive `min..=max` range with `min < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimalRange {
    min: f64,
    max: f64,
}

impl OptimalRange {
    /// Validate and construct a range.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidRange`] when either bound is not finite
    /// or `min >= max`.
    ///
    /// # Examples
    /// ```
    /// use haven_scorer::OptimalRange;
    ///
    /// assert!(OptimalRange::new(18.0, 25.0).is_ok());
    /// assert!(OptimalRange::new(25.0, 18.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        if min.is_finite() && max.is_finite() && min < max {
            Ok(Self { min, max })
        } else {
            Err(ConfigError::InvalidRange { min, max })
        }
    }

    /// Construct a range from known-good constants.
    pub(crate) const fn fixed(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Distance between the bounds.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "range width is a subtraction")]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Centre of the range.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "midpoint is an average")]
    pub fn midpoint(&self) -> f64 {
        self.min + self.width() / 2.0
    }

    /// Whether `value` lies inside the inclusive bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Position of `value` relative to the range, `0.0` at `min`, `1.0` at
    /// `max`, extrapolating outside.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "linear rescaling")]
    pub fn rescale(&self, value: f64) -> f64 {
        (value - self.min) / self.width()
    }

    /// Within-range score in `0.0..=1.0`.
    ///
    /// # Examples
    /// ```
    /// use haven_scorer::OptimalRange;
    ///
    /// let comfortable = OptimalRange::new(18.0, 25.0).unwrap();
    /// assert_eq!(comfortable.score_within(21.0), 1.0);
    /// assert_eq!(comfortable.score_within(32.0), 0.0);
    /// assert!((comfortable.score_within(14.5) - 0.5).abs() < 1e-12);
    /// ```
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "distance-based decay")]
    pub fn score_within(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        if self.contains(value) {
            return 1.0;
        }
        let distance = if value < self.min {
            self.min - value
        } else {
            value - self.max
        };
        (1.0 - distance / self.width()).clamp(0.0, 1.0)
    }

    /// Lower-is-better score in `0.0..=1.0`.
    ///
    /// # Examples
    /// ```
    /// use haven_scorer::OptimalRange;
    ///
    /// let pm25 = OptimalRange::new(0.0, 10.0).unwrap();
    /// assert_eq!(pm25.score_lower_is_better(0.0), 1.0);
    /// assert_eq!(pm25.score_lower_is_better(10_000.0), 0.0);
    /// ```
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "linear penalty")]
    pub fn score_lower_is_better(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        1.0 - self.rescale(value).clamp(0.0, 1.0)
    }
}

/// How a [`RangeTable`] turns a value into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// [`OptimalRange::score_within`].
    WithinRange,
    /// [`OptimalRange::score_lower_is_better`].
    LowerIsBetter,
}

/// Per-characteristic optimal ranges sharing one scoring shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTable {
    scoring: Scoring,
    ranges: BTreeMap<Characteristic, OptimalRange>,
}

impl RangeTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new(scoring: Scoring) -> Self {
        Self {
            scoring,
            ranges: BTreeMap::new(),
        }
    }

    pub(crate) fn from_fixed(scoring: Scoring, entries: &[(Characteristic, f64, f64)]) -> Self {
        let ranges = entries
            .iter()
            .map(|&(characteristic, min, max)| (characteristic, OptimalRange::fixed(min, max)))
            .collect();
        Self { scoring, ranges }
    }

    /// Add or replace a range while consuming `self`.
    #[must_use]
    pub fn with(mut self, characteristic: Characteristic, range: OptimalRange) -> Self {
        self.ranges.insert(characteristic, range);
        self
    }

    /// Scoring shape used by the table.
    #[must_use]
    pub const fn scoring(&self) -> Scoring {
        self.scoring
    }

    /// Range configured for `characteristic`.
    #[must_use]
    pub fn get(&self, characteristic: Characteristic) -> Option<OptimalRange> {
        self.ranges.get(&characteristic).copied()
    }

    /// Iterate over configured ranges in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Characteristic, OptimalRange)> + '_ {
        self.ranges.iter().map(|(key, range)| (*key, *range))
    }

    /// Score a single value against the range for `characteristic`.
    #[must_use]
    pub fn score_value(&self, characteristic: Characteristic, value: f64) -> Option<f64> {
        let range = self.get(characteristic)?;
        Some(match self.scoring {
            Scoring::WithinRange => range.score_within(value),
            Scoring::LowerIsBetter => range.score_lower_is_better(value),
        })
    }

    /// Mean score over the table's characteristics present in `profile`.
    ///
    /// Returns `None` when the profile shares no characteristic with the
    /// table.
    #[must_use]
    pub fn score(&self, profile: &EnvironmentalProfile) -> Option<f64> {
        mean(
            self.ranges
                .keys()
                .filter_map(|&key| profile.get(key).and_then(|value| self.score_value(key, value))),
        )
    }

    /// A profile with every characteristic at its range midpoint.
    #[must_use]
    pub fn midpoint_profile(&self) -> EnvironmentalProfile {
        self.iter()
            .map(|(characteristic, range)| (characteristic, range.midpoint()))
            .collect()
    }
}

/// Arithmetic mean, or `None` for an empty sequence.
#[expect(clippy::float_arithmetic, reason = "averaging scores")]
pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0_f64, 0_u32), |(sum, count), value| {
        (sum + value, count.saturating_add(1))
    });
    (count > 0).then(|| sum / f64::from(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn climate() -> RangeTable {
        RangeTable::from_fixed(
            Scoring::WithinRange,
            &[
                (Characteristic::Temperature, 18.0, 25.0),
                (Characteristic::Humidity, 40.0, 60.0),
            ],
        )
    }

    #[rstest]
    #[case(18.0, 1.0)]
    #[case(25.0, 1.0)]
    #[case(11.0, 0.0)]
    #[case(28.5, 0.5)]
    #[case(f64::INFINITY, 0.0)]
    #[case(f64::NAN, 0.0)]
    fn within_range_scores(#[case] value: f64, #[case] expected: f64) {
        let range = OptimalRange::fixed(18.0, 25.0);
        assert!((range.score_within(value) - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(5.0, 0.5)]
    #[case(-3.0, 1.0)]
    #[case(10_000.0, 0.0)]
    #[case(f64::INFINITY, 0.0)]
    fn lower_is_better_scores(#[case] value: f64, #[case] expected: f64) {
        let range = OptimalRange::fixed(0.0, 10.0);
        assert!((range.score_lower_is_better(value) - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(f64::NAN, 1.0)]
    #[case(1.0, 1.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_invalid_bounds(#[case] min: f64, #[case] max: f64) {
        assert!(matches!(
            OptimalRange::new(min, max),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[rstest]
    fn score_averages_present_metrics(climate: RangeTable) {
        let profile = EnvironmentalProfile::new()
            .with(Characteristic::Temperature, 21.0)
            .with(Characteristic::Humidity, 70.0)
            .with(Characteristic::Pm25, 3.0);
        let score = climate.score(&profile).expect("climate score");
        assert!((score - 0.75).abs() < 1e-12);
    }

    #[rstest]
    fn score_is_absent_without_overlap(climate: RangeTable) {
        let profile = EnvironmentalProfile::new().with(Characteristic::Pm25, 3.0);
        assert_eq!(climate.score(&profile), None);
    }

    #[rstest]
    fn midpoint_profile_scores_one(climate: RangeTable) {
        let profile = climate.midpoint_profile();
        assert_eq!(profile.get(Characteristic::Temperature), Some(21.5));
        assert_eq!(climate.score(&profile), Some(1.0));
    }
}
