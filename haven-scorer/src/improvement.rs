//! How close a matched location comes to ideal outdoor conditions.

use haven_core::{Characteristic, EnvironmentalProfile};

use crate::{ConfigError, OptimalRange, RangeTable, Scoring};

/// Ideal outdoor ranges used by [`ImprovementScorer`].
///
/// Kept separate from the health index tables; the two may diverge.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementRanges {
    table: RangeTable,
}

impl Default for ImprovementRanges {
    fn default() -> Self {
        use Characteristic as C;
        Self {
            table: RangeTable::from_fixed(
                Scoring::WithinRange,
                &[
                    (C::Temperature, 18.0, 25.0),
                    (C::Humidity, 40.0, 60.0),
                    (C::AirPressure, 1010.0, 1020.0),
                    (C::AirQuality, 0.0, 50.0),
                    (C::Elevation, 0.0, 1000.0),
                    (C::SunshineHours, 6.0, 8.0),
                    (C::WindSpeed, 5.0, 15.0),
                    (C::Precipitation, 0.0, 5.0),
                    (C::UvIndex, 3.0, 5.0),
                    (C::NoiseLevel, 40.0, 60.0),
                ],
            ),
        }
    }
}

impl ImprovementRanges {
    /// Start from an empty table.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            table: RangeTable::new(Scoring::WithinRange),
        }
    }

    /// Add or replace the ideal range for `characteristic`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidRange`] for a malformed range.
    pub fn with(self, characteristic: Characteristic, min: f64, max: f64) -> Result<Self, ConfigError> {
        let range = OptimalRange::new(min, max)?;
        Ok(Self {
            table: self.table.with(characteristic, range),
        })
    }

    /// Underlying table.
    #[must_use]
    pub const fn table(&self) -> &RangeTable {
        &self.table
    }
}

/// Scores a profile against [`ImprovementRanges`].
///
/// # Examples
///
/// ```
/// use haven_core::{Characteristic, EnvironmentalProfile};
/// use haven_scorer::ImprovementScorer;
///
/// let scorer = ImprovementScorer::default();
/// let mild = EnvironmentalProfile::new()
///     .with(Characteristic::Temperature, 21.0)
///     .with(Characteristic::Humidity, 70.0);
/// assert!((scorer.improvement_score(&mild) - 0.75).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImprovementScorer {
    ranges: ImprovementRanges,
}

impl ImprovementScorer {
    /// Build a scorer with custom ranges.
    #[must_use]
    pub const fn new(ranges: ImprovementRanges) -> Self {
        Self { ranges }
    }

    /// Mean in-range score over the characteristics present in both the
    /// profile and the table, or `0.0` when they share none.
    #[must_use]
    pub fn improvement_score(&self, profile: &EnvironmentalProfile) -> f64 {
        self.ranges.table().score(profile).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn midpoints_score_one() {
        let scorer = ImprovementScorer::default();
        let profile = ImprovementRanges::default().table().midpoint_profile();
        assert_eq!(profile.len(), 10);
        assert_eq!(scorer.improvement_score(&profile), 1.0);
    }

    #[rstest]
    fn no_overlap_scores_zero() {
        let profile = EnvironmentalProfile::new().with(Characteristic::Pm25, 4.0);
        assert_eq!(ImprovementScorer::default().improvement_score(&profile), 0.0);
    }

    #[rstest]
    fn custom_ranges_replace_defaults() {
        let ranges = ImprovementRanges::empty()
            .with(Characteristic::Temperature, 10.0, 14.0)
            .expect("valid range");
        let scorer = ImprovementScorer::new(ranges);
        let profile = EnvironmentalProfile::new()
            .with(Characteristic::Temperature, 16.0)
            .with(Characteristic::Humidity, 50.0);
        assert!((scorer.improvement_score(&profile) - 0.5).abs() < 1e-12);
    }

    #[rstest]
    fn rejects_inverted_range() {
        assert!(ImprovementRanges::empty()
            .with(Characteristic::UvIndex, 5.0, 3.0)
            .is_err());
    }
}
