//! Catalog locations and their observed history.

use std::time::{Duration, SystemTime};

use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Characteristic, EnvironmentalProfile};

/// Stable identifier for a catalog location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LocationId(pub u64);

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LocationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Static geographic attributes recorded for a location.
///
/// These do not age out and take precedence over fetched measurements of
/// the same characteristic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoAttributes {
    /// Altitude above sea level in metres.
    #[cfg_attr(feature = "serde", serde(default))]
    pub altitude_m: Option<f64>,
    /// Distance to the nearest body of water in metres.
    #[cfg_attr(feature = "serde", serde(default))]
    pub water_proximity_m: Option<f64>,
    /// Population density per square kilometre.
    #[cfg_attr(feature = "serde", serde(default))]
    pub urban_density: Option<f64>,
    /// Vegetation index in `0.0..=1.0`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub greenness: Option<f64>,
}

/// An outdoor location known to the catalog.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use haven_core::{Characteristic, GeoAttributes, Location, LocationId};
///
/// let park = Location::new(LocationId(7), "Riverside Park", Coord { x: -0.12, y: 51.5 })
///     .with_attributes(GeoAttributes {
///         greenness: Some(0.8),
///         ..GeoAttributes::default()
///     });
/// assert_eq!(park.latitude(), 51.5);
/// assert_eq!(park.static_profile().get(Characteristic::Greenness), Some(0.8));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Unique identifier.
    pub id: LocationId,
    /// Human-readable name.
    pub name: String,
    /// Position with `x` as longitude and `y` as latitude.
    pub position: Coord<f64>,
    /// Static geographic attributes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: GeoAttributes,
}

impl Location {
    /// Construct a location without static attributes.
    pub fn new(id: LocationId, name: impl Into<String>, position: Coord<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            attributes: GeoAttributes::default(),
        }
    }

    /// Replace the static attributes while consuming `self`.
    #[must_use]
    pub fn with_attributes(mut self, attributes: GeoAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.position.y
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.position.x
    }

    /// Profile built from the present static attributes.
    ///
    /// Finite greenness is clamped to `[0, 1]`. Any other value outside its
    /// plausible range is dropped with a warning, so the profile only ever
    /// holds plausible characteristics.
    #[must_use]
    pub fn static_profile(&self) -> EnvironmentalProfile {
        let attributes = self.attributes;
        let greenness = attributes
            .greenness
            .map(|value| if value.is_finite() { value.clamp(0.0, 1.0) } else { value });
        let mut profile: EnvironmentalProfile = [
            (Characteristic::Elevation, attributes.altitude_m),
            (Characteristic::WaterProximity, attributes.water_proximity_m),
            (Characteristic::UrbanDensity, attributes.urban_density),
            (Characteristic::Greenness, greenness),
        ]
        .into_iter()
        .filter_map(|(characteristic, value)| value.map(|v| (characteristic, v)))
        .collect();
        for (characteristic, value) in profile.retain_plausible() {
            log::warn!(
                "ignoring implausible {characteristic}={value} on location {}",
                self.id
            );
        }
        profile
    }
}

/// A timestamped characteristics snapshot for one location.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Measured characteristics.
    pub profile: EnvironmentalProfile,
    /// When the characteristics were fetched.
    pub observed_at: SystemTime,
}

impl Observation {
    /// Pair a profile with the time it was observed.
    #[must_use]
    pub const fn new(profile: EnvironmentalProfile, observed_at: SystemTime) -> Self {
        Self {
            profile,
            observed_at,
        }
    }

    /// Whether the observation is younger than `window` at `now`.
    ///
    /// Observations stamped in the future count as fresh.
    #[must_use]
    pub fn is_fresh(&self, now: SystemTime, window: Duration) -> bool {
        now.duration_since(self.observed_at)
            .map_or(true, |age| age < window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn static_profile_skips_absent_attributes() {
        let location = Location::new(LocationId(1), "Moor", Coord { x: -3.9, y: 50.6 })
            .with_attributes(GeoAttributes {
                altitude_m: Some(450.0),
                ..GeoAttributes::default()
            });
        let profile = location.static_profile();
        assert_eq!(profile.len(), 1);
        assert_eq!(profile.get(Characteristic::Elevation), Some(450.0));
    }

    #[rstest]
    fn static_profile_clamps_greenness_and_drops_implausible_values() {
        let location = Location::new(LocationId(2), "Quarry", Coord { x: -2.1, y: 53.3 })
            .with_attributes(GeoAttributes {
                altitude_m: Some(f64::NAN),
                water_proximity_m: Some(-5.0),
                urban_density: Some(1_200.0),
                greenness: Some(5.0),
            });
        let profile = location.static_profile();
        assert_eq!(profile.get(Characteristic::Greenness), Some(1.0));
        assert_eq!(profile.get(Characteristic::UrbanDensity), Some(1_200.0));
        assert!(!profile.contains(Characteristic::Elevation));
        assert!(!profile.contains(Characteristic::WaterProximity));
        assert!(
            profile
                .iter()
                .all(|(characteristic, value)| characteristic.is_plausible(value))
        );
    }

    #[rstest]
    #[case(Duration::from_secs(59 * 60), true)]
    #[case(Duration::from_secs(60 * 60), false)]
    #[case(Duration::from_secs(2 * 60 * 60), false)]
    fn freshness_is_strict_at_window(#[case] age: Duration, #[case] fresh: bool) {
        let observed_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let observation = Observation::new(EnvironmentalProfile::new(), observed_at);
        let now = observed_at + age;
        assert_eq!(
            observation.is_fresh(now, Duration::from_secs(60 * 60)),
            fresh
        );
    }

    #[rstest]
    fn future_observation_counts_as_fresh() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let observation = Observation::new(EnvironmentalProfile::new(), now + Duration::from_secs(5));
        assert!(observation.is_fresh(now, Duration::from_secs(1)));
    }
}
