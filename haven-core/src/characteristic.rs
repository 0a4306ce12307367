//! Named environmental measurements.
//!
//! [`Characteristic`] gives compile-time safety to the keys of an
//! [`EnvironmentalProfile`](crate::EnvironmentalProfile). Each variant carries
//! a fixed unit and a plausible range used to reject corrupt upstream values.
//!
//! # Examples
//! ```
//! use haven_core::Characteristic;
//!
//! assert_eq!(Characteristic::AirPressure.as_str(), "air_pressure");
//! assert_eq!(Characteristic::Pm25.to_string(), "pm25");
//! assert_eq!(Characteristic::Temperature.unit(), "°C");
//! ```

use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single environmental characteristic in a fixed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Characteristic {
    /// Air temperature in degrees Celsius.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
    /// Surface pressure in hectopascals.
    AirPressure,
    /// Composite air quality index.
    AirQuality,
    /// Altitude above sea level in metres.
    Elevation,
    /// Daily sunshine in hours.
    SunshineHours,
    /// Wind speed in kilometres per hour.
    WindSpeed,
    /// Precipitation in millimetres.
    Precipitation,
    /// UV index.
    UvIndex,
    /// Ambient noise in decibels.
    NoiseLevel,
    /// Fine particulate matter concentration.
    Pm25,
    /// Coarse particulate matter concentration.
    Pm10,
    /// Ozone concentration.
    O3,
    /// Nitrogen dioxide concentration.
    No2,
    /// Daytime noise in decibels.
    DayNoiseLevel,
    /// Night-time noise in decibels.
    NightNoiseLevel,
    /// Vegetation index in `0.0..=1.0`.
    Greenness,
    /// Population density per square kilometre.
    UrbanDensity,
    /// Distance to the nearest body of water in metres.
    WaterProximity,
}

impl Characteristic {
    /// Every characteristic, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::Temperature,
        Self::Humidity,
        Self::AirPressure,
        Self::AirQuality,
        Self::Elevation,
        Self::SunshineHours,
        Self::WindSpeed,
        Self::Precipitation,
        Self::UvIndex,
        Self::NoiseLevel,
        Self::Pm25,
        Self::Pm10,
        Self::O3,
        Self::No2,
        Self::DayNoiseLevel,
        Self::NightNoiseLevel,
        Self::Greenness,
        Self::UrbanDensity,
        Self::WaterProximity,
    ];

    /// Return the characteristic as a snake_case `&str`.
    ///
    /// # Examples
    /// ```
    /// use haven_core::Characteristic;
    ///
    /// assert_eq!(Characteristic::UvIndex.as_str(), "uv_index");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::AirPressure => "air_pressure",
            Self::AirQuality => "air_quality",
            Self::Elevation => "elevation",
            Self::SunshineHours => "sunshine_hours",
            Self::WindSpeed => "wind_speed",
            Self::Precipitation => "precipitation",
            Self::UvIndex => "uv_index",
            Self::NoiseLevel => "noise_level",
            Self::Pm25 => "pm25",
            Self::Pm10 => "pm10",
            Self::O3 => "o3",
            Self::No2 => "no2",
            Self::DayNoiseLevel => "day_noise_level",
            Self::NightNoiseLevel => "night_noise_level",
            Self::Greenness => "greenness",
            Self::UrbanDensity => "urban_density",
            Self::WaterProximity => "water_proximity",
        }
    }

    /// Unit label for display purposes.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::AirPressure => "hPa",
            Self::AirQuality => "AQI",
            Self::Elevation | Self::WaterProximity => "m",
            Self::SunshineHours => "h",
            Self::WindSpeed => "km/h",
            Self::Precipitation => "mm",
            Self::UvIndex | Self::Greenness => "index",
            Self::NoiseLevel | Self::DayNoiseLevel | Self::NightNoiseLevel => "dB",
            Self::Pm25 | Self::Pm10 | Self::O3 | Self::No2 => "µg/m³",
            Self::UrbanDensity => "people/km²",
        }
    }

    /// Range of values considered physically plausible.
    ///
    /// Values outside this range indicate a corrupt or misconverted
    /// measurement and are discarded by the data gateway.
    #[must_use]
    pub const fn plausible_range(&self) -> RangeInclusive<f64> {
        match self {
            Self::Temperature => -90.0..=60.0,
            Self::Humidity => 0.0..=100.0,
            Self::AirPressure => 300.0..=1100.0,
            Self::AirQuality => 0.0..=500.0,
            Self::Elevation => -450.0..=8900.0,
            Self::SunshineHours => 0.0..=24.0,
            Self::WindSpeed => 0.0..=400.0,
            Self::Precipitation | Self::No2 | Self::Pm10 => 0.0..=2000.0,
            Self::UvIndex => 0.0..=20.0,
            Self::NoiseLevel | Self::DayNoiseLevel | Self::NightNoiseLevel => 0.0..=194.0,
            Self::Pm25 | Self::O3 => 0.0..=1000.0,
            Self::Greenness => 0.0..=1.0,
            Self::UrbanDensity => 0.0..=100_000.0,
            Self::WaterProximity => 0.0..=1_000_000.0,
        }
    }

    /// Whether `value` is finite and inside [`Self::plausible_range`].
    #[must_use]
    pub fn is_plausible(&self, value: f64) -> bool {
        value.is_finite() && self.plausible_range().contains(&value)
    }
}

impl std::fmt::Display for Characteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Characteristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|characteristic| characteristic.as_str() == wanted)
            .ok_or_else(|| format!("unknown characteristic '{s}'"))
    }
}
