//! Fallback characteristics used when upstream data is unavailable.

use haven_core::{Characteristic, EnvironmentalProfile};

/// Characteristics assumed for any location the providers cannot describe.
///
/// # Examples
///
/// ```
/// use haven_core::Characteristic;
/// use haven_data::default_characteristics;
///
/// let defaults = default_characteristics();
/// assert_eq!(defaults.get(Characteristic::AirPressure), Some(1013.25));
/// assert_eq!(defaults.len(), 12);
/// ```
#[must_use]
pub fn default_characteristics() -> EnvironmentalProfile {
    [
        (Characteristic::Temperature, 20.0),
        (Characteristic::Humidity, 50.0),
        (Characteristic::AirPressure, 1013.25),
        (Characteristic::Precipitation, 0.0),
        (Characteristic::AirQuality, 50.0),
        (Characteristic::Pm25, 10.0),
        (Characteristic::Pm10, 20.0),
        (Characteristic::O3, 40.0),
        (Characteristic::No2, 20.0),
        (Characteristic::Greenness, 0.5),
        (Characteristic::SunshineHours, 7.0),
        (Characteristic::UvIndex, 4.0),
    ]
    .into_iter()
    .collect()
}
