//! Unit conversions and derived indicators applied to upstream variables.

/// Magnus coefficient for water vapour over liquid water.
const MAGNUS_B: f64 = 17.625;
/// Magnus temperature offset in °C.
const MAGNUS_C: f64 = 243.04;
/// Joules in one kilowatt-hour; one hour of 1 kW/m² irradiance.
const JOULES_PER_SUNSHINE_HOUR: f64 = 3_600_000.0;
/// Daylight cap for derived sunshine hours.
const MAX_SUNSHINE_HOURS: f64 = 12.0;

/// Convert Kelvin to degrees Celsius.
#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - 273.15
}

/// Convert pascals to hectopascals.
#[must_use]
pub fn pascal_to_hectopascal(pascal: f64) -> f64 {
    pascal / 100.0
}

/// Convert metres of precipitation to millimetres.
#[must_use]
pub fn metres_to_millimetres(metres: f64) -> f64 {
    metres * 1000.0
}

/// Relative humidity in percent from air and dewpoint temperatures in °C.
///
/// Uses the Magnus approximation, capped at 100%.
///
/// # Examples
///
/// ```
/// use haven_data::conversions::relative_humidity;
///
/// assert!((relative_humidity(20.0, 10.0) - 52.54).abs() < 0.01);
/// assert_eq!(relative_humidity(15.0, 16.0), 100.0);
/// ```
#[must_use]
pub fn relative_humidity(temperature_c: f64, dewpoint_c: f64) -> f64 {
    let saturation = |celsius: f64| (MAGNUS_B * celsius / (MAGNUS_C + celsius)).exp();
    (100.0 * saturation(dewpoint_c) / saturation(temperature_c)).min(100.0)
}

/// Wind speed in km/h from eastward and northward components in m/s.
#[must_use]
pub fn wind_speed_kmh(u: f64, v: f64) -> f64 {
    u.hypot(v) * 3.6
}

/// Composite air quality indicator from whichever pollutants are present.
///
/// Each pollutant is scaled onto a common index and the worst one wins.
/// Returns `None` when no pollutant is available.
#[must_use]
pub fn air_quality_index(
    pm25: Option<f64>,
    pm10: Option<f64>,
    ozone: Option<f64>,
    nitrogen_dioxide: Option<f64>,
) -> Option<f64> {
    [
        pm25.map(|value| value * 4.0),
        pm10.map(|value| value * 2.0),
        ozone.map(|value| value * 0.5),
        nitrogen_dioxide.map(|value| value * 0.5),
    ]
    .into_iter()
    .flatten()
    .reduce(f64::max)
}

/// Vegetation greenness in `0.0..=1.0` from an NDVI reading.
#[must_use]
pub fn greenness(ndvi: f64) -> f64 {
    ndvi.clamp(0.0, 1.0)
}

/// Sunshine hours from cumulative surface radiation in J/m².
#[must_use]
pub fn sunshine_hours(radiation: f64) -> f64 {
    (radiation / JOULES_PER_SUNSHINE_HOUR).min(MAX_SUNSHINE_HOURS)
}
