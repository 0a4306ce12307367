//! Merge upstream dataset samples into one environmental profile.
//!
//! The gateway asks its [`GeoDataSource`] for every dataset concurrently,
//! derives characteristics from whatever came back, drops implausible
//! values and fills the gaps from a defaults table. Upstream failures are
//! logged and absorbed; callers always receive a complete profile.

use geo::Coord;
use haven_core::geodata::variables;
use haven_core::{
    Characteristic, Dataset, DatasetSample, EnvironmentalProfile, GeoDataSource, bounding_box,
};

use crate::conversions;
use crate::default_characteristics;

/// Default half-width of the sampled area in degrees.
pub const DEFAULT_BUFFER_DEGREES: f64 = 0.1;

/// Settings for [`GeoDataGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Half-width of the sampled bounding box in degrees.
    pub buffer_degrees: f64,
    /// Characteristics used for anything the providers do not supply.
    pub defaults: EnvironmentalProfile,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            buffer_degrees: DEFAULT_BUFFER_DEGREES,
            defaults: default_characteristics(),
        }
    }
}

impl GatewayConfig {
    /// Set the bounding-box buffer.
    #[must_use]
    pub fn with_buffer_degrees(mut self, buffer_degrees: f64) -> Self {
        self.buffer_degrees = buffer_degrees;
        self
    }

    /// Replace the defaults table.
    #[must_use]
    pub fn with_defaults(mut self, defaults: EnvironmentalProfile) -> Self {
        self.defaults = defaults;
        self
    }
}

/// Fetches and merges environmental characteristics for a point.
///
/// # Examples
///
/// ```
/// use haven_core::Characteristic;
/// use haven_data::GeoDataGateway;
/// use haven_data::test_support::StubGeoDataSource;
///
/// let gateway = GeoDataGateway::new(StubGeoDataSource::unavailable());
/// let profile = gateway.get_characteristics(51.5, -0.1);
/// assert_eq!(profile, haven_data::default_characteristics());
/// ```
#[derive(Debug, Clone)]
pub struct GeoDataGateway<S> {
    source: S,
    config: GatewayConfig,
}

impl<S: GeoDataSource> GeoDataGateway<S> {
    /// Create a gateway with default settings.
    pub fn new(source: S) -> Self {
        Self::with_config(source, GatewayConfig::default())
    }

    /// Create a gateway with explicit settings.
    pub fn with_config(source: S, config: GatewayConfig) -> Self {
        Self { source, config }
    }

    /// Upstream source in use.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Settings in use.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Characteristics for the point at `latitude`, `longitude`.
    ///
    /// Never fails: datasets that cannot be fetched are logged and their
    /// characteristics come from the defaults table.
    pub fn get_characteristics(&self, latitude: f64, longitude: f64) -> EnvironmentalProfile {
        if !latitude.is_finite() || !longitude.is_finite() {
            log::warn!("cannot sample non-finite position ({latitude}, {longitude}); using defaults");
            return self.config.defaults.clone();
        }
        let area = bounding_box(
            Coord {
                x: longitude,
                y: latitude,
            },
            self.config.buffer_degrees,
        );

        let mut profile = EnvironmentalProfile::new();
        for (dataset, result) in self.source.fetch_all(&Dataset::ALL, &area) {
            match result {
                Ok(sample) => profile.overlay(&derive(dataset, &sample)),
                Err(err) => log::warn!(
                    "{dataset} data unavailable for ({latitude}, {longitude}): {err}"
                ),
            }
        }

        for (characteristic, value) in profile.retain_plausible() {
            log::warn!("discarding implausible {characteristic}={value} for ({latitude}, {longitude})");
        }
        profile.fill_missing(&self.config.defaults);
        profile
    }
}

/// Characteristics derivable from one dataset's sample.
pub fn derive(dataset: Dataset, sample: &DatasetSample) -> EnvironmentalProfile {
    let mut profile = EnvironmentalProfile::new();
    let mut put = |characteristic, value: Option<f64>| {
        if let Some(value) = value {
            profile.insert(characteristic, value);
        }
    };
    match dataset {
        Dataset::Climate => {
            let temperature = sample
                .mean(variables::TEMPERATURE_2M)
                .map(conversions::kelvin_to_celsius);
            let dewpoint = sample
                .mean(variables::DEWPOINT_2M)
                .map(conversions::kelvin_to_celsius);
            put(Characteristic::Temperature, temperature);
            put(
                Characteristic::Humidity,
                temperature
                    .zip(dewpoint)
                    .map(|(air, dew)| conversions::relative_humidity(air, dew)),
            );
            put(
                Characteristic::AirPressure,
                sample
                    .mean(variables::SURFACE_PRESSURE)
                    .map(conversions::pascal_to_hectopascal),
            );
            put(
                Characteristic::Precipitation,
                sample
                    .mean(variables::TOTAL_PRECIPITATION)
                    .map(conversions::metres_to_millimetres),
            );
            put(
                Characteristic::WindSpeed,
                sample
                    .mean(variables::WIND_U_10M)
                    .zip(sample.mean(variables::WIND_V_10M))
                    .map(|(u, v)| conversions::wind_speed_kmh(u, v)),
            );
        }
        Dataset::AirQuality => {
            let pm25 = sample.mean(variables::PM25);
            let pm10 = sample.mean(variables::PM10);
            let ozone = sample.mean(variables::OZONE);
            let nitrogen_dioxide = sample.mean(variables::NITROGEN_DIOXIDE);
            put(Characteristic::Pm25, pm25);
            put(Characteristic::Pm10, pm10);
            put(Characteristic::O3, ozone);
            put(Characteristic::No2, nitrogen_dioxide);
            put(
                Characteristic::AirQuality,
                conversions::air_quality_index(pm25, pm10, ozone, nitrogen_dioxide),
            );
        }
        Dataset::Vegetation => {
            put(
                Characteristic::Greenness,
                sample.mean(variables::NDVI).map(conversions::greenness),
            );
        }
        Dataset::Solar => {
            put(
                Characteristic::SunshineHours,
                sample
                    .mean(variables::SOLAR_RADIATION)
                    .map(conversions::sunshine_hours),
            );
            put(Characteristic::UvIndex, sample.mean(variables::UV_INDEX));
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubGeoDataSource;
    use haven_core::UpstreamFetchError;
    use rstest::rstest;

    fn climate_sample() -> DatasetSample {
        DatasetSample::new()
            .with_variable(variables::TEMPERATURE_2M, vec![293.15, 293.15])
            .with_variable(variables::DEWPOINT_2M, vec![283.15])
            .with_variable(variables::SURFACE_PRESSURE, vec![101_500.0])
            .with_variable(variables::TOTAL_PRECIPITATION, vec![0.002, f64::NAN])
    }

    #[rstest]
    fn derives_climate_characteristics() {
        let profile = derive(Dataset::Climate, &climate_sample());
        let temperature = profile.get(Characteristic::Temperature).expect("temperature");
        let humidity = profile.get(Characteristic::Humidity).expect("humidity");
        assert!((temperature - 20.0).abs() < 1e-9);
        assert!((humidity - 52.54).abs() < 0.01);
        assert_eq!(profile.get(Characteristic::AirPressure), Some(1015.0));
        assert_eq!(profile.get(Characteristic::Precipitation), Some(2.0));
        assert!(!profile.contains(Characteristic::WindSpeed));
    }

    #[rstest]
    fn derives_air_quality_index() {
        let sample = DatasetSample::new()
            .with_variable(variables::PM25, vec![6.0, 8.0])
            .with_variable(variables::OZONE, vec![60.0]);
        let profile = derive(Dataset::AirQuality, &sample);
        assert_eq!(profile.get(Characteristic::Pm25), Some(7.0));
        assert_eq!(profile.get(Characteristic::AirQuality), Some(30.0));
        assert!(!profile.contains(Characteristic::Pm10));
    }

    #[rstest]
    fn merges_partial_results_with_defaults() {
        let source = StubGeoDataSource::unavailable().with_sample(Dataset::Climate, climate_sample());
        let gateway = GeoDataGateway::new(source);
        let profile = gateway.get_characteristics(48.85, 2.35);

        assert_eq!(profile.get(Characteristic::AirPressure), Some(1015.0));
        assert_eq!(profile.get(Characteristic::Greenness), Some(0.5));
        assert_eq!(profile.get(Characteristic::Pm25), Some(10.0));
        assert_eq!(gateway.source().calls(), 4);
    }

    #[rstest]
    fn implausible_values_fall_back_to_defaults() {
        let sample = DatasetSample::new().with_variable(variables::UV_INDEX, vec![99.0]);
        let source = StubGeoDataSource::unavailable().with_sample(Dataset::Solar, sample);
        let profile = GeoDataGateway::new(source).get_characteristics(0.0, 0.0);
        assert_eq!(profile.get(Characteristic::UvIndex), Some(4.0));
    }

    #[rstest]
    fn non_finite_position_uses_defaults_without_fetching() {
        let source = StubGeoDataSource::unavailable();
        let gateway = GeoDataGateway::new(source);
        let profile = gateway.get_characteristics(f64::NAN, 0.0);
        assert_eq!(profile, default_characteristics());
        assert_eq!(gateway.source().calls(), 0);
    }

    #[rstest]
    fn failures_do_not_leak_to_callers() {
        let source = StubGeoDataSource::unavailable().with_error(
            Dataset::AirQuality,
            UpstreamFetchError::Timeout {
                url: "http://geodata.invalid".into(),
                timeout_secs: 30,
            },
        );
        let profile = GeoDataGateway::new(source).get_characteristics(10.0, 10.0);
        assert_eq!(profile, default_characteristics());
    }
}
