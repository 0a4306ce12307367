//! Contract for upstream environmental data providers.
//!
//! A [`GeoDataSource`] returns gridded measurements for one [`Dataset`]
//! inside a bounding box. Sources are synchronous so the engine stays
//! embeddable; implementations backed by async clients block internally.
//!
//! Errors are returned as [`UpstreamFetchError`]. The data gateway absorbs
//! these; they are never surfaced to recommendation callers.

use std::collections::BTreeMap;

use geo::{Coord, Rect};
use thiserror::Error;

/// An upstream dataset family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    /// Reanalysis climate: temperature, dewpoint, pressure, precipitation, wind.
    Climate,
    /// Atmospheric composition: particulates, ozone, nitrogen dioxide.
    AirQuality,
    /// Land-surface vegetation index.
    Vegetation,
    /// Surface solar radiation and UV.
    Solar,
}

impl Dataset {
    /// Every dataset the gateway merges.
    pub const ALL: [Self; 4] = [Self::Climate, Self::AirQuality, Self::Vegetation, Self::Solar];

    /// Short lowercase name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Climate => "climate",
            Self::AirQuality => "air_quality",
            Self::Vegetation => "vegetation",
            Self::Solar => "solar",
        }
    }

    /// Upstream catalogue identifier for the dataset.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        match self {
            Self::Climate => "reanalysis-era5-single-levels",
            Self::AirQuality => "cams-global-atmospheric-composition-forecasts",
            Self::Vegetation => "satellite-land-surface",
            Self::Solar => "cams-solar-radiation",
        }
    }

    /// Variables requested from the dataset.
    #[must_use]
    pub const fn variables(&self) -> &'static [&'static str] {
        match self {
            Self::Climate => &[
                variables::TEMPERATURE_2M,
                variables::DEWPOINT_2M,
                variables::SURFACE_PRESSURE,
                variables::TOTAL_PRECIPITATION,
                variables::WIND_U_10M,
                variables::WIND_V_10M,
            ],
            Self::AirQuality => &[
                variables::PM25,
                variables::PM10,
                variables::OZONE,
                variables::NITROGEN_DIOXIDE,
            ],
            Self::Vegetation => &[variables::NDVI],
            Self::Solar => &[variables::SOLAR_RADIATION, variables::UV_INDEX],
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream variable names.
pub mod variables {
    /// Air temperature at two metres, Kelvin.
    pub const TEMPERATURE_2M: &str = "2m_temperature";
    /// Dewpoint at two metres, Kelvin.
    pub const DEWPOINT_2M: &str = "2m_dewpoint_temperature";
    /// Surface pressure, pascals.
    pub const SURFACE_PRESSURE: &str = "surface_pressure";
    /// Total precipitation, metres.
    pub const TOTAL_PRECIPITATION: &str = "total_precipitation";
    /// Eastward wind at ten metres, metres per second.
    pub const WIND_U_10M: &str = "10m_u_component_of_wind";
    /// Northward wind at ten metres, metres per second.
    pub const WIND_V_10M: &str = "10m_v_component_of_wind";
    /// Fine particulates.
    pub const PM25: &str = "particulate_matter_2.5um";
    /// Coarse particulates.
    pub const PM10: &str = "particulate_matter_10um";
    /// Ozone.
    pub const OZONE: &str = "ozone";
    /// Nitrogen dioxide.
    pub const NITROGEN_DIOXIDE: &str = "nitrogen_dioxide";
    /// Normalised difference vegetation index.
    pub const NDVI: &str = "ndvi";
    /// Cumulative downward surface solar radiation, J/m².
    pub const SOLAR_RADIATION: &str = "surface_solar_radiation_downwards";
    /// UV index.
    pub const UV_INDEX: &str = "uv_index";
}

/// Gridded variables returned for one dataset request.
///
/// Cells may be missing or non-finite; [`DatasetSample::mean`] ignores them.
///
/// # Examples
///
/// ```
/// use haven_core::DatasetSample;
///
/// let sample = DatasetSample::new().with_variable("ndvi", vec![0.4, f64::NAN, 0.6]);
/// assert_eq!(sample.mean("ndvi"), Some(0.5));
/// assert_eq!(sample.mean("ozone"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSample {
    variables: BTreeMap<String, Vec<f64>>,
}

impl DatasetSample {
    /// Create an empty sample.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            variables: BTreeMap::new(),
        }
    }

    /// Add a variable's grid cells while consuming `self`.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, cells: Vec<f64>) -> Self {
        self.insert(name, cells);
        self
    }

    /// Add or replace a variable's grid cells.
    pub fn insert(&mut self, name: impl Into<String>, cells: Vec<f64>) {
        self.variables.insert(name.into(), cells);
    }

    /// Raw cells for a variable.
    #[must_use]
    pub fn cells(&self, name: &str) -> Option<&[f64]> {
        self.variables.get(name).map(Vec::as_slice)
    }

    /// Whether the sample holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Arithmetic mean of a variable's finite cells.
    ///
    /// Returns `None` when the variable is absent or has no finite cells.
    #[must_use]
    pub fn mean(&self, name: &str) -> Option<f64> {
        let (sum, count) = self
            .cells(name)?
            .iter()
            .filter(|cell| cell.is_finite())
            .fold((0.0_f64, 0_u32), |(sum, count), cell| {
                (sum + cell, count + 1)
            });
        (count > 0).then(|| sum / f64::from(count))
    }
}

/// Errors returned by [`GeoDataSource::fetch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamFetchError {
    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The request could not be sent or the connection dropped.
    #[error("network error for {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The provider reported a service-level failure.
    #[error("{dataset} service error: {message}")]
    Service {
        /// Dataset that failed.
        dataset: Dataset,
        /// Error detail reported by the provider.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse provider response: {message}")]
    Parse {
        /// Error detail.
        message: String,
    },
    /// The fetch did not complete, e.g. its worker panicked.
    #[error("{dataset} fetch aborted before completion")]
    Aborted {
        /// Dataset whose fetch was lost.
        dataset: Dataset,
    },
}

/// Outcome of one dataset fetch.
pub type FetchResult = Result<DatasetSample, UpstreamFetchError>;

/// Fetch gridded environmental data for a bounding box.
///
/// Implementations must be thread-safe so independent datasets can be
/// fetched concurrently.
///
/// # Examples
///
/// ```
/// use geo::Rect;
/// use haven_core::{Dataset, DatasetSample, GeoDataSource, UpstreamFetchError};
///
/// struct Calm;
///
/// impl GeoDataSource for Calm {
///     fn fetch(&self, dataset: Dataset, _area: &Rect<f64>) -> Result<DatasetSample, UpstreamFetchError> {
///         match dataset {
///             Dataset::Vegetation => Ok(DatasetSample::new().with_variable("ndvi", vec![0.7])),
///             other => Err(UpstreamFetchError::Aborted { dataset: other }),
///         }
///     }
/// }
///
/// let area = Rect::new((0.0, 0.0), (0.2, 0.2));
/// let results = Calm.fetch_all(&Dataset::ALL, &area);
/// assert_eq!(results.len(), 4);
/// assert!(results.iter().filter(|(_, r)| r.is_ok()).count() == 1);
/// ```
pub trait GeoDataSource: Send + Sync {
    /// Fetch `dataset` for `area`.
    fn fetch(&self, dataset: Dataset, area: &Rect<f64>) -> FetchResult;

    /// Fetch several datasets, returning once every fetch has finished.
    ///
    /// The default implementation runs each fetch on its own scoped thread
    /// and joins them all. Results keep the order of `datasets`.
    fn fetch_all(&self, datasets: &[Dataset], area: &Rect<f64>) -> Vec<(Dataset, FetchResult)> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = datasets
                .iter()
                .map(|&dataset| (dataset, scope.spawn(move || self.fetch(dataset, area))))
                .collect();
            handles
                .into_iter()
                .map(|(dataset, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or(Err(UpstreamFetchError::Aborted { dataset }));
                    (dataset, result)
                })
                .collect()
        })
    }
}

impl<T: GeoDataSource + ?Sized> GeoDataSource for std::sync::Arc<T> {
    fn fetch(&self, dataset: Dataset, area: &Rect<f64>) -> FetchResult {
        (**self).fetch(dataset, area)
    }

    fn fetch_all(&self, datasets: &[Dataset], area: &Rect<f64>) -> Vec<(Dataset, FetchResult)> {
        (**self).fetch_all(datasets, area)
    }
}

/// Bounding box of `buffer_degrees` around `centre`, clamped to valid
/// latitude and longitude.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use haven_core::bounding_box;
///
/// let area = bounding_box(Coord { x: 10.0, y: 45.0 }, 0.1);
/// assert!((area.min().y - 44.9).abs() < 1e-9);
/// assert!((area.max().x - 10.1).abs() < 1e-9);
/// ```
#[must_use]
pub fn bounding_box(centre: Coord<f64>, buffer_degrees: f64) -> Rect<f64> {
    let buffer = buffer_degrees.abs();
    let min = Coord {
        x: (centre.x - buffer).max(-180.0),
        y: (centre.y - buffer).max(-90.0),
    };
    let max = Coord {
        x: (centre.x + buffer).min(180.0),
        y: (centre.y + buffer).min(90.0),
    };
    Rect::new(min, max)
}
