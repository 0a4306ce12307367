//! Test utilities for geodata sources.
//!
//! [`StubGeoDataSource`] returns pre-configured samples or errors per dataset
//! without making HTTP requests, and counts every fetch it serves.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Rect;
use haven_core::{Dataset, DatasetSample, FetchResult, GeoDataSource, UpstreamFetchError};

/// Stub [`GeoDataSource`] for testing.
///
/// Datasets without a configured response fail with a service error.
///
/// # Example
///
/// ```
/// use geo::Rect;
/// use haven_core::{Dataset, DatasetSample, GeoDataSource};
/// use haven_data::test_support::StubGeoDataSource;
///
/// let source = StubGeoDataSource::unavailable()
///     .with_sample(Dataset::Vegetation, DatasetSample::new().with_variable("ndvi", vec![0.7]));
/// let area = Rect::new((0.0, 0.0), (0.2, 0.2));
///
/// assert!(source.fetch(Dataset::Vegetation, &area).is_ok());
/// assert!(source.fetch(Dataset::Solar, &area).is_err());
/// assert_eq!(source.calls(), 2);
/// ```
#[derive(Debug, Default)]
pub struct StubGeoDataSource {
    responses: BTreeMap<Dataset, FetchResult>,
    calls: AtomicUsize,
}

impl Clone for StubGeoDataSource {
    fn clone(&self) -> Self {
        Self {
            responses: self.responses.clone(),
            calls: AtomicUsize::new(self.calls()),
        }
    }
}

impl StubGeoDataSource {
    /// A source where every dataset fails.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Serve `sample` for `dataset`.
    #[must_use]
    pub fn with_sample(mut self, dataset: Dataset, sample: DatasetSample) -> Self {
        self.responses.insert(dataset, Ok(sample));
        self
    }

    /// Fail `dataset` with `error`.
    #[must_use]
    pub fn with_error(mut self, dataset: Dataset, error: UpstreamFetchError) -> Self {
        self.responses.insert(dataset, Err(error));
        self
    }

    /// Number of fetches served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeoDataSource for StubGeoDataSource {
    fn fetch(&self, dataset: Dataset, _area: &Rect<f64>) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.get(&dataset).cloned().unwrap_or_else(|| {
            Err(UpstreamFetchError::Service {
                dataset,
                message: "no stub response configured".to_owned(),
            })
        })
    }
}
