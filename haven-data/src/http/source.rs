//! [`GeoDataSource`] backed by a JSON geodata service.
//!
//! The [`GeoDataSource`] trait is synchronous so the engine stays embeddable
//! in synchronous contexts. This source bridges its async HTTP calls to the
//! sync interface by blocking on a Tokio runtime internally.

use std::future::Future;
use std::time::Duration;

use futures_util::future::join_all;
use geo::Rect;
use haven_core::{Dataset, DatasetSample, FetchResult, GeoDataSource, UpstreamFetchError};
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::wire::SampleResponse;

/// Error type for [`HttpGeoDataSource`] construction failures.
#[derive(Debug)]
pub enum SourceBuildError {
    /// The base URL could not be parsed or cannot carry a path.
    BaseUrl(String),
    /// The reqwest client could not be constructed.
    HttpClient(reqwest::Error),
    /// The blocking runtime could not be started.
    Runtime(std::io::Error),
}

impl std::fmt::Display for SourceBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BaseUrl(url) => write!(f, "invalid geodata base URL: {url}"),
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for SourceBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BaseUrl(_) => None,
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for geodata requests.
pub const DEFAULT_USER_AGENT: &str = "haven-geodata/0.1";

/// Upstream sample requests give up after this many seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpGeoDataSource`].
#[derive(Clone)]
pub struct HttpGeoDataSourceConfig {
    /// Base URL for the geodata service.
    pub base_url: String,
    /// Bearer token sent with every request, if any.
    pub api_key: Option<String>,
    /// Connect and overall request timeout.
    pub timeout: Duration,
    /// `User-Agent` header sent with each sample request.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpGeoDataSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGeoDataSourceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpGeoDataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpGeoDataSourceConfig {
    /// Configuration for the geodata service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Geodata source sampling datasets over HTTP.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the source blocks on its own stored runtime.
/// Inside a multi-threaded runtime it uses that runtime's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it
/// falls back to its own runtime, which may deadlock if the caller's runtime
/// drives IO this request depends on.
pub struct HttpGeoDataSource {
    client: Client,
    config: HttpGeoDataSourceConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpGeoDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGeoDataSource")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpGeoDataSource {
    /// Create a new source with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceBuildError> {
        Self::with_config(HttpGeoDataSourceConfig::new(base_url))
    }

    /// Create a new source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: HttpGeoDataSourceConfig) -> Result<Self, SourceBuildError> {
        let base = Url::parse(&config.base_url)
            .map_err(|err| SourceBuildError::BaseUrl(format!("{}: {err}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(SourceBuildError::BaseUrl(config.base_url));
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Build the sample URL for a dataset and bounding box.
    ///
    /// The URL format is
    /// `{base_url}/datasets/{identifier}/sample?north=..&west=..&south=..&east=..&variables=a,b`.
    fn build_sample_url(&self, dataset: Dataset, area: &Rect<f64>) -> Result<Url, UpstreamFetchError> {
        let endpoint = format!(
            "{}/datasets/{}/sample",
            self.config.base_url.trim_end_matches('/'),
            dataset.identifier()
        );
        let (min, max) = (area.min(), area.max());
        Url::parse_with_params(
            &endpoint,
            [
                ("north", max.y.to_string()),
                ("west", min.x.to_string()),
                ("south", min.y.to_string()),
                ("east", max.x.to_string()),
                ("variables", dataset.variables().join(",")),
            ],
        )
        .map_err(|err| UpstreamFetchError::Network {
            url: endpoint.clone(),
            message: err.to_string(),
        })
    }

    /// Fetch one dataset asynchronously.
    async fn fetch_async(&self, dataset: Dataset, area: &Rect<f64>) -> FetchResult {
        let url = self.build_sample_url(dataset, area)?;
        log::debug!("requesting {dataset} sample from {url}");

        let mut request = self.client.get(url.clone());
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;

        let body: SampleResponse =
            response
                .json()
                .await
                .map_err(|err| UpstreamFetchError::Parse {
                    message: err.to_string(),
                })?;

        Self::convert_response(dataset, body)
    }

    /// Convert a reqwest error to an `UpstreamFetchError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> UpstreamFetchError {
        if error.is_timeout() {
            return UpstreamFetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return UpstreamFetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        if error.is_decode() {
            return UpstreamFetchError::Parse {
                message: error.to_string(),
            };
        }

        UpstreamFetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Convert a service response into a sample.
    ///
    /// `null` cells become NaN so [`DatasetSample::mean`] skips them.
    fn convert_response(dataset: Dataset, response: SampleResponse) -> FetchResult {
        if !response.is_ok() {
            return Err(UpstreamFetchError::Service {
                dataset,
                message: response.message.unwrap_or_default(),
            });
        }

        let sample = response
            .variables
            .into_iter()
            .fold(DatasetSample::new(), |sample, (name, cells)| {
                let cells = cells
                    .into_iter()
                    .map(|cell| cell.unwrap_or(f64::NAN))
                    .collect();
                sample.with_variable(name, cells)
            });
        Ok(sample)
    }

    /// Drive `future` to completion from synchronous code.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        // block_in_place needs a multi-threaded runtime; anything else uses
        // the stored runtime.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

impl GeoDataSource for HttpGeoDataSource {
    fn fetch(&self, dataset: Dataset, area: &Rect<f64>) -> FetchResult {
        self.block_on(self.fetch_async(dataset, area))
    }

    /// Fetch every dataset concurrently on one runtime.
    fn fetch_all(&self, datasets: &[Dataset], area: &Rect<f64>) -> Vec<(Dataset, FetchResult)> {
        let requests = datasets
            .iter()
            .map(|&dataset| async move { (dataset, self.fetch_async(dataset, area).await) });
        self.block_on(join_all(requests))
    }
}
