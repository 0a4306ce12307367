//! HTTP-backed geodata source.
//!
//! This module provides [`HttpGeoDataSource`], an implementation of
//! [`haven_core::GeoDataSource`] that samples gridded datasets from a JSON
//! geodata service.
//!
//! # Architecture
//!
//! Each dataset is requested with a single `GET` to
//! `{base_url}/datasets/{identifier}/sample`, passing the bounding box and
//! the wanted variables as query parameters. The synchronous
//! [`GeoDataSource`](haven_core::GeoDataSource) trait is implemented by
//! blocking on async HTTP calls internally; fetching several datasets runs
//! their requests concurrently on one runtime.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geo::Coord;
//! use haven_core::{Dataset, GeoDataSource, bounding_box};
//! use haven_data::http::{HttpGeoDataSource, HttpGeoDataSourceConfig};
//!
//! let config = HttpGeoDataSourceConfig::new("https://geodata.example.com/api")
//!     .with_api_key("secret")
//!     .with_timeout(Duration::from_secs(60));
//! let source = HttpGeoDataSource::with_config(config)?;
//!
//! let area = bounding_box(Coord { x: -0.1, y: 51.5 }, 0.1);
//! let sample = source.fetch(Dataset::Climate, &area)?;
//! println!("temperature: {:?}", sample.mean("2m_temperature"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod source;
mod wire;

pub use source::{
    DEFAULT_USER_AGENT, HttpGeoDataSource, HttpGeoDataSourceConfig, SourceBuildError,
};
