//! Location matching and recommendations for the Haven engine.
//!
//! [`LocationMatcher`] ranks catalog locations near an origin by how closely
//! their characteristics resemble a target profile and how healthy they
//! are, refreshing stale characteristics on the way. [`RecommendationService`]
//! wraps the matcher with user-state normalisation and produces the
//! [`Prediction`](haven_core::Prediction) returned to callers.
//!
//! ```
//! use std::sync::Arc;
//! use geo::Coord;
//! use haven_core::{Location, LocationId, MemoryCatalog};
//! use haven_data::GeoDataGateway;
//! use haven_data::test_support::StubGeoDataSource;
//! use haven_data::default_characteristics;
//! use haven_matcher::LocationMatcher;
//!
//! let catalog = MemoryCatalog::with_location(Location::new(
//!     LocationId(1),
//!     "Riverside",
//!     Coord { x: -0.12, y: 51.5 },
//! ));
//! let matcher = LocationMatcher::new(
//!     catalog,
//!     GeoDataGateway::new(StubGeoDataSource::unavailable()),
//! );
//! let ranked = matcher.find_matches(&default_characteristics(), Coord { x: -0.12, y: 51.5 }, 5.0)?;
//! assert_eq!(ranked.len(), 1);
//! assert!(ranked[0].similarity_score > 0.99);
//! # Ok::<(), haven_matcher::MatchError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod distance;
mod error;
mod matcher;
mod refresh;
mod service;

pub use distance::geodesic_km;
pub use error::{MatchError, RecommendationError};
pub use matcher::{LocationMatcher, MatcherConfig};
pub use service::{HealthStatus, RecommendationService, ServiceConfig};
