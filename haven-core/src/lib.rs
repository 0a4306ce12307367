//! Core domain types for the Haven wellbeing location engine.
//!
//! This crate defines the vocabulary shared by the scorer, data gateway and
//! matcher: environmental profiles, catalog locations, health indices and
//! predictions, together with the two external seams the engine consumes:
//! the [`LocationCatalog`] store and the [`GeoDataSource`] provider.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod catalog;
mod characteristic;
mod clock;
pub mod geodata;
mod health;
mod location;
mod prediction;
mod profile;
mod target;
mod user_state;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use catalog::{CatalogError, LocationCatalog, MemoryCatalog, PruneSummary};
#[cfg(feature = "store-sqlite")]
pub use catalog::{SqliteCatalog, SqliteCatalogError};
pub use characteristic::Characteristic;
pub use clock::{Clock, SystemClock};
pub use geodata::{
    Dataset, DatasetSample, FetchResult, GeoDataSource, UpstreamFetchError, bounding_box,
};
pub use health::{ComponentScores, HealthComponent, HealthIndex};
pub use location::{GeoAttributes, Location, LocationId, Observation};
pub use prediction::{Prediction, RankedCandidate, SimilarLocation};
pub use profile::EnvironmentalProfile;
pub use target::{FeatureVector, TargetProfileStrategy};
pub use user_state::{FieldViolation, UserState, ValidationError, ViolationKind};
