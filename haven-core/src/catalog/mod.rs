//! Catalog of locations and their timestamped characteristics.
//!
//! The [`LocationCatalog`] trait is the engine's only view of persistence.
//! Reads may happen concurrently from many requests; writes for a single
//! location are serialised by the matcher, not by the catalog.

use std::time::SystemTime;

use thiserror::Error;

use crate::{HealthIndex, Location, LocationId, Observation};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryCatalog;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteCatalog, SqliteCatalogError};

/// Errors raised by [`LocationCatalog`] implementations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No location with the given identifier exists.
    #[error("location {id} not found")]
    NotFound {
        /// Requested identifier.
        id: LocationId,
    },
    /// A writer panicked while holding the catalog lock.
    #[error("catalog lock poisoned")]
    Poisoned,
    /// The storage backend failed.
    #[error("catalog backend failure: {source}")]
    Backend {
        /// Underlying backend error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Rows removed by [`LocationCatalog::prune_before`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    /// Characteristics snapshots removed.
    pub observations: usize,
    /// Health indices removed.
    pub health_indices: usize,
}

impl PruneSummary {
    /// Total rows removed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.observations + self.health_indices
    }
}

/// Read and write access to catalog locations.
///
/// Every per-location method returns [`CatalogError::NotFound`] for an
/// unknown identifier.
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
/// use geo::Coord;
/// use haven_core::{
///     EnvironmentalProfile, Location, LocationCatalog, LocationId, MemoryCatalog, Observation,
/// };
///
/// let catalog = MemoryCatalog::with_location(Location::new(
///     LocationId(1),
///     "Harbour Walk",
///     Coord { x: -4.14, y: 50.36 },
/// ));
/// assert!(catalog.latest_observation(LocationId(1))?.is_none());
///
/// let observation = Observation::new(EnvironmentalProfile::new(), SystemTime::now());
/// catalog.record_observation(LocationId(1), observation)?;
/// assert!(catalog.latest_observation(LocationId(1))?.is_some());
/// # Ok::<(), haven_core::CatalogError>(())
/// ```
pub trait LocationCatalog: Send + Sync {
    /// Every location, ordered by identifier.
    fn locations(&self) -> Result<Vec<Location>, CatalogError>;

    /// A single location.
    fn location(&self, id: LocationId) -> Result<Location, CatalogError>;

    /// Newest characteristics snapshot, if any.
    fn latest_observation(&self, id: LocationId) -> Result<Option<Observation>, CatalogError>;

    /// Append a characteristics snapshot to the location's history.
    fn record_observation(
        &self,
        id: LocationId,
        observation: Observation,
    ) -> Result<(), CatalogError>;

    /// Newest health index, if any.
    fn latest_health_index(&self, id: LocationId) -> Result<Option<HealthIndex>, CatalogError>;

    /// Append a health index to the location's history.
    fn record_health_index(&self, id: LocationId, index: HealthIndex)
    -> Result<(), CatalogError>;

    /// Health indices computed at or after `since`, oldest first.
    fn health_history(
        &self,
        id: LocationId,
        since: SystemTime,
    ) -> Result<Vec<HealthIndex>, CatalogError>;

    /// Delete snapshots and indices older than `cutoff`.
    fn prune_before(&self, cutoff: SystemTime) -> Result<PruneSummary, CatalogError>;
}

impl<T: LocationCatalog + ?Sized> LocationCatalog for std::sync::Arc<T> {
    fn locations(&self) -> Result<Vec<Location>, CatalogError> {
        (**self).locations()
    }

    fn location(&self, id: LocationId) -> Result<Location, CatalogError> {
        (**self).location(id)
    }

    fn latest_observation(&self, id: LocationId) -> Result<Option<Observation>, CatalogError> {
        (**self).latest_observation(id)
    }

    fn record_observation(
        &self,
        id: LocationId,
        observation: Observation,
    ) -> Result<(), CatalogError> {
        (**self).record_observation(id, observation)
    }

    fn latest_health_index(&self, id: LocationId) -> Result<Option<HealthIndex>, CatalogError> {
        (**self).latest_health_index(id)
    }

    fn record_health_index(
        &self,
        id: LocationId,
        index: HealthIndex,
    ) -> Result<(), CatalogError> {
        (**self).record_health_index(id, index)
    }

    fn health_history(
        &self,
        id: LocationId,
        since: SystemTime,
    ) -> Result<Vec<HealthIndex>, CatalogError> {
        (**self).health_history(id, since)
    }

    fn prune_before(&self, cutoff: SystemTime) -> Result<PruneSummary, CatalogError> {
        (**self).prune_before(cutoff)
    }
}
