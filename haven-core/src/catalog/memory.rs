//! In-memory catalog guarded by a reader-writer lock.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use super::{CatalogError, LocationCatalog, PruneSummary};
use crate::{HealthIndex, Location, LocationId, Observation};

#[derive(Debug)]
struct Entry {
    location: Location,
    observations: Vec<Observation>,
    health_indices: Vec<HealthIndex>,
}

impl Entry {
    const fn new(location: Location) -> Self {
        Self {
            location,
            observations: Vec::new(),
            health_indices: Vec::new(),
        }
    }
}

/// [`LocationCatalog`] held entirely in memory.
///
/// Histories are kept in insertion order; callers record snapshots with
/// non-decreasing timestamps.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entries: RwLock<BTreeMap<LocationId, Entry>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog containing a single location.
    #[must_use]
    pub fn with_location(location: Location) -> Self {
        Self::with_locations(std::iter::once(location))
    }

    /// Create a catalog from a collection of locations.
    pub fn with_locations<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = Location>,
    {
        let entries = locations
            .into_iter()
            .map(|location| (location.id, Entry::new(location)))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Add or replace a location, keeping any recorded history.
    ///
    /// # Errors
    /// Returns [`CatalogError::Poisoned`] if the lock was poisoned.
    pub fn insert_location(&self, location: Location) -> Result<(), CatalogError> {
        let mut entries = self.write()?;
        match entries.get_mut(&location.id) {
            Some(entry) => entry.location = location,
            None => {
                entries.insert(location.id, Entry::new(location));
            }
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<LocationId, Entry>>, CatalogError> {
        self.entries.read().map_err(|_| CatalogError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<LocationId, Entry>>, CatalogError> {
        self.entries.write().map_err(|_| CatalogError::Poisoned)
    }

    fn with_entry<T>(
        &self,
        id: LocationId,
        f: impl FnOnce(&Entry) -> T,
    ) -> Result<T, CatalogError> {
        let entries = self.read()?;
        entries
            .get(&id)
            .map(f)
            .ok_or(CatalogError::NotFound { id })
    }

    fn with_entry_mut<T>(
        &self,
        id: LocationId,
        f: impl FnOnce(&mut Entry) -> T,
    ) -> Result<T, CatalogError> {
        let mut entries = self.write()?;
        entries
            .get_mut(&id)
            .map(f)
            .ok_or(CatalogError::NotFound { id })
    }
}

impl LocationCatalog for MemoryCatalog {
    fn locations(&self) -> Result<Vec<Location>, CatalogError> {
        let entries = self.read()?;
        Ok(entries.values().map(|entry| entry.location.clone()).collect())
    }

    fn location(&self, id: LocationId) -> Result<Location, CatalogError> {
        self.with_entry(id, |entry| entry.location.clone())
    }

    fn latest_observation(&self, id: LocationId) -> Result<Option<Observation>, CatalogError> {
        self.with_entry(id, |entry| entry.observations.last().cloned())
    }

    fn record_observation(
        &self,
        id: LocationId,
        observation: Observation,
    ) -> Result<(), CatalogError> {
        self.with_entry_mut(id, |entry| entry.observations.push(observation))
    }

    fn latest_health_index(&self, id: LocationId) -> Result<Option<HealthIndex>, CatalogError> {
        self.with_entry(id, |entry| entry.health_indices.last().cloned())
    }

    fn record_health_index(
        &self,
        id: LocationId,
        index: HealthIndex,
    ) -> Result<(), CatalogError> {
        self.with_entry_mut(id, |entry| entry.health_indices.push(index))
    }

    fn health_history(
        &self,
        id: LocationId,
        since: SystemTime,
    ) -> Result<Vec<HealthIndex>, CatalogError> {
        self.with_entry(id, |entry| {
            entry
                .health_indices
                .iter()
                .filter(|index| index.computed_at >= since)
                .cloned()
                .collect()
        })
    }

    fn prune_before(&self, cutoff: SystemTime) -> Result<PruneSummary, CatalogError> {
        let mut entries = self.write()?;
        let mut summary = PruneSummary::default();
        for entry in entries.values_mut() {
            let observations = entry.observations.len();
            entry
                .observations
                .retain(|observation| observation.observed_at >= cutoff);
            summary.observations += observations - entry.observations.len();

            let indices = entry.health_indices.len();
            entry
                .health_indices
                .retain(|index| index.computed_at >= cutoff);
            summary.health_indices += indices - entry.health_indices.len();
        }
        Ok(summary)
    }
}
