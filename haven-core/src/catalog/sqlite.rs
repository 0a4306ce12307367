//! SQLite-backed catalog persisting locations and their histories.
//!
//! Profiles and health index components are stored as JSON text; timestamps
//! are stored as milliseconds since the Unix epoch.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::{Duration, SystemTime},
};

use geo::Coord;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use super::{CatalogError, LocationCatalog, PruneSummary};
use crate::{
    ComponentScores, EnvironmentalProfile, GeoAttributes, HealthIndex, Location, LocationId,
    Observation,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    altitude_m REAL,
    water_proximity_m REAL,
    urban_density REAL,
    greenness REAL
);
CREATE TABLE IF NOT EXISTS observations (
    location_id INTEGER NOT NULL REFERENCES locations(id),
    observed_at_ms INTEGER NOT NULL,
    profile TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS observations_by_location
    ON observations (location_id, observed_at_ms);
CREATE TABLE IF NOT EXISTS health_indices (
    location_id INTEGER NOT NULL REFERENCES locations(id),
    computed_at_ms INTEGER NOT NULL,
    overall REAL NOT NULL,
    components TEXT NOT NULL,
    recommendations TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS health_indices_by_location
    ON health_indices (location_id, computed_at_ms);
";

const LOCATION_COLUMNS: &str =
    "id, name, latitude, longitude, altitude_m, water_proximity_m, urban_density, greenness";

/// Error raised when reading or writing the SQLite catalog.
#[derive(Debug, Error)]
pub enum SqliteCatalogError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite catalog at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the catalog schema failed.
    #[error("failed to create catalog schema: {0}")]
    Schema(#[source] rusqlite::Error),
    /// A location identifier does not fit SQLite's signed integer range.
    #[error("location id {id} exceeds SQLite i64 range")]
    IdOutOfRange {
        /// Offending identifier.
        id: LocationId,
    },
    /// A timestamp precedes the Unix epoch or overflows the column.
    #[error("timestamp cannot be stored as epoch milliseconds")]
    TimestampOutOfRange,
    /// A stored JSON payload could not be encoded or decoded.
    #[error("invalid JSON payload for location {id}: {source}")]
    Payload {
        /// Location whose payload failed.
        id: LocationId,
        /// JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Generic SQLite error.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

impl From<SqliteCatalogError> for CatalogError {
    fn from(error: SqliteCatalogError) -> Self {
        Self::Backend {
            source: Box::new(error),
        }
    }
}

/// [`LocationCatalog`] persisted in a SQLite database.
///
/// A single connection is shared behind a mutex; statements are short and
/// never span an upstream fetch.
pub struct SqliteCatalog {
    path: Option<PathBuf>,
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCatalog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteCatalog {
    /// Open (or create) a catalog database at `path`.
    ///
    /// # Errors
    /// Returns [`SqliteCatalogError::OpenDatabase`] when the file cannot be
    /// opened and [`SqliteCatalogError::Schema`] when the schema cannot be
    /// created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteCatalogError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteCatalogError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(Some(path.to_path_buf()), connection)
    }

    /// Open a private in-memory catalog.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqliteCatalogError> {
        let connection = Connection::open_in_memory()?;
        Self::from_connection(None, connection)
    }

    fn from_connection(
        path: Option<PathBuf>,
        connection: Connection,
    ) -> Result<Self, SqliteCatalogError> {
        connection
            .execute_batch(SCHEMA)
            .map_err(SqliteCatalogError::Schema)?;
        Ok(Self {
            path,
            connection: Mutex::new(connection),
        })
    }

    /// Insert a location, replacing any existing row with the same id.
    ///
    /// # Errors
    /// Returns an error when the id does not fit SQLite or the write fails.
    pub fn upsert_location(&self, location: &Location) -> Result<(), CatalogError> {
        let id = sql_id(location.id)?;
        let attributes = location.attributes;
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT INTO locations (id, name, latitude, longitude, altitude_m, \
                 water_proximity_m, urban_density, greenness) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, \
                 latitude = excluded.latitude, longitude = excluded.longitude, \
                 altitude_m = excluded.altitude_m, \
                 water_proximity_m = excluded.water_proximity_m, \
                 urban_density = excluded.urban_density, greenness = excluded.greenness",
                params![
                    id,
                    location.name,
                    location.latitude(),
                    location.longitude(),
                    attributes.altitude_m,
                    attributes.water_proximity_m,
                    attributes.urban_density,
                    attributes.greenness,
                ],
            )
            .map_err(SqliteCatalogError::from)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.connection.lock().map_err(|_| CatalogError::Poisoned)
    }

    fn ensure_exists(connection: &Connection, id: LocationId) -> Result<i64, CatalogError> {
        let key = sql_id(id)?;
        let found: Option<i64> = connection
            .query_row("SELECT id FROM locations WHERE id = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(SqliteCatalogError::from)?;
        found.ok_or(CatalogError::NotFound { id })
    }
}

impl LocationCatalog for SqliteCatalog {
    fn locations(&self) -> Result<Vec<Location>, CatalogError> {
        let connection = self.lock()?;
        let mut statement = connection
            .prepare(&format!("SELECT {LOCATION_COLUMNS} FROM locations ORDER BY id"))
            .map_err(SqliteCatalogError::from)?;
        let rows = statement
            .query_map([], location_from_row)
            .map_err(SqliteCatalogError::from)?;
        let locations = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(SqliteCatalogError::from)?;
        Ok(locations)
    }

    fn location(&self, id: LocationId) -> Result<Location, CatalogError> {
        let key = sql_id(id)?;
        let connection = self.lock()?;
        let location = connection
            .query_row(
                &format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1"),
                [key],
                location_from_row,
            )
            .optional()
            .map_err(SqliteCatalogError::from)?;
        location.ok_or(CatalogError::NotFound { id })
    }

    fn latest_observation(&self, id: LocationId) -> Result<Option<Observation>, CatalogError> {
        let connection = self.lock()?;
        let key = Self::ensure_exists(&connection, id)?;
        let row: Option<(i64, String)> = connection
            .query_row(
                "SELECT observed_at_ms, profile FROM observations WHERE location_id = ?1 \
                 ORDER BY observed_at_ms DESC, rowid DESC LIMIT 1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(SqliteCatalogError::from)?;
        let Some((observed_ms, payload)) = row else {
            return Ok(None);
        };
        let profile: EnvironmentalProfile = decode(id, &payload)?;
        Ok(Some(Observation::new(profile, from_epoch_ms(observed_ms)?)))
    }

    fn record_observation(
        &self,
        id: LocationId,
        observation: Observation,
    ) -> Result<(), CatalogError> {
        let payload = encode(id, &observation.profile)?;
        let observed_ms = to_epoch_ms(observation.observed_at)?;
        let connection = self.lock()?;
        let key = Self::ensure_exists(&connection, id)?;
        connection
            .execute(
                "INSERT INTO observations (location_id, observed_at_ms, profile) \
                 VALUES (?1, ?2, ?3)",
                params![key, observed_ms, payload],
            )
            .map_err(SqliteCatalogError::from)?;
        Ok(())
    }

    fn latest_health_index(&self, id: LocationId) -> Result<Option<HealthIndex>, CatalogError> {
        let connection = self.lock()?;
        let key = Self::ensure_exists(&connection, id)?;
        let row = connection
            .query_row(
                "SELECT computed_at_ms, overall, components, recommendations \
                 FROM health_indices WHERE location_id = ?1 \
                 ORDER BY computed_at_ms DESC, rowid DESC LIMIT 1",
                [key],
                StoredIndex::from_row,
            )
            .optional()
            .map_err(SqliteCatalogError::from)?;
        row.map(|stored| stored.decode(id)).transpose()
    }

    fn record_health_index(
        &self,
        id: LocationId,
        index: HealthIndex,
    ) -> Result<(), CatalogError> {
        let components = encode(id, &index.components)?;
        let recommendations = encode(id, &index.recommendations)?;
        let computed_ms = to_epoch_ms(index.computed_at)?;
        let connection = self.lock()?;
        let key = Self::ensure_exists(&connection, id)?;
        connection
            .execute(
                "INSERT INTO health_indices \
                 (location_id, computed_at_ms, overall, components, recommendations) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key, computed_ms, index.overall, components, recommendations],
            )
            .map_err(SqliteCatalogError::from)?;
        Ok(())
    }

    fn health_history(
        &self,
        id: LocationId,
        since: SystemTime,
    ) -> Result<Vec<HealthIndex>, CatalogError> {
        let since_ms = to_epoch_ms(since)?;
        let connection = self.lock()?;
        let key = Self::ensure_exists(&connection, id)?;
        let mut statement = connection
            .prepare(
                "SELECT computed_at_ms, overall, components, recommendations \
                 FROM health_indices WHERE location_id = ?1 AND computed_at_ms >= ?2 \
                 ORDER BY computed_at_ms ASC, rowid ASC",
            )
            .map_err(SqliteCatalogError::from)?;
        let rows = statement
            .query_map(params![key, since_ms], StoredIndex::from_row)
            .map_err(SqliteCatalogError::from)?;
        let stored = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(SqliteCatalogError::from)?;
        stored.into_iter().map(|row| row.decode(id)).collect()
    }

    fn prune_before(&self, cutoff: SystemTime) -> Result<PruneSummary, CatalogError> {
        let cutoff_ms = to_epoch_ms(cutoff)?;
        let connection = self.lock()?;
        let observations = connection
            .execute(
                "DELETE FROM observations WHERE observed_at_ms < ?1",
                [cutoff_ms],
            )
            .map_err(SqliteCatalogError::from)?;
        let health_indices = connection
            .execute(
                "DELETE FROM health_indices WHERE computed_at_ms < ?1",
                [cutoff_ms],
            )
            .map_err(SqliteCatalogError::from)?;
        Ok(PruneSummary {
            observations,
            health_indices,
        })
    }
}

struct StoredIndex {
    computed_ms: i64,
    overall: f64,
    components: String,
    recommendations: String,
}

impl StoredIndex {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            computed_ms: row.get(0)?,
            overall: row.get(1)?,
            components: row.get(2)?,
            recommendations: row.get(3)?,
        })
    }

    fn decode(self, id: LocationId) -> Result<HealthIndex, CatalogError> {
        let components: ComponentScores = decode(id, &self.components)?;
        let recommendations: Vec<String> = decode(id, &self.recommendations)?;
        Ok(HealthIndex {
            components,
            overall: self.overall,
            recommendations,
            computed_at: from_epoch_ms(self.computed_ms)?,
        })
    }
}

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    let id: u64 = row.get(0)?;
    let name: String = row.get(1)?;
    let latitude: f64 = row.get(2)?;
    let longitude: f64 = row.get(3)?;
    let attributes = GeoAttributes {
        altitude_m: row.get(4)?,
        water_proximity_m: row.get(5)?,
        urban_density: row.get(6)?,
        greenness: row.get(7)?,
    };
    Ok(Location::new(
        LocationId(id),
        name,
        Coord {
            x: longitude,
            y: latitude,
        },
    )
    .with_attributes(attributes))
}

fn sql_id(id: LocationId) -> Result<i64, SqliteCatalogError> {
    i64::try_from(id.0).map_err(|_| SqliteCatalogError::IdOutOfRange { id })
}

fn to_epoch_ms(time: SystemTime) -> Result<i64, SqliteCatalogError> {
    let since_epoch = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|_| SqliteCatalogError::TimestampOutOfRange)?;
    i64::try_from(since_epoch.as_millis()).map_err(|_| SqliteCatalogError::TimestampOutOfRange)
}

fn from_epoch_ms(millis: i64) -> Result<SystemTime, SqliteCatalogError> {
    let millis = u64::try_from(millis).map_err(|_| SqliteCatalogError::TimestampOutOfRange)?;
    SystemTime::UNIX_EPOCH
        .checked_add(Duration::from_millis(millis))
        .ok_or(SqliteCatalogError::TimestampOutOfRange)
}

fn encode<T: serde::Serialize + ?Sized>(
    id: LocationId,
    value: &T,
) -> Result<String, SqliteCatalogError> {
    serde_json::to_string(value).map_err(|source| SqliteCatalogError::Payload { id, source })
}

fn decode<T: serde::de::DeserializeOwned>(
    id: LocationId,
    payload: &str,
) -> Result<T, SqliteCatalogError> {
    serde_json::from_str(payload).map_err(|source| SqliteCatalogError::Payload { id, source })
}
