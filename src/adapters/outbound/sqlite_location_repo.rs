//! SQLite Location Repository
//!
//! Implements LocationRepository using SQLite for storage.
//! All queries run on the blocking thread pool.

use crate::domain::entities::IpLocation;
use crate::domain::errors::StoreError;
use crate::domain::ports::LocationRepository;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS locations (
    ip_address TEXT PRIMARY KEY,
    country    TEXT NOT NULL DEFAULT '',
    city       TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

/// SQLite-backed location repository.
///
/// Holds a single connection behind a mutex. The `locations` table is
/// created on open if it does not exist.
pub struct SqliteLocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLocationRepository {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || f(&*conn.lock()))
            .await
            .map_err(|e| StoreError::Backend(format!("spawn_blocking error: {e}")))?
    }

    /// Convert a SQLite row to an IpLocation entity.
    fn row_to_location(row: &Row) -> rusqlite::Result<IpLocation> {
        Ok(IpLocation {
            ip: row.get(0)?,
            country: row.get(1)?,
            city: row.get(2)?,
        })
    }
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl LocationRepository for SqliteLocationRepository {
    async fn get(&self, ip: &str) -> Result<IpLocation, StoreError> {
        let ip = ip.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT ip_address, country, city FROM locations WHERE ip_address = ?1",
                params![ip],
                Self::row_to_location,
            )
            .optional()
            .map_err(backend)?
            .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn put(&self, location: &IpLocation) -> Result<(), StoreError> {
        let location = location.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO locations (ip_address, country, city) VALUES (?1, ?2, ?3)",
                params![location.ip, location.country, location.city],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::AlreadyExists(location.ip.clone())
                } else {
                    backend(e)
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, location: &IpLocation) -> Result<(), StoreError> {
        let location = location.clone();
        self.with_conn(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE locations SET country = ?2, city = ?3 WHERE ip_address = ?1",
                    params![location.ip, location.country, location.city],
                )
                .map_err(backend)?;
            if changed == 0 {
                tracing::debug!("update for unknown ip {} changed nothing", location.ip);
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, ip: &str) -> Result<(), StoreError> {
        let ip = ip.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM locations WHERE ip_address = ?1", params![ip])
                .map_err(backend)?;
            Ok(())
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<IpLocation>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT ip_address, country, city FROM locations ORDER BY ip_address")
                .map_err(backend)?;

            let locations = stmt
                .query_map([], Self::row_to_location)
                .map_err(backend)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(backend)?;

            Ok(locations)
        })
        .await
    }
}
