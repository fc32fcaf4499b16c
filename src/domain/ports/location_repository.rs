//! Location Repository Port
//!
//! Defines the interface for persisting cached IP locations.
//! Implementations may use SQLite or in-memory storage.

use crate::domain::entities::IpLocation;
use crate::domain::errors::StoreError;
use async_trait::async_trait;

/// Repository for cached IP locations, keyed by IP.
///
/// This is an outbound port: the location service reads and writes
/// through it without knowing the storage details. `get` must report
/// a missing key as [`StoreError::NotFound`] so callers can tell a
/// cache miss apart from a storage failure.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Get the stored location for an IP.
    async fn get(&self, ip: &str) -> Result<IpLocation, StoreError>;

    /// Insert a new location. Fails with [`StoreError::AlreadyExists`]
    /// if the IP is already stored.
    async fn put(&self, location: &IpLocation) -> Result<(), StoreError>;

    /// Overwrite country and city for an IP. A missing IP is a no-op.
    async fn update(&self, location: &IpLocation) -> Result<(), StoreError>;

    /// Remove the location for an IP. A missing IP is a no-op.
    async fn delete(&self, ip: &str) -> Result<(), StoreError>;

    /// Get every stored location, sorted by IP.
    async fn get_all(&self) -> Result<Vec<IpLocation>, StoreError>;
}
