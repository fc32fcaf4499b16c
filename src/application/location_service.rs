//! Location Service - Main application use case
//!
//! Resolves IP addresses to locations with a cache-aside lookup:
//! the store is consulted first and the external provider only on a miss,
//! with the fetched location written back to the store.

use crate::domain::entities::IpLocation;
use crate::domain::errors::{LocationError, StoreError};
use crate::domain::ports::{GeoProvider, LocationRepository, PublicIpResolver};
use std::net::IpAddr;
use std::sync::Arc;

/// Location service - main application use case.
///
/// Every call is a single-shot operation: no retries, no in-process
/// caching and no locking beyond what the repository provides.
pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
    provider: Arc<dyn GeoProvider>,
    public_ip: Arc<dyn PublicIpResolver>,
}

impl LocationService {
    /// Create a new location service.
    pub fn new(
        repo: Arc<dyn LocationRepository>,
        provider: Arc<dyn GeoProvider>,
        public_ip: Arc<dyn PublicIpResolver>,
    ) -> Self {
        Self {
            repo,
            provider,
            public_ip,
        }
    }

    /// Resolve the location of an IP address.
    ///
    /// 1. Returns the stored location if one exists, even when its
    ///    country and city are empty
    /// 2. On [`StoreError::NotFound`], fetches from the provider
    /// 3. Persists the fetched location, then returns it
    ///
    /// Any other store error on the read is returned as-is. If the write
    /// fails the fetched location is discarded and
    /// [`LocationError::Persistence`] is returned.
    pub async fn resolve(&self, ip: &str) -> Result<IpLocation, LocationError> {
        let ip = normalize_ip(ip)?;
        tracing::debug!("looking up location for {}", ip);

        match self.repo.get(ip).await {
            Ok(location) => {
                tracing::debug!(
                    "cache hit for {} country={:?} city={:?}",
                    ip,
                    location.country,
                    location.city
                );
                return Ok(location);
            }
            Err(StoreError::NotFound) => {}
            Err(e) => {
                tracing::error!("store lookup failed for {}: {}", ip, e);
                return Err(LocationError::Storage(e));
            }
        }

        tracing::debug!("cache miss for {}, querying {}", ip, self.provider.name());
        let location = self.provider.fetch(ip).await.map_err(|e| {
            tracing::error!("{} lookup failed for {}: {}", self.provider.name(), ip, e);
            LocationError::Upstream(e)
        })?;

        if location.is_unresolved() {
            tracing::warn!("{} has no country or city for {}", self.provider.name(), ip);
        }

        if let Err(e) = self.repo.put(&location).await {
            tracing::error!("failed to cache location for {}: {}", ip, e);
            return Err(LocationError::Persistence(e));
        }

        tracing::debug!(
            "cached location for {} country={:?} city={:?}",
            ip,
            location.country,
            location.city
        );
        Ok(location)
    }

    /// Resolve the location of this process's public IP.
    pub async fn resolve_self(&self) -> Result<IpLocation, LocationError> {
        let ip = self.external_self_ip().await?;
        self.resolve(&ip).await
    }

    /// Store a location explicitly. Fails if the IP is already stored.
    pub async fn create(
        &self,
        ip: &str,
        country: &str,
        city: &str,
    ) -> Result<IpLocation, LocationError> {
        let location = IpLocation::new(normalize_ip(ip)?, country, city);
        self.repo.put(&location).await.map_err(|e| {
            tracing::error!("failed to create location for {}: {}", location.ip, e);
            LocationError::Storage(e)
        })?;
        tracing::info!("created location for {}", location.ip);
        Ok(location)
    }

    /// Overwrite the stored country and city for an IP.
    pub async fn update(&self, ip: &str, country: &str, city: &str) -> Result<(), LocationError> {
        let location = IpLocation::new(normalize_ip(ip)?, country, city);
        self.repo.update(&location).await.map_err(|e| {
            tracing::error!("failed to update location for {}: {}", location.ip, e);
            LocationError::Storage(e)
        })?;
        tracing::info!("updated location for {}", location.ip);
        Ok(())
    }

    /// Remove the stored location for an IP. Deleting an unknown IP succeeds.
    pub async fn delete(&self, ip: &str) -> Result<(), LocationError> {
        let ip = normalize_ip(ip)?;
        self.repo.delete(ip).await.map_err(|e| {
            tracing::error!("failed to delete location for {}: {}", ip, e);
            LocationError::Storage(e)
        })?;
        tracing::info!("deleted location for {}", ip);
        Ok(())
    }

    /// Get every stored location.
    pub async fn list_all(&self) -> Result<Vec<IpLocation>, LocationError> {
        let locations = self.repo.get_all().await.map_err(|e| {
            tracing::error!("failed to list locations: {}", e);
            LocationError::Storage(e)
        })?;
        tracing::debug!("listed {} locations", locations.len());
        Ok(locations)
    }

    /// Ask the public IP resolver for this process's apparent address.
    pub async fn external_self_ip(&self) -> Result<String, LocationError> {
        let ip = self.public_ip.public_ip().await.map_err(|e| {
            tracing::error!("failed to detect public IP: {}", e);
            LocationError::Upstream(e)
        })?;
        tracing::debug!("public IP detected: {}", ip);
        Ok(ip)
    }
}

/// Trim and validate an IP. Only literal IPv4/IPv6 addresses are accepted,
/// so the value is safe to use both as a store key and as a URL segment.
fn normalize_ip(ip: &str) -> Result<&str, LocationError> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Err(LocationError::EmptyIp);
    }
    if ip.parse::<IpAddr>().is_err() {
        return Err(LocationError::InvalidIp(ip.to_string()));
    }
    Ok(ip)
}
