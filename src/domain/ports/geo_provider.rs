//! Geolocation Provider Port
//!
//! Defines the interface for resolving IP addresses through an external service.

use crate::domain::entities::IpLocation;
use crate::domain::errors::ProviderError;
use async_trait::async_trait;

/// External source of IP geolocation.
///
/// Consulted by the location service only on a cache miss.
/// Implementations make a single attempt and never retry.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Resolve an IP address to a location.
    ///
    /// The returned location's `ip` is the requested address.
    async fn fetch(&self, ip: &str) -> Result<IpLocation, ProviderError>;

    /// Provider name (for logs).
    fn name(&self) -> &'static str;
}
