//! locfinder Library
//!
//! IP geolocation service with a cache-aside lookup: locations are read
//! from a local store and fetched from an external provider on a miss.
//! Exposed as a library for integration tests.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::LocationService;
pub use config::load_config;
pub use domain::entities::IpLocation;
pub use domain::errors::{LocationError, ProviderError, StoreError};
pub use domain::ports::{GeoProvider, LocationRepository, PublicIpResolver};
