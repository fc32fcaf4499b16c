mod dashmap_location_repo;
mod ip_api_geo_provider;
mod ipify_public_ip_resolver;
mod sqlite_location_repo;

pub use dashmap_location_repo::DashMapLocationRepository;
pub use ip_api_geo_provider::{IpApiGeoProvider, DEFAULT_IP_API_URL};
pub use ipify_public_ip_resolver::{IpifyPublicIpResolver, DEFAULT_PUBLIC_IP_URL};
pub use sqlite_location_repo::SqliteLocationRepository;
