mod geo_provider;
mod location_repository;
mod public_ip_resolver;

pub use geo_provider::GeoProvider;
pub use location_repository::LocationRepository;
pub use public_ip_resolver::PublicIpResolver;
