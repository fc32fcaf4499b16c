//! Application Layer
//!
//! Use cases that orchestrate the domain ports.

mod location_service;

pub use location_service::LocationService;
