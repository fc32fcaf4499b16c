//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the locfinder domain.
//! They have no external dependencies and contain only business logic.

use serde::{Deserialize, Serialize};

/// Geographic location cached for a single IP address.
///
/// The IP is the natural key: a store holds at most one location per IP.
/// Country and city may be empty when the provider could not resolve them;
/// an empty location is still a valid cached record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLocation {
    /// Textual IPv4 or IPv6 address
    pub ip: String,
    /// Country name as reported by the provider
    #[serde(default)]
    pub country: String,
    /// City name as reported by the provider
    #[serde(default)]
    pub city: String,
}

impl IpLocation {
    pub fn new(
        ip: impl Into<String>,
        country: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            ip: ip.into(),
            country: country.into(),
            city: city.into(),
        }
    }

    /// True when neither country nor city is known.
    pub fn is_unresolved(&self) -> bool {
        self.country.is_empty() && self.city.is_empty()
    }
}
