//! Domain Errors
//!
//! Error taxonomy shared by the ports and the application layer.

/// Failures reported by a location store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record exists for the requested IP.
    #[error("location not found")]
    NotFound,
    /// A record for this IP is already stored.
    #[error("location for {0} already exists")]
    AlreadyExists(String),
    /// Underlying storage failure (I/O, SQL, task join).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failures reported by an external HTTP provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Network failure or non-2xx response.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// Response body could not be decoded.
    #[error("malformed provider response: {0}")]
    Malformed(String),
    /// Provider answered but refused to resolve the query.
    #[error("provider rejected query: {0}")]
    Rejected(String),
}

/// Failures surfaced by the location service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("ip address must not be empty")]
    EmptyIp,
    /// Input is not a textual IPv4 or IPv6 address.
    #[error("invalid ip address: {0}")]
    InvalidIp(String),
    /// Store failure on a read or an explicit write.
    #[error(transparent)]
    Storage(StoreError),
    /// Store failure while caching a freshly fetched location.
    #[error("failed to persist location: {0}")]
    Persistence(StoreError),
    #[error(transparent)]
    Upstream(#[from] ProviderError),
}

impl LocationError {
    /// Whether the caller sent invalid input (as opposed to an internal failure).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyIp | Self::InvalidIp(_))
    }
}

impl From<StoreError> for LocationError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert_eq!(StoreError::NotFound.to_string(), "location not found");
        assert_eq!(
            StoreError::AlreadyExists("1.2.3.4".to_string()).to_string(),
            "location for 1.2.3.4 already exists"
        );
    }

    #[test]
    fn test_location_error_transparent_storage() {
        let err: LocationError = StoreError::Backend("disk full".to_string()).into();
        assert_eq!(err.to_string(), "storage backend error: disk full");
    }

    #[test]
    fn test_location_error_from_provider() {
        let err: LocationError = ProviderError::Unavailable("503".to_string()).into();
        assert!(matches!(err, LocationError::Upstream(_)));
        assert_eq!(err.to_string(), "provider unavailable: 503");
    }

    #[test]
    fn test_persistence_error_message() {
        let err = LocationError::Persistence(StoreError::Backend("locked".to_string()));
        assert_eq!(
            err.to_string(),
            "failed to persist location: storage backend error: locked"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(LocationError::EmptyIp.is_validation());
        assert!(LocationError::InvalidIp("example.com".to_string()).is_validation());
        assert!(!LocationError::Storage(StoreError::NotFound).is_validation());
    }
}
