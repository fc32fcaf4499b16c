//! DashMap Location Repository
//!
//! Implements LocationRepository using DashMap for concurrent in-process access.
//! Contents are lost when the process exits.

use crate::domain::entities::IpLocation;
use crate::domain::errors::StoreError;
use crate::domain::ports::LocationRepository;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// DashMap-backed location repository.
pub struct DashMapLocationRepository {
    locations: Arc<DashMap<String, IpLocation>>,
}

impl DashMapLocationRepository {
    /// Create a new, empty repository.
    pub fn new() -> Self {
        Self {
            locations: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for DashMapLocationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationRepository for DashMapLocationRepository {
    async fn get(&self, ip: &str) -> Result<IpLocation, StoreError> {
        self.locations
            .get(ip)
            .map(|e| e.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn put(&self, location: &IpLocation) -> Result<(), StoreError> {
        match self.locations.entry(location.ip.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(location.ip.clone())),
            Entry::Vacant(slot) => {
                slot.insert(location.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, location: &IpLocation) -> Result<(), StoreError> {
        if let Some(mut entry) = self.locations.get_mut(&location.ip) {
            entry.country = location.country.clone();
            entry.city = location.city.clone();
        }
        Ok(())
    }

    async fn delete(&self, ip: &str) -> Result<(), StoreError> {
        self.locations.remove(ip);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<IpLocation>, StoreError> {
        let mut all: Vec<IpLocation> = self
            .locations
            .iter()
            .map(|e| e.value().clone())
            .collect();
        all.sort_by(|a, b| a.ip.cmp(&b.ip));
        Ok(all)
    }
}
