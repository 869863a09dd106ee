//! In-memory catalog for tests, demos and fixture files.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use excursio_core::{Entity, ServiceId};

use crate::service::{Catalog, CatalogError, ServiceDescriptor};

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    services: RwLock<BTreeMap<ServiceId, ServiceDescriptor>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_services(services: impl IntoIterator<Item = ServiceDescriptor>) -> Self {
        let catalog = Self::new();
        for service in services {
            catalog.insert(service);
        }
        catalog
    }

    /// Load a JSON array of service descriptors.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let services: Vec<ServiceDescriptor> =
            serde_json::from_str(json).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        debug!(count = services.len(), "loaded catalog fixture");
        Ok(Self::with_services(services))
    }

    /// Insert or replace a service.
    pub fn insert(&self, service: ServiceDescriptor) {
        let mut services = self
            .services
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        services.insert(service.id().clone(), service);
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn fetch(&self, id: &ServiceId) -> Result<ServiceDescriptor, CatalogError> {
        let services = self
            .services
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        services
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}
