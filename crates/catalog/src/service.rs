//! Bookable services and the catalog they are fetched from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use excursio_core::{Entity, Money, ServiceId};

/// Read-only description of an activity offered by an agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    pub id: ServiceId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price per person.
    pub unit_price: Money,
    pub agency_name: String,
    #[serde(default)]
    pub location: String,
}

impl Entity for ServiceDescriptor {
    type Id = ServiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("service not found: {0}")]
    NotFound(ServiceId),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("malformed catalog data: {0}")]
    Malformed(String),
}

/// Fetch-by-id access to the service catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up one service.
    async fn fetch(&self, id: &ServiceId) -> Result<ServiceDescriptor, CatalogError>;
}
