//! Catalog of bookable services.
//!
//! The wizard never embeds offering data; it asks a [`Catalog`] for the
//! descriptor of the service being booked.

pub mod memory;
pub mod service;

pub use memory::InMemoryCatalog;
pub use service::{Catalog, CatalogError, ServiceDescriptor};
