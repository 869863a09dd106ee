//! Client side of the booking flow: configuration, storage, catalog access,
//! navigation and the confirmation screen.

pub mod app;
pub mod config;
pub mod confirmation;
pub mod file_store;
pub mod http_catalog;
pub mod routes;
#[cfg(test)]
mod test_support;

pub use app::{BookingApp, ClientConfirmationPage, ClientExporter};
pub use config::{ClientConfig, ConfigError};
pub use confirmation::ConfirmationPage;
pub use file_store::JsonFileBookingStore;
pub use http_catalog::HttpCatalog;
pub use routes::{Navigation, Route};
