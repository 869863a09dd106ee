//! Wiring of catalog, store and exporter behind the client screens.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use excursio_booking::{BookingStore, BookingWizard, StoreError, WizardError};
use excursio_catalog::{Catalog, CatalogError, InMemoryCatalog};
use excursio_core::{BookingId, ServiceId};
use excursio_invoicing::{BitmapRasterizer, DirectorySink, InvoiceExporter};

use crate::config::ClientConfig;
use crate::confirmation::ConfirmationPage;
use crate::file_store::JsonFileBookingStore;
use crate::http_catalog::HttpCatalog;
use crate::routes::{Navigation, Route};

pub type ClientExporter = InvoiceExporter<BitmapRasterizer, DirectorySink>;
pub type ClientConfirmationPage = ConfirmationPage<BitmapRasterizer, DirectorySink>;

pub struct BookingApp {
    config: ClientConfig,
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn BookingStore>,
    exporter: Arc<ClientExporter>,
}

impl BookingApp {
    /// Build the app from configuration: fixture or HTTP catalog, JSON file
    /// store, invoices written to the download directory.
    pub fn from_config(config: ClientConfig) -> anyhow::Result<Self> {
        let catalog: Arc<dyn Catalog> = match &config.catalog_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading catalog file {}", path.display()))?;
                let catalog = InMemoryCatalog::from_json(&json)
                    .with_context(|| format!("parsing catalog file {}", path.display()))?;
                Arc::new(catalog)
            }
            None => Arc::new(HttpCatalog::new(config.api_url.clone())),
        };
        let store = JsonFileBookingStore::open(&config.store_path)
            .with_context(|| format!("opening booking store {}", config.store_path.display()))?;

        Self::with_parts(config, catalog, Arc::new(store))
    }

    pub fn with_parts(
        config: ClientConfig,
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn BookingStore>,
    ) -> anyhow::Result<Self> {
        let rasterizer = BitmapRasterizer::new(config.raster_dpi).context("raster resolution")?;
        let exporter = InvoiceExporter::new(rasterizer, DirectorySink::new(&config.download_dir));
        Ok(Self {
            config,
            catalog,
            store,
            exporter: Arc::new(exporter),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn BookingStore {
        self.store.as_ref()
    }

    pub fn exporter(&self) -> &Arc<ClientExporter> {
        &self.exporter
    }

    /// Open the booking wizard for a service. Unknown services send the user
    /// back to the catalog.
    pub async fn start_booking(
        &self,
        service_id: &ServiceId,
    ) -> Result<Navigation<BookingWizard>, WizardError> {
        match BookingWizard::start(self.catalog.as_ref(), service_id).await {
            Ok(wizard) => Ok(Navigation::Render(wizard)),
            Err(WizardError::Catalog(CatalogError::NotFound(id))) => {
                warn!(service_id = %id, "unknown service, redirecting to catalog");
                Ok(Navigation::Redirect(Route::Catalog))
            }
            Err(err) => Err(err),
        }
    }

    /// Submit a confirmed wizard and return where to go next.
    pub fn submit(&self, wizard: &mut BookingWizard) -> Result<Route, WizardError> {
        let record = wizard.submit(self.store.as_ref())?;
        let route = Route::Confirmation {
            booking_id: record.booking_id,
        };
        info!(booking_id = %record.booking_id, route = %route, "navigating to confirmation");
        Ok(route)
    }

    /// Open the confirmation page; schedules the automatic invoice export.
    pub fn open_confirmation(
        &self,
        booking_id: BookingId,
    ) -> Result<Navigation<ClientConfirmationPage>, StoreError> {
        ConfirmationPage::open(
            self.store.as_ref(),
            Arc::clone(&self.exporter),
            booking_id,
            self.config.auto_export_delay,
        )
    }
}
