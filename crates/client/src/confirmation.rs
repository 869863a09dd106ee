//! Booking confirmation screen: shows the invoice and exports it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use excursio_booking::{BookingRecord, BookingStore, StoreError};
use excursio_core::BookingId;
use excursio_invoicing::{
    AutoExportOutcome, DocumentSink, ExportError, ExportedInvoice, InvoiceExporter, InvoiceView,
    Rasterizer, ScheduledExport,
};

use crate::routes::{Navigation, Route};

/// An open confirmation page for one booking.
///
/// Opening the page schedules a single automatic export. Closing or dropping
/// the page before the delay elapses cancels it.
pub struct ConfirmationPage<R, S> {
    record: BookingRecord,
    view: InvoiceView,
    exporter: Arc<InvoiceExporter<R, S>>,
    auto_export: Option<ScheduledExport>,
}

impl<R, S> ConfirmationPage<R, S>
where
    R: Rasterizer + 'static,
    S: DocumentSink + 'static,
{
    /// Load the booking and render the page, or redirect to the catalog when
    /// the booking is unknown. Must be called within a tokio runtime.
    pub fn open<St>(
        store: &St,
        exporter: Arc<InvoiceExporter<R, S>>,
        booking_id: BookingId,
        auto_export_delay: Duration,
    ) -> Result<Navigation<Self>, StoreError>
    where
        St: BookingStore + ?Sized,
    {
        let Some(record) = store.get(booking_id)? else {
            warn!(%booking_id, "no such booking, redirecting to catalog");
            return Ok(Navigation::Redirect(Route::Catalog));
        };

        let view = InvoiceView::from_record(&record);
        let auto_export = ScheduledExport::schedule(
            Arc::clone(&exporter),
            record.clone(),
            auto_export_delay,
        );
        info!(%booking_id, "confirmation page opened");

        Ok(Navigation::Render(Self {
            record,
            view,
            exporter,
            auto_export: Some(auto_export),
        }))
    }

    pub fn booking_id(&self) -> BookingId {
        self.record.booking_id
    }

    pub fn record(&self) -> &BookingRecord {
        &self.record
    }

    pub fn view(&self) -> &InvoiceView {
        &self.view
    }

    /// Whether the automatic export is still waiting on this page.
    pub fn auto_export_pending(&self) -> bool {
        self.auto_export.is_some()
    }

    /// Export on demand. Can be repeated; each run produces the same document.
    pub async fn export_now(&self) -> Result<ExportedInvoice, ExportError> {
        self.exporter.export(&self.record).await
    }

    /// Wait for the automatic export. Returns `None` once it has been waited
    /// on or cancelled.
    pub async fn wait_for_auto_export(&mut self) -> Option<AutoExportOutcome> {
        let scheduled = self.auto_export.take()?;
        Some(scheduled.wait().await)
    }

    /// Leave the page, cancelling a pending automatic export.
    pub fn close(mut self) {
        if let Some(scheduled) = self.auto_export.take() {
            scheduled.cancel();
        }
    }
}
