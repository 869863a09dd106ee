//! Invoice export: render, lock, save.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use excursio_booking::BookingRecord;
use excursio_core::BookingId;

use crate::layout::{PageGeometry, Pagination};
use crate::pdf;
use crate::raster::{RasterError, Rasterizer};
use crate::sink::DocumentSink;
use crate::view::InvoiceView;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to rasterize invoice: {0}")]
    Raster(#[from] RasterError),
    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),
    #[error("failed to assemble document: {0}")]
    Assembly(String),
    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
    #[error("an export of booking {0} is already running")]
    InProgress(BookingId),
    #[error("export task failed: {0}")]
    Task(String),
}

/// File name for a booking's invoice.
pub fn invoice_filename(booking_id: BookingId) -> String {
    format!("invoice-{booking_id}.pdf")
}

/// A rendered invoice, not yet saved anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    pub booking_id: BookingId,
    pub filename: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedInvoice {
    pub booking_id: BookingId,
    pub filename: String,
    pub page_count: usize,
    pub location: PathBuf,
}

/// Tracks which bookings have an export in flight.
#[derive(Debug, Clone, Default)]
pub struct ExportLock {
    active: Arc<Mutex<HashSet<BookingId>>>,
}

impl ExportLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the booking, or fail if another export of it is running.
    pub fn try_acquire(&self, booking_id: BookingId) -> Result<ExportPermit, ExportError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(booking_id) {
            return Err(ExportError::InProgress(booking_id));
        }
        Ok(ExportPermit {
            active: Arc::clone(&self.active),
            booking_id,
        })
    }

    pub fn is_active(&self, booking_id: BookingId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&booking_id)
    }
}

/// Held for the duration of one export; releases the booking on drop.
#[derive(Debug)]
pub struct ExportPermit {
    active: Arc<Mutex<HashSet<BookingId>>>,
    booking_id: BookingId,
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.booking_id);
    }
}

/// Render a booking into a PDF document without saving it.
pub fn render_document<R>(
    rasterizer: &R,
    record: &BookingRecord,
    geometry: PageGeometry,
) -> Result<InvoiceDocument, ExportError>
where
    R: Rasterizer + ?Sized,
{
    let view = InvoiceView::from_record(record);
    let snapshot = rasterizer.rasterize(&view)?;
    let pagination = Pagination::plan(geometry, snapshot.width_px(), snapshot.height_px())?;
    debug!(
        booking_id = %record.booking_id,
        image_height_mm = pagination.image_height_mm,
        pages = pagination.page_count(),
        "paginated invoice snapshot"
    );

    let filename = invoice_filename(record.booking_id);
    let bytes = pdf::assemble(&snapshot, &pagination, &filename)?;
    Ok(InvoiceDocument {
        booking_id: record.booking_id,
        filename,
        page_count: pagination.page_count(),
        bytes,
    })
}

/// Renders invoices and hands them to a sink, one export per booking at a time.
pub struct InvoiceExporter<R, S> {
    rasterizer: Arc<R>,
    sink: S,
    geometry: PageGeometry,
    lock: ExportLock,
}

impl<R, S> InvoiceExporter<R, S>
where
    R: Rasterizer + 'static,
    S: DocumentSink,
{
    pub fn new(rasterizer: R, sink: S) -> Self {
        Self {
            rasterizer: Arc::new(rasterizer),
            sink,
            geometry: PageGeometry::A4,
            lock: ExportLock::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn lock(&self) -> &ExportLock {
        &self.lock
    }

    /// Render without saving (preview, tests).
    pub fn render(&self, record: &BookingRecord) -> Result<InvoiceDocument, ExportError> {
        render_document(self.rasterizer.as_ref(), record, self.geometry)
    }

    /// Render the invoice and save it.
    ///
    /// Rejected with [`ExportError::InProgress`] while another export of the
    /// same booking runs. Nothing is saved unless rendering succeeds.
    pub async fn export(&self, record: &BookingRecord) -> Result<ExportedInvoice, ExportError> {
        let booking_id = record.booking_id;
        let _permit = match self.lock.try_acquire(booking_id) {
            Ok(permit) => permit,
            Err(err) => {
                warn!(%booking_id, "invoice export already in progress, trigger ignored");
                return Err(err);
            }
        };

        let rasterizer = Arc::clone(&self.rasterizer);
        let owned = record.clone();
        let geometry = self.geometry;
        let rendered = tokio::task::spawn_blocking(move || {
            render_document(rasterizer.as_ref(), &owned, geometry)
        })
        .await
        .map_err(|e| ExportError::Task(e.to_string()))
        .and_then(|result| result);

        let document = match rendered {
            Ok(document) => document,
            Err(err) => {
                error!(%booking_id, error = %err, "invoice export failed");
                return Err(err);
            }
        };

        let location = match self.sink.save(&document).await {
            Ok(location) => location,
            Err(err) => {
                error!(%booking_id, error = %err, "failed to save invoice");
                return Err(err);
            }
        };

        info!(
            %booking_id,
            pages = document.page_count,
            location = %location.display(),
            "invoice exported"
        );
        Ok(ExportedInvoice {
            booking_id,
            filename: document.filename,
            page_count: document.page_count,
            location,
        })
    }
}
