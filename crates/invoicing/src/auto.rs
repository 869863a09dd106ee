//! One-shot delayed export, cancelled when its owner goes away.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use excursio_booking::BookingRecord;

use crate::export::{ExportError, ExportedInvoice, InvoiceExporter};
use crate::raster::Rasterizer;
use crate::sink::DocumentSink;

#[derive(Debug)]
pub enum AutoExportOutcome {
    Exported(ExportedInvoice),
    Cancelled,
    Failed(ExportError),
}

/// A pending automatic export.
///
/// Fires once after the delay unless [`cancel`](Self::cancel) is called or the
/// handle is dropped first. Dropping never aborts an export that has already
/// started writing.
#[derive(Debug)]
pub struct ScheduledExport {
    token: CancellationToken,
    handle: Option<JoinHandle<AutoExportOutcome>>,
}

impl ScheduledExport {
    pub fn schedule<R, S>(
        exporter: Arc<InvoiceExporter<R, S>>,
        record: BookingRecord,
        delay: Duration,
    ) -> Self
    where
        R: Rasterizer + 'static,
        S: DocumentSink + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        let booking_id = record.booking_id;
        debug!(%booking_id, delay_ms = delay.as_millis() as u64, "auto-export scheduled");

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {
                    info!(%booking_id, "auto-export cancelled before it fired");
                    return AutoExportOutcome::Cancelled;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            match exporter.export(&record).await {
                Ok(exported) => AutoExportOutcome::Exported(exported),
                Err(err) => AutoExportOutcome::Failed(err),
            }
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the export to fire or be cancelled.
    pub async fn wait(mut self) -> AutoExportOutcome {
        let Some(handle) = self.handle.take() else {
            return AutoExportOutcome::Cancelled;
        };
        match handle.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => AutoExportOutcome::Cancelled,
            Err(err) => AutoExportOutcome::Failed(ExportError::Task(err.to_string())),
        }
    }
}

impl Drop for ScheduledExport {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
