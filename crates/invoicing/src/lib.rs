//! Invoice rendering and export.
//!
//! A confirmed booking is laid out as an [`InvoiceView`], rasterized into a
//! single tall image, sliced across A4 pages and written out as a PDF:
//!
//! 1. **Layout** – booking record → text lines ([`view`])
//! 2. **Rasterize** – lines → RGB snapshot at a fixed DPI ([`raster`])
//! 3. **Paginate** – snapshot height → page count and offsets ([`layout`])
//! 4. **Assemble** – one shared image, one page per slice ([`pdf`])
//! 5. **Save** – atomic write through a [`DocumentSink`] ([`sink`])
//!
//! [`InvoiceExporter`] runs the pipeline with a per-booking lock, and
//! [`ScheduledExport`] runs it once after a delay unless cancelled first.

pub mod auto;
pub mod export;
#[cfg(test)]
mod fixtures;
pub mod layout;
pub mod pdf;
pub mod raster;
pub mod sink;
pub mod view;

pub use auto::{AutoExportOutcome, ScheduledExport};
pub use export::{
    ExportError, ExportLock, ExportPermit, ExportedInvoice, InvoiceDocument, InvoiceExporter,
    invoice_filename, render_document,
};
pub use layout::{PageGeometry, PagePlacement, Pagination, page_count};
pub use raster::{BitmapRasterizer, RasterError, Rasterizer, Snapshot};
pub use sink::{DirectorySink, DocumentSink, MemorySink};
pub use view::{InvoiceView, LineStyle, ViewLine};
