//! Destinations for rendered invoices.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::export::{ExportError, InvoiceDocument};

/// Where a rendered invoice ends up.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Save the document and return its location.
    async fn save(&self, document: &InvoiceDocument) -> Result<PathBuf, ExportError>;
}

/// Writes invoices into a download directory.
///
/// The file is written to a temporary name in the same directory and renamed
/// into place, so a failed write never leaves a partial invoice behind and a
/// re-export replaces the previous file whole.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let write_err = |reason: String| ExportError::Write {
        path: target.to_path_buf(),
        reason,
    };

    std::fs::create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
    tmp.write_all(bytes).map_err(|e| write_err(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| write_err(e.to_string()))?;
    tmp.persist(target).map_err(|e| write_err(e.error.to_string()))?;
    Ok(())
}

#[async_trait]
impl DocumentSink for DirectorySink {
    async fn save(&self, document: &InvoiceDocument) -> Result<PathBuf, ExportError> {
        let dir = self.dir.clone();
        let target = dir.join(&document.filename);
        let bytes = document.bytes.clone();

        let path = target.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &bytes))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))??;

        debug!(path = %target.display(), bytes = document.bytes.len(), "wrote invoice file");
        Ok(target)
    }
}

/// Keeps saved documents in memory, keyed by file name.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    saves: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filename: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(filename)
            .cloned()
    }

    /// Number of successful saves so far, including overwrites.
    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn save(&self, document: &InvoiceDocument) -> Result<PathBuf, ExportError> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(document.filename.clone(), document.bytes.clone());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(PathBuf::from(&document.filename))
    }
}

#[async_trait]
impl<S: DocumentSink + ?Sized> DocumentSink for std::sync::Arc<S> {
    async fn save(&self, document: &InvoiceDocument) -> Result<PathBuf, ExportError> {
        (**self).save(document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use excursio_core::BookingId;

    fn document(bytes: &[u8]) -> InvoiceDocument {
        let booking_id = BookingId::new();
        InvoiceDocument {
            booking_id,
            filename: crate::export::invoice_filename(booking_id),
            page_count: 1,
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn directory_sink_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let doc = document(b"%PDF-1.5 test");

        let path = sink.save(&doc).await.unwrap();
        assert_eq!(path, dir.path().join(&doc.filename));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 test");
    }

    #[tokio::test]
    async fn directory_sink_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let mut doc = document(b"first");
        sink.save(&doc).await.unwrap();
        doc.bytes = b"second".to_vec();
        let path = sink.save(&doc).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn directory_sink_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("downloads").join("invoices");
        let sink = DirectorySink::new(&nested);
        let path = sink.save(&document(b"x")).await.unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn unwritable_target_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let sink = DirectorySink::new(&blocker);
        let err = sink.save(&document(b"x")).await.unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }

    #[tokio::test]
    async fn memory_sink_counts_saves() {
        let sink = MemorySink::new();
        let doc = document(b"abc");
        sink.save(&doc).await.unwrap();
        sink.save(&doc).await.unwrap();
        assert_eq!(sink.saves(), 2);
        assert_eq!(sink.get(&doc.filename).unwrap(), b"abc");
        assert!(sink.get("missing.pdf").is_none());
    }
}
