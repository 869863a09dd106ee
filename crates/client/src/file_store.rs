//! Booking store persisted as a single JSON document.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use excursio_booking::{BookingLedger, BookingRecord, BookingStore, StoreError};
use excursio_core::BookingId;

/// Keeps the whole ledger in memory and rewrites the file on every insert.
///
/// Writes go to a temporary file next to the target and are renamed over it,
/// so readers never see a half-written ledger.
#[derive(Debug)]
pub struct JsonFileBookingStore {
    path: PathBuf,
    ledger: RwLock<BookingLedger>,
}

impl JsonFileBookingStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let ledger = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BookingLedger::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BookingLedger::new(),
            Err(e) => return Err(StoreError::Storage(format!("{}: {e}", path.display()))),
        };
        debug!(path = %path.display(), bookings = ledger.len(), "opened booking store");
        Ok(Self {
            path,
            ledger: RwLock::new(ledger),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, ledger: &BookingLedger) -> Result<(), StoreError> {
        let storage =
            |e: std::io::Error| StoreError::Storage(format!("{}: {e}", self.path.display()));
        let json = serde_json::to_vec_pretty(ledger)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(storage)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(storage)?;
        tmp.write_all(&json).map_err(storage)?;
        tmp.as_file().sync_all().map_err(storage)?;
        tmp.persist(&self.path).map_err(|e| storage(e.error))?;
        Ok(())
    }
}

impl BookingStore for JsonFileBookingStore {
    fn put(&self, record: BookingRecord) -> Result<(), StoreError> {
        let mut ledger = self.ledger.write().unwrap_or_else(PoisonError::into_inner);
        // Update a copy so a failed write leaves memory and disk in agreement.
        let mut next = ledger.clone();
        next.insert(record)?;
        self.persist(&next)?;
        *ledger = next;
        Ok(())
    }

    fn get(&self, id: BookingId) -> Result<Option<BookingRecord>, StoreError> {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        Ok(ledger.get(id).cloned())
    }

    fn latest(&self) -> Result<Option<BookingRecord>, StoreError> {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        Ok(ledger.latest().cloned())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        Ok(ledger.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileBookingStore::open(dir.path().join("bookings.json")).unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.latest().unwrap().is_none());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        let first = record();
        let second = record();
        {
            let store = JsonFileBookingStore::open(&path).unwrap();
            store.put(first.clone()).unwrap();
            store.put(second.clone()).unwrap();
        }

        let store = JsonFileBookingStore::open(&path).unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.get(first.booking_id).unwrap(), Some(first));
        assert_eq!(store.latest().unwrap(), Some(second));
    }

    #[test]
    fn file_uses_camel_case_ledger_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        let store = JsonFileBookingStore::open(&path).unwrap();
        let r = record();
        store.put(r.clone()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["lastBooking"], r.booking_id.to_string());
        let stored = &json["bookings"][r.booking_id.to_string()];
        assert_eq!(stored["totalPrice"], 240);
        assert_eq!(stored["status"], "confirmed");
    }

    #[test]
    fn duplicate_id_is_rejected_and_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        let store = JsonFileBookingStore::open(&path).unwrap();
        let r = record();
        store.put(r.clone()).unwrap();
        let before = std::fs::read(&path).unwrap();

        let mut again = r.clone();
        again.customer_name = "Someone Else".to_string();
        assert_eq!(store.put(again), Err(StoreError::AlreadyExists(r.booking_id)));
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(store.get(r.booking_id).unwrap(), Some(r));
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            JsonFileBookingStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn failed_write_keeps_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("data");
        let store = JsonFileBookingStore::open(parent.join("bookings.json")).unwrap();
        // The parent directory is now a regular file, so every write fails.
        std::fs::write(&parent, b"").unwrap();

        assert!(matches!(store.put(record()), Err(StoreError::Storage(_))));
        assert_eq!(store.len().unwrap(), 0);
    }
}
