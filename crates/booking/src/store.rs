//! Booking storage.
//!
//! Records are keyed by booking id so concurrent bookings never overwrite each
//! other; the most recently stored id is tracked separately as `lastBooking`.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use excursio_core::{BookingId, Entity};

use crate::record::BookingRecord;

/// Booking store abstraction.
pub trait BookingStore: Send + Sync {
    /// Store a new record. Records are immutable, so an id can only be stored once.
    fn put(&self, record: BookingRecord) -> Result<(), StoreError>;

    /// Get a record by id.
    fn get(&self, id: BookingId) -> Result<Option<BookingRecord>, StoreError>;

    /// The most recently stored record, if any.
    fn latest(&self) -> Result<Option<BookingRecord>, StoreError>;

    /// Number of stored records.
    fn len(&self) -> Result<usize, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("booking already exists: {0}")]
    AlreadyExists(BookingId),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Keyed booking records plus the most-recent pointer.
///
/// This is the serialized shape of every store implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingLedger {
    last_booking: Option<BookingId>,
    bookings: BTreeMap<BookingId, BookingRecord>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: BookingRecord) -> Result<(), StoreError> {
        let id = *record.id();
        if self.bookings.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        self.bookings.insert(id, record);
        self.last_booking = Some(id);
        Ok(())
    }

    pub fn get(&self, id: BookingId) -> Option<&BookingRecord> {
        self.bookings.get(&id)
    }

    pub fn latest(&self) -> Option<&BookingRecord> {
        self.last_booking.and_then(|id| self.bookings.get(&id))
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

/// In-memory booking store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    ledger: RwLock<BookingLedger>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl BookingStore for InMemoryBookingStore {
    fn put(&self, record: BookingRecord) -> Result<(), StoreError> {
        let mut ledger = self
            .ledger
            .write()
            .map_err(|_| StoreError::Storage("booking store lock poisoned".to_string()))?;
        ledger.insert(record)
    }

    fn get(&self, id: BookingId) -> Result<Option<BookingRecord>, StoreError> {
        let ledger = self
            .ledger
            .read()
            .map_err(|_| StoreError::Storage("booking store lock poisoned".to_string()))?;
        Ok(ledger.get(id).cloned())
    }

    fn latest(&self) -> Result<Option<BookingRecord>, StoreError> {
        let ledger = self
            .ledger
            .read()
            .map_err(|_| StoreError::Storage("booking store lock poisoned".to_string()))?;
        Ok(ledger.latest().cloned())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let ledger = self
            .ledger
            .read()
            .map_err(|_| StoreError::Storage("booking store lock poisoned".to_string()))?;
        Ok(ledger.len())
    }
}

impl<S: BookingStore + ?Sized> BookingStore for Arc<S> {
    fn put(&self, record: BookingRecord) -> Result<(), StoreError> {
        (**self).put(record)
    }

    fn get(&self, id: BookingId) -> Result<Option<BookingRecord>, StoreError> {
        (**self).get(id)
    }

    fn latest(&self) -> Result<Option<BookingRecord>, StoreError> {
        (**self).latest()
    }

    fn len(&self) -> Result<usize, StoreError> {
        (**self).len()
    }
}
