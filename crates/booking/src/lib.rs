//! Booking wizard and confirmed booking records.
//!
//! The wizard is a pure state machine (`Details → Confirmation → Submitted`);
//! the only side effect, writing the confirmed record to a [`BookingStore`],
//! happens in [`BookingWizard::submit`] before the final transition is applied.

pub mod draft;
pub mod record;
pub mod store;
pub mod wizard;

pub use draft::{BookingDraft, DraftField, MAX_PEOPLE, MIN_PEOPLE};
pub use record::{BookingRecord, BookingStatus};
pub use store::{BookingLedger, BookingStore, InMemoryBookingStore, StoreError};
pub use wizard::{BookingWizard, WizardCommand, WizardError, WizardEvent, WizardStep};
