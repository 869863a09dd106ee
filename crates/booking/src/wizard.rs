//! Quick-booking wizard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use excursio_catalog::{Catalog, CatalogError, ServiceDescriptor};
use excursio_core::{BookingId, DomainError, Money, ServiceId, StateMachine};

use crate::draft::{BookingDraft, DraftField};
use crate::record::BookingRecord;
use crate::store::{BookingStore, StoreError};

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Details,
    Confirmation,
    Submitted,
}

impl core::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            WizardStep::Details => "details",
            WizardStep::Confirmation => "confirmation",
            WizardStep::Submitted => "submitted",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    /// Details → Confirmation, gated by draft validation.
    Advance,
    /// Confirmation → Details, keeps the draft.
    Back,
    /// Confirmation → Submitted.
    Submit {
        booking_id: BookingId,
        created_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    AdvancedToConfirmation,
    ReturnedToDetails,
    BookingConfirmed(BookingRecord),
}

fn field_list(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(DraftField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("please fill in all required fields: {}", field_list(.0))]
    MissingFields(Vec<DraftField>),
    #[error("invalid {field}: {reason}")]
    InvalidField { field: DraftField, reason: String },
    #[error("cannot {action} in the {step} step")]
    WrongStep {
        action: &'static str,
        step: WizardStep,
    },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WizardError {
    /// Errors the user fixes by editing the form.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WizardError::MissingFields(_) | WizardError::InvalidField { .. }
        )
    }
}

/// Multi-step booking input for one catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWizard {
    service: ServiceDescriptor,
    draft: BookingDraft,
    step: WizardStep,
    record: Option<BookingRecord>,
}

impl BookingWizard {
    pub fn new(service: ServiceDescriptor) -> Self {
        Self {
            service,
            draft: BookingDraft::default(),
            step: WizardStep::Details,
            record: None,
        }
    }

    /// Open the wizard for a catalog service.
    pub async fn start<C>(catalog: &C, service_id: &ServiceId) -> Result<Self, WizardError>
    where
        C: Catalog + ?Sized,
    {
        let service = catalog.fetch(service_id).await?;
        Ok(Self::new(service))
    }

    pub fn service(&self) -> &ServiceDescriptor {
        &self.service
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    /// The confirmed record, once submitted.
    pub fn record(&self) -> Option<&BookingRecord> {
        self.record.as_ref()
    }

    /// Editable draft. Only available in the Details step.
    pub fn draft_mut(&mut self) -> Result<&mut BookingDraft, WizardError> {
        match self.step {
            WizardStep::Details => Ok(&mut self.draft),
            step => Err(WizardError::WrongStep {
                action: "edit the booking",
                step,
            }),
        }
    }

    /// Price for the current draft.
    pub fn quote(&self) -> Result<Money, WizardError> {
        Ok(self.service.unit_price.times(self.draft.people_count)?)
    }

    pub fn advance(&mut self) -> Result<(), WizardError> {
        match self.execute(&WizardCommand::Advance) {
            Ok(_) => Ok(()),
            Err(err) => {
                if err.is_validation() {
                    warn!(service_id = %self.service.id, error = %err, "booking details rejected");
                }
                Err(err)
            }
        }
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.execute(&WizardCommand::Back).map(|_| ())
    }

    /// Confirm the booking: build the record, store it, then finish the wizard.
    ///
    /// If the store rejects the write the wizard stays in Confirmation and can
    /// be submitted again.
    pub fn submit<S>(&mut self, store: &S) -> Result<BookingRecord, WizardError>
    where
        S: BookingStore + ?Sized,
    {
        self.submit_with(store, BookingId::new(), Utc::now())
    }

    pub fn submit_with<S>(
        &mut self,
        store: &S,
        booking_id: BookingId,
        created_at: DateTime<Utc>,
    ) -> Result<BookingRecord, WizardError>
    where
        S: BookingStore + ?Sized,
    {
        let events = self.handle(&WizardCommand::Submit {
            booking_id,
            created_at,
        })?;

        let record = events
            .iter()
            .find_map(|event| match event {
                WizardEvent::BookingConfirmed(record) => Some(record.clone()),
                _ => None,
            })
            .ok_or_else(|| DomainError::invariant("submission produced no booking"))?;

        store.put(record.clone())?;
        for event in &events {
            self.apply(event);
        }

        info!(
            booking_id = %record.booking_id,
            service_id = %record.service_id,
            people = record.people_count,
            total = %record.total_price,
            "booking confirmed"
        );
        Ok(record)
    }

    fn ensure_step(&self, expected: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                action,
                step: self.step,
            });
        }
        Ok(())
    }
}

impl StateMachine for BookingWizard {
    type Command = WizardCommand;
    type Event = WizardEvent;
    type Error = WizardError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            WizardEvent::AdvancedToConfirmation => self.step = WizardStep::Confirmation,
            WizardEvent::ReturnedToDetails => self.step = WizardStep::Details,
            WizardEvent::BookingConfirmed(record) => {
                self.record = Some(record.clone());
                self.step = WizardStep::Submitted;
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            WizardCommand::Advance => {
                self.ensure_step(WizardStep::Details, "continue")?;
                self.draft.check()?;
                Ok(vec![WizardEvent::AdvancedToConfirmation])
            }
            WizardCommand::Back => {
                self.ensure_step(WizardStep::Confirmation, "go back")?;
                Ok(vec![WizardEvent::ReturnedToDetails])
            }
            WizardCommand::Submit {
                booking_id,
                created_at,
            } => {
                self.ensure_step(WizardStep::Confirmation, "submit")?;
                // Confirmation is only reachable through the gate, but the
                // draft is re-checked so a record is never built from bad input.
                self.draft.check()?;
                let record =
                    BookingRecord::confirm(*booking_id, &self.service, &self.draft, *created_at)?;
                Ok(vec![WizardEvent::BookingConfirmed(record)])
            }
        }
    }
}
