//! The persisted, immutable result of a submitted booking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use excursio_catalog::ServiceDescriptor;
use excursio_core::{BookingId, DomainResult, Entity, Money, ServiceId};

use crate::draft::{BookingDraft, normalize_optional};

/// Booking status. The wizard only ever produces confirmed bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
        }
    }
}

impl core::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confirmed reservation. Immutable once created.
///
/// Carries the draft fields plus a snapshot of the service it was priced
/// against, so the invoice can be rendered without asking the catalog again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub booking_id: BookingId,
    pub service_id: ServiceId,
    pub service_title: String,
    pub agency_name: String,
    pub location: String,
    pub unit_price: Money,
    pub date: String,
    pub time: String,
    pub people_count: u32,
    pub special_requests: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub total_price: Money,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl BookingRecord {
    /// Materialize a record from a draft that already passed the Details gate.
    pub(crate) fn confirm(
        booking_id: BookingId,
        service: &ServiceDescriptor,
        draft: &BookingDraft,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let total_price = service.unit_price.times(draft.people_count)?;
        Ok(Self {
            booking_id,
            service_id: service.id.clone(),
            service_title: service.title.clone(),
            agency_name: service.agency_name.clone(),
            location: service.location.clone(),
            unit_price: service.unit_price,
            date: draft.date.trim().to_string(),
            time: draft.time.trim().to_string(),
            people_count: draft.people_count,
            special_requests: normalize_optional(&draft.special_requests),
            customer_name: draft.customer_name.trim().to_string(),
            customer_email: draft.customer_email.trim().to_string(),
            customer_phone: normalize_optional(&draft.customer_phone),
            total_price,
            status: BookingStatus::Confirmed,
            created_at,
        })
    }
}

impl Entity for BookingRecord {
    type Id = BookingId;

    fn id(&self) -> &Self::Id {
        &self.booking_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys_and_lowercase_status() {
        let service = ServiceDescriptor {
            id: ServiceId::new("kayak-01").unwrap(),
            title: "Sunrise kayak tour".to_string(),
            description: String::new(),
            unit_price: Money::new(120),
            agency_name: "Blue Bay Adventures".to_string(),
            location: "Tabarka".to_string(),
        };
        let draft = BookingDraft {
            date: "2025-06-01".to_string(),
            time: "09:00".to_string(),
            people_count: 2,
            customer_name: "A. Client".to_string(),
            customer_email: "a@x.com".to_string(),
            ..BookingDraft::default()
        };
        let record =
            BookingRecord::confirm(BookingId::new(), &service, &draft, Utc::now()).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["totalPrice"], 240);
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["bookingId"], record.booking_id.to_string());
        assert_eq!(json["customerPhone"], serde_json::Value::Null);

        let back: BookingRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
