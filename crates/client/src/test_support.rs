use excursio_booking::{BookingRecord, BookingStatus};
use excursio_core::{BookingId, Money, ServiceId};

pub(crate) fn record() -> BookingRecord {
    BookingRecord {
        booking_id: BookingId::new(),
        service_id: ServiceId::new("kayak-01").unwrap(),
        service_title: "Sunrise kayak tour".to_string(),
        agency_name: "Blue Bay Adventures".to_string(),
        location: "Tabarka".to_string(),
        unit_price: Money::new(120),
        date: "2025-06-01".to_string(),
        time: "09:00".to_string(),
        people_count: 2,
        special_requests: None,
        customer_name: "A. Client".to_string(),
        customer_email: "a@x.com".to_string(),
        customer_phone: None,
        total_price: Money::new(240),
        status: BookingStatus::Confirmed,
        created_at: chrono::Utc::now(),
    }
}
