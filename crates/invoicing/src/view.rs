//! Human-readable invoice layout.

use excursio_booking::BookingRecord;
use excursio_core::BookingId;

/// Typographic role of a line; the rasterizer sizes and decorates by style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
    Total,
    Rule,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    pub style: LineStyle,
    pub text: String,
}

impl ViewLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    fn field(label: &str, value: impl core::fmt::Display) -> Self {
        Self::new(LineStyle::Body, format!("{label}: {value}"))
    }

    fn rule() -> Self {
        Self::new(LineStyle::Rule, "")
    }

    fn blank() -> Self {
        Self::new(LineStyle::Blank, "")
    }
}

/// Collapse runs of whitespace, line breaks included, into single spaces.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The invoice as an ordered list of styled lines.
///
/// Built only from the booking record, so the same record always yields the
/// same view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceView {
    booking_id: BookingId,
    lines: Vec<ViewLine>,
}

impl InvoiceView {
    pub fn from_record(record: &BookingRecord) -> Self {
        let mut lines = vec![
            ViewLine::new(LineStyle::Title, "Invoice"),
            ViewLine::field("Booking reference", record.booking_id),
            ViewLine::field("Issued", record.created_at.format("%Y-%m-%d")),
            ViewLine::field("Status", record.status),
            ViewLine::rule(),
            ViewLine::new(LineStyle::Heading, "Billed to"),
            ViewLine::new(LineStyle::Body, one_line(&record.customer_name)),
            ViewLine::new(LineStyle::Body, one_line(&record.customer_email)),
        ];
        if let Some(phone) = &record.customer_phone {
            lines.push(ViewLine::new(LineStyle::Body, one_line(phone)));
        }

        lines.push(ViewLine::blank());
        lines.push(ViewLine::new(LineStyle::Heading, "Reservation"));
        lines.push(ViewLine::field("Activity", one_line(&record.service_title)));
        lines.push(ViewLine::field("Agency", one_line(&record.agency_name)));
        if !record.location.trim().is_empty() {
            lines.push(ViewLine::field("Location", one_line(&record.location)));
        }
        lines.push(ViewLine::field("Date", &record.date));
        lines.push(ViewLine::field("Time", &record.time));
        lines.push(ViewLine::field("People", record.people_count));
        if let Some(requests) = &record.special_requests {
            lines.push(ViewLine::field("Special requests", one_line(requests)));
        }

        lines.push(ViewLine::rule());
        lines.push(ViewLine::new(
            LineStyle::Body,
            format!(
                "{} x {} = {}",
                record.people_count, record.unit_price, record.total_price
            ),
        ));
        lines.push(ViewLine::new(
            LineStyle::Total,
            format!("Total: {}", record.total_price),
        ));
        lines.push(ViewLine::blank());
        lines.push(ViewLine::new(
            LineStyle::Body,
            format!("Thank you for booking with {}.", one_line(&record.agency_name)),
        ));

        Self {
            booking_id: record.booking_id,
            lines,
        }
    }

    pub fn booking_id(&self) -> BookingId {
        self.booking_id
    }

    pub fn lines(&self) -> &[ViewLine] {
        &self.lines
    }

    /// Plain-text rendition for printing and terminal preview.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line.style {
                LineStyle::Title => out.push_str(&line.text.to_uppercase()),
                LineStyle::Heading => {
                    out.push_str(&line.text);
                    out.push('\n');
                    out.push_str(&"~".repeat(line.text.chars().count()));
                }
                LineStyle::Rule => out.push_str(&"-".repeat(48)),
                LineStyle::Body | LineStyle::Total | LineStyle::Blank => out.push_str(&line.text),
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;

    #[test]
    fn view_shows_total_and_reference() {
        let record = record();
        let view = InvoiceView::from_record(&record);
        let text = view.to_plain_text();

        assert!(text.starts_with("INVOICE\n"));
        assert!(text.contains(&format!("Booking reference: {}", record.booking_id)));
        assert!(text.contains("Issued: 2025-05-20"));
        assert!(text.contains("Status: confirmed"));
        assert!(text.contains("2 x 120 = 240"));
        assert!(text.contains("Total: 240"));
        assert_eq!(
            view.lines().iter().filter(|l| l.style == LineStyle::Total).count(),
            1
        );
    }

    #[test]
    fn optional_fields_only_appear_when_present() {
        let mut record = record();
        let without = InvoiceView::from_record(&record).to_plain_text();
        assert!(!without.contains("Special requests"));

        record.customer_phone = Some("+216 20 000 000".to_string());
        record.special_requests = Some("Child seat".to_string());
        let with = InvoiceView::from_record(&record).to_plain_text();
        assert!(with.contains("+216 20 000 000"));
        assert!(with.contains("Special requests: Child seat"));
    }

    #[test]
    fn multi_line_requests_are_flattened() {
        let mut record = record();
        record.special_requests = Some("Vegetarian lunch\n\tChild seat".to_string());
        let view = InvoiceView::from_record(&record);
        assert!(view.lines().iter().all(|l| !l.text.contains(['\n', '\t'])));
        assert!(
            view.to_plain_text()
                .contains("Special requests: Vegetarian lunch Child seat")
        );
    }

    #[test]
    fn same_record_gives_same_view() {
        let record = record();
        assert_eq!(InvoiceView::from_record(&record), InvoiceView::from_record(&record));
    }
}
