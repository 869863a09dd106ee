//! In-progress booking input.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use excursio_core::text::first_unprintable;

use crate::wizard::WizardError;

pub const MIN_PEOPLE: u32 = 1;
pub const MAX_PEOPLE: u32 = 10;
/// Longest accepted name, email or phone, in characters.
pub const MAX_CONTACT_CHARS: usize = 200;
/// Longest accepted special request, in characters.
pub const MAX_REQUEST_CHARS: usize = 1000;

/// Form state collected by the wizard's Details step.
///
/// Fields stay raw strings while the user types; they are only checked at the
/// Details gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Start time, `HH:MM`.
    pub time: String,
    pub people_count: u32,
    pub special_requests: Option<String>,
    pub customer_name: String,
    /// Required; the format is not checked.
    pub customer_email: String,
    pub customer_phone: Option<String>,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            date: String::new(),
            time: String::new(),
            people_count: MIN_PEOPLE,
            special_requests: None,
            customer_name: String::new(),
            customer_email: String::new(),
            customer_phone: None,
        }
    }
}

/// Draft fields that can block the Details gate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Date,
    Time,
    PeopleCount,
    CustomerName,
    CustomerEmail,
    CustomerPhone,
    SpecialRequests,
}

impl DraftField {
    pub fn label(&self) -> &'static str {
        match self {
            DraftField::Date => "date",
            DraftField::Time => "time",
            DraftField::PeopleCount => "number of people",
            DraftField::CustomerName => "full name",
            DraftField::CustomerEmail => "email",
            DraftField::CustomerPhone => "phone",
            DraftField::SpecialRequests => "special requests",
        }
    }
}

impl core::fmt::Display for DraftField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl BookingDraft {
    /// Required fields that are still empty, in form order.
    pub fn missing_fields(&self) -> Vec<DraftField> {
        let mut missing = Vec::new();
        if is_blank(&self.date) {
            missing.push(DraftField::Date);
        }
        if is_blank(&self.time) {
            missing.push(DraftField::Time);
        }
        if is_blank(&self.customer_name) {
            missing.push(DraftField::CustomerName);
        }
        if is_blank(&self.customer_email) {
            missing.push(DraftField::CustomerEmail);
        }
        missing
    }

    /// Check the draft against the Details gate.
    ///
    /// Missing required fields are reported together; format problems are
    /// only reported once every required field is present.
    pub fn check(&self) -> Result<(), WizardError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(WizardError::MissingFields(missing));
        }

        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            WizardError::InvalidField {
                field: DraftField::Date,
                reason: format!("'{}' is not a YYYY-MM-DD date", self.date.trim()),
            }
        })?;

        NaiveTime::parse_from_str(self.time.trim(), "%H:%M").map_err(|_| {
            WizardError::InvalidField {
                field: DraftField::Time,
                reason: format!("'{}' is not an HH:MM time", self.time.trim()),
            }
        })?;

        if !(MIN_PEOPLE..=MAX_PEOPLE).contains(&self.people_count) {
            return Err(WizardError::InvalidField {
                field: DraftField::PeopleCount,
                reason: format!("must be between {MIN_PEOPLE} and {MAX_PEOPLE}"),
            });
        }

        let free_text = [
            (DraftField::CustomerName, Some(&self.customer_name), MAX_CONTACT_CHARS),
            (DraftField::CustomerEmail, Some(&self.customer_email), MAX_CONTACT_CHARS),
            (DraftField::CustomerPhone, self.customer_phone.as_ref(), MAX_CONTACT_CHARS),
            (DraftField::SpecialRequests, self.special_requests.as_ref(), MAX_REQUEST_CHARS),
        ];
        for (field, value, max_chars) in free_text {
            if let Some(value) = value {
                check_text(field, value.trim(), max_chars)?;
            }
        }

        Ok(())
    }
}

/// The invoice can only print Latin text of bounded length.
fn check_text(field: DraftField, value: &str, max_chars: usize) -> Result<(), WizardError> {
    if value.chars().count() > max_chars {
        return Err(WizardError::InvalidField {
            field,
            reason: format!("must be at most {max_chars} characters"),
        });
    }
    if let Some(ch) = first_unprintable(value) {
        return Err(WizardError::InvalidField {
            field,
            reason: format!("character {ch:?} cannot be printed on the invoice"),
        });
    }
    Ok(())
}

/// Trim an optional free-text field, dropping it when nothing is left.
pub(crate) fn normalize_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn complete() -> BookingDraft {
        BookingDraft {
            date: "2025-06-01".to_string(),
            time: "09:00".to_string(),
            people_count: 2,
            customer_name: "A. Client".to_string(),
            customer_email: "a@x.com".to_string(),
            ..BookingDraft::default()
        }
    }

    #[test]
    fn default_draft_books_one_person_and_misses_everything() {
        let draft = BookingDraft::default();
        assert_eq!(draft.people_count, 1);
        assert_eq!(
            draft.missing_fields(),
            vec![
                DraftField::Date,
                DraftField::Time,
                DraftField::CustomerName,
                DraftField::CustomerEmail
            ]
        );
    }

    #[test]
    fn complete_draft_passes() {
        assert!(complete().check().is_ok());
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let draft = BookingDraft {
            customer_name: "   ".to_string(),
            ..complete()
        };
        match draft.check() {
            Err(WizardError::MissingFields(fields)) => {
                assert_eq!(fields, vec![DraftField::CustomerName])
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn email_format_is_not_checked() {
        let draft = BookingDraft {
            customer_email: "not really an email".to_string(),
            ..complete()
        };
        assert!(draft.check().is_ok());
    }

    #[test]
    fn malformed_date_and_time_are_invalid() {
        let bad_date = BookingDraft {
            date: "01/06/2025".to_string(),
            ..complete()
        };
        assert!(matches!(
            bad_date.check(),
            Err(WizardError::InvalidField { field: DraftField::Date, .. })
        ));

        let bad_time = BookingDraft {
            time: "9am".to_string(),
            ..complete()
        };
        assert!(matches!(
            bad_time.check(),
            Err(WizardError::InvalidField { field: DraftField::Time, .. })
        ));
    }

    #[test]
    fn people_count_outside_bounds_is_invalid() {
        for count in [0, 11] {
            let draft = BookingDraft {
                people_count: count,
                ..complete()
            };
            assert!(matches!(
                draft.check(),
                Err(WizardError::InvalidField { field: DraftField::PeopleCount, .. })
            ));
        }
    }

    #[test]
    fn line_breaks_and_accents_are_accepted() {
        let draft = BookingDraft {
            customer_name: "Zoé Müller".to_string(),
            special_requests: Some("Vegetarian lunch\nChild seat".to_string()),
            ..complete()
        };
        assert!(draft.check().is_ok());
    }

    #[test]
    fn text_the_invoice_cannot_print_is_invalid() {
        let name = BookingDraft {
            customer_name: "علي بن سالم".to_string(),
            ..complete()
        };
        assert!(matches!(
            name.check(),
            Err(WizardError::InvalidField { field: DraftField::CustomerName, .. })
        ));

        let phone = BookingDraft {
            customer_phone: Some("☎ 20 000 000".to_string()),
            ..complete()
        };
        assert!(matches!(
            phone.check(),
            Err(WizardError::InvalidField { field: DraftField::CustomerPhone, .. })
        ));
    }

    #[test]
    fn over_long_text_is_invalid() {
        let at_limit = BookingDraft {
            special_requests: Some("a".repeat(MAX_REQUEST_CHARS)),
            ..complete()
        };
        assert!(at_limit.check().is_ok());

        let requests = BookingDraft {
            special_requests: Some("a".repeat(MAX_REQUEST_CHARS + 1)),
            ..complete()
        };
        assert!(matches!(
            requests.check(),
            Err(WizardError::InvalidField { field: DraftField::SpecialRequests, .. })
        ));

        let email = BookingDraft {
            customer_email: format!("{}@x.com", "a".repeat(MAX_CONTACT_CHARS)),
            ..complete()
        };
        assert!(matches!(
            email.check(),
            Err(WizardError::InvalidField { field: DraftField::CustomerEmail, .. })
        ));
    }

    #[test]
    fn normalize_optional_drops_blank_text() {
        assert_eq!(normalize_optional(&Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional(&Some(" vegan lunch ".to_string())),
            Some("vegan lunch".to_string())
        );
        assert_eq!(normalize_optional(&None), None);
    }

    proptest! {
        /// Blanking any subset of the required fields reports exactly that subset.
        #[test]
        fn missing_fields_reports_every_blank_required_field(mask in 1u8..16) {
            let mut draft = complete();
            let mut expected = Vec::new();
            if mask & 1 != 0 { draft.date.clear(); expected.push(DraftField::Date); }
            if mask & 2 != 0 { draft.time.clear(); expected.push(DraftField::Time); }
            if mask & 4 != 0 {
                draft.customer_name.clear();
                expected.push(DraftField::CustomerName);
            }
            if mask & 8 != 0 {
                draft.customer_email.clear();
                expected.push(DraftField::CustomerEmail);
            }
            prop_assert_eq!(draft.missing_fields(), expected.clone());
            let reported = draft.check();
            prop_assert!(matches!(reported, Err(WizardError::MissingFields(f)) if f == expected));
        }
    }
}
