//! Client routes and navigation outcomes.

use std::fmt;

use excursio_core::{BookingId, ServiceId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Service listing; the fallback destination for anything missing.
    Catalog,
    Booking { service_id: ServiceId },
    Confirmation { booking_id: BookingId },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Catalog => "/services".to_string(),
            Route::Booking { service_id } => format!("/services/{service_id}/book"),
            Route::Confirmation { booking_id } => format!("/booking-confirmation/{booking_id}"),
        }
    }

    /// Parse a path produced by [`Route::path`]. Trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path
            .trim()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            ["services"] => Some(Route::Catalog),
            ["services", id, "book"] => ServiceId::new(*id)
                .ok()
                .map(|service_id| Route::Booking { service_id }),
            ["booking-confirmation", id] => id
                .parse::<BookingId>()
                .ok()
                .map(|booking_id| Route::Confirmation { booking_id }),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What a screen does when it is opened: show itself or send the user elsewhere.
#[derive(Debug)]
pub enum Navigation<T> {
    Render(T),
    Redirect(Route),
}

impl<T> Navigation<T> {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }

    pub fn into_render(self) -> Option<T> {
        match self {
            Navigation::Render(page) => Some(page),
            Navigation::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&Route> {
        match self {
            Navigation::Render(_) => None,
            Navigation::Redirect(route) => Some(route),
        }
    }
}
