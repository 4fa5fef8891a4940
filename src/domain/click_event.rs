//! Click event model for asynchronous counter reconciliation.

use chrono::{DateTime, Utc};

/// A recorded click awaiting reconciliation into the authoritative store.
///
/// Created in the resolution engine after the cached counter has been
/// incremented, and sent over a bounded channel to
/// [`crate::domain::click_worker::run_click_worker`]. Delivery order between
/// events for the same code is not guaranteed; the store increment is
/// commutative so the final count converges regardless.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub short_code: String,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(short_code: impl Into<String>, clicked_at: DateTime<Utc>) -> Self {
        Self {
            short_code: short_code.into(),
            clicked_at,
        }
    }
}
