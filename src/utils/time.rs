//! Time and timestamp utilities

use chrono::{DateTime, Utc};

/// Current Unix timestamp in milliseconds
pub fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Whether an optional expiry lies in the past; `None` never expires
pub fn is_expired(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expiry.map_or(false, |at| at <= now)
}
