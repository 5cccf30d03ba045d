//! UTC-normalized expiry arithmetic for allowlist entries.
//!
//! Every date is resolved to a UTC instant before comparison, so results do
//! not depend on the host timezone:
//!
//! - `YYYY-MM-DD` is midnight UTC on that day
//! - RFC 3339 date-times are converted from their offset to UTC
//! - date-times without an offset are taken as UTC
//!
//! # Example
//!
//! ```
//! use auditgate::expiry::{is_expired, will_expire_soon};
//! use chrono::{TimeZone, Utc};
//!
//! let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
//!
//! assert!(is_expired(Some("2024-06-01"), now));
//! assert!(!is_expired(Some("2024-06-02"), now));
//! assert!(will_expire_soon(Some("2024-06-20"), now, 30));
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Default window, in days, for flagging allowlist entries that expire soon.
pub const DEFAULT_EXPIRING_THRESHOLD_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Parses a date or date-time string into a UTC instant.
///
/// Returns `None` for anything that is not a recognised date.
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }

    None
}

/// Returns true when the entry is no longer valid at `now`.
///
/// Missing and unparsable dates count as expired. The expiry instant itself
/// is already expired; an entry is live only while `now < expires`.
pub fn is_expired(expires: Option<&str>, now: DateTime<Utc>) -> bool {
    match expires.and_then(parse_utc) {
        Some(expires) => now >= expires,
        None => true,
    }
}

/// Whole days from `now` until `expires`, rounded up.
///
/// Returns `None` if the date is missing, unparsable or already expired.
pub fn days_until(expires: Option<&str>, now: DateTime<Utc>) -> Option<i64> {
    let expires = expires.and_then(parse_utc)?;
    if now >= expires {
        return None;
    }
    let millis = (expires - now).num_milliseconds();
    Some((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY)
}

/// Returns true when the entry is still live but expires within
/// `threshold_days` days of `now` (inclusive).
pub fn will_expire_soon(expires: Option<&str>, now: DateTime<Utc>, threshold_days: i64) -> bool {
    days_until(expires, now).is_some_and(|days| days <= threshold_days)
}
