//! Wall-clock helpers that work on both native and wasm builds.

use time::{Date, OffsetDateTime, UtcOffset};
use web_time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// UTC date-time for a millisecond timestamp.
pub fn datetime_from_millis(millis: u64) -> OffsetDateTime {
    let secs = i64::try_from(millis / 1000).unwrap_or(i64::MAX);
    OffsetDateTime::from_unix_timestamp(secs).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Today's date in the local time zone, falling back to UTC when the
/// local offset can't be determined.
pub fn today() -> Date {
    local_date(datetime_from_millis(now_millis()), local_offset())
}

/// Calendar date of `now` at `offset`, or in UTC without one.
pub fn local_date(now: OffsetDateTime, offset: Option<UtcOffset>) -> Date {
    match offset {
        Some(offset) => now.to_offset(offset).date(),
        None => now.date(),
    }
}

/// Offset from JavaScript's `Date.getTimezoneOffset`, which counts minutes
/// behind UTC (180 in Brasília).
pub fn offset_from_timezone_minutes(minutes: f64) -> Option<UtcOffset> {
    if !minutes.is_finite() {
        return None;
    }
    let seconds = i32::try_from(-(minutes.round() as i64) * 60).ok()?;
    UtcOffset::from_whole_seconds(seconds).ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn local_offset() -> Option<UtcOffset> {
    UtcOffset::current_local_offset().ok()
}

// `time` can't read the zone in the browser; ask the JS Date instead.
#[cfg(target_arch = "wasm32")]
fn local_offset() -> Option<UtcOffset> {
    offset_from_timezone_minutes(js_sys::Date::new_0().get_timezone_offset())
}
