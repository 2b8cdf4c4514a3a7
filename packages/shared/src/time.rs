use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Get current time in UTC
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Interpret a zone-less date-time as the local wall clock and convert to UTC.
///
/// Ambiguous local times (DST fold) resolve to the earlier instant; times that
/// do not exist locally (DST gap) fall back to treating the value as UTC.
pub fn naive_local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

/// Convert Unix milliseconds to UTC, `None` when out of range
pub fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Human readable distance between `then` and `now`.
///
/// Timestamps in the future (clock skew between client and server) are
/// reported as "just now".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = hours / 24;
    if days < 30 {
        return plural(days, "day");
    }

    then.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
