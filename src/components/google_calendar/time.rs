use crate::error::{google_calendar_error, ReminderResult};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Parse a Calendar API `start`/`end` object.
///
/// Returns `Ok(None)` for date-only (all-day) values and missing objects.
pub fn parse_event_time(value: Option<&Value>) -> ReminderResult<Option<DateTime<Utc>>> {
    let Some(object) = value.and_then(|v| v.as_object()) else {
        return Ok(None);
    };

    match object.get("dateTime").and_then(|dt| dt.as_str()) {
        Some(date_time) => {
            let parsed = DateTime::parse_from_rfc3339(date_time).map_err(|e| {
                google_calendar_error(&format!("Failed to parse datetime {}: {}", date_time, e))
            })?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

/// Format a timestamp the way the events list endpoint expects it
pub fn to_api_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
