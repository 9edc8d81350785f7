use chrono::{DateTime, Utc};

/// Countdown label for a meeting start: `[in 1h 5m]`, `[in 3m]` or `[ongoing]`
pub fn format_countdown(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let until = start - now;
    if until < chrono::Duration::zero() {
        return "[ongoing]".to_string();
    }

    let hours = until.num_hours();
    let minutes = until.num_minutes() % 60;

    if hours > 0 {
        format!("[in {}h {}m]", hours, minutes)
    } else {
        format!("[in {}m]", minutes)
    }
}

/// Whole minutes from `now` until `target`, never negative
pub fn minutes_remaining(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (target - now).num_minutes().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(now() + Duration::minutes(65), now()), "[in 1h 5m]");
        assert_eq!(format_countdown(now() + Duration::minutes(3), now()), "[in 3m]");
        assert_eq!(format_countdown(now() + Duration::seconds(59), now()), "[in 0m]");
        assert_eq!(format_countdown(now() - Duration::seconds(1), now()), "[ongoing]");
    }

    #[test]
    fn test_minutes_remaining_clamps() {
        assert_eq!(minutes_remaining(now() + Duration::minutes(25), now()), 25);
        assert_eq!(minutes_remaining(now() - Duration::minutes(5), now()), 0);
    }
}
