use chrono::{DateTime, Utc};

/// The user's answer to a meeting invitation.
///
/// Declaration order is the display priority used when several meetings share a start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResponseStatus {
    Accepted,
    Tentative,
    NeedsAction,
    Declined,
}

impl ResponseStatus {
    /// Parse the Calendar API value, unknown values count as not yet answered
    pub fn from_api(value: &str) -> Self {
        match value {
            "accepted" => ResponseStatus::Accepted,
            "tentative" => ResponseStatus::Tentative,
            "declined" => ResponseStatus::Declined,
            _ => ResponseStatus::NeedsAction,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Accepted => "accepted",
            ResponseStatus::Tentative => "tentative",
            ResponseStatus::NeedsAction => "needsAction",
            ResponseStatus::Declined => "declined",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One occurrence of a calendar event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub title: String,
    /// Absent for all-day items
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Video meeting URL, empty when the event has none
    pub meet_link: String,
    pub response_status: ResponseStatus,
}

impl Event {
    /// Whether this event belongs in the reminder window at all
    pub fn is_joinable_meeting(&self) -> bool {
        !self.meet_link.is_empty() && self.response_status != ResponseStatus::Declined
    }
}

/// Keep only joinable meetings, ordered by start time and then response priority.
///
/// Events without a start time sort last.
pub fn retain_meetings(events: Vec<Event>) -> Vec<Event> {
    let mut meetings: Vec<Event> = events
        .into_iter()
        .filter(Event::is_joinable_meeting)
        .collect();

    meetings.sort_by(|a, b| {
        (a.start_time.is_none(), a.start_time, a.response_status).cmp(&(
            b.start_time.is_none(),
            b.start_time,
            b.response_status,
        ))
    });

    meetings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event(id: &str, title: &str, start: Option<DateTime<Utc>>, status: ResponseStatus) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            start_time: start,
            end_time: start.map(|s| s + Duration::minutes(30)),
            meet_link: format!("https://meet.google.com/{}", id),
            response_status: status,
        }
    }

    #[test]
    fn test_response_status_priority() {
        assert!(ResponseStatus::Accepted < ResponseStatus::Tentative);
        assert!(ResponseStatus::Tentative < ResponseStatus::NeedsAction);
        assert!(ResponseStatus::NeedsAction < ResponseStatus::Declined);
    }

    #[test]
    fn test_response_status_from_api() {
        assert_eq!(ResponseStatus::from_api("accepted"), ResponseStatus::Accepted);
        assert_eq!(ResponseStatus::from_api("tentative"), ResponseStatus::Tentative);
        assert_eq!(ResponseStatus::from_api("needsAction"), ResponseStatus::NeedsAction);
        assert_eq!(ResponseStatus::from_api("declined"), ResponseStatus::Declined);
        assert_eq!(ResponseStatus::from_api("bogus"), ResponseStatus::NeedsAction);
    }

    #[test]
    fn test_sort_same_start_by_response_status() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let events = vec![
            event("1", "NeedsAction", Some(start), ResponseStatus::NeedsAction),
            event("2", "Accepted", Some(start), ResponseStatus::Accepted),
            event("3", "Tentative", Some(start), ResponseStatus::Tentative),
        ];

        let order: Vec<ResponseStatus> = retain_meetings(events)
            .into_iter()
            .map(|e| e.response_status)
            .collect();
        assert_eq!(
            order,
            vec![
                ResponseStatus::Accepted,
                ResponseStatus::Tentative,
                ResponseStatus::NeedsAction
            ]
        );
    }

    #[test]
    fn test_sort_by_start_time_then_status() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let later = earlier + Duration::minutes(10);
        let events = vec![
            event("1", "Later-Accepted", Some(later), ResponseStatus::Accepted),
            event("2", "Earlier-Tentative", Some(earlier), ResponseStatus::Tentative),
            event("3", "All-Day", None, ResponseStatus::Accepted),
            event("4", "Earlier-Accepted", Some(earlier), ResponseStatus::Accepted),
        ];

        let titles: Vec<String> = retain_meetings(events).into_iter().map(|e| e.title).collect();
        assert_eq!(
            titles,
            vec!["Earlier-Accepted", "Earlier-Tentative", "Later-Accepted", "All-Day"]
        );
    }

    #[test]
    fn test_declined_and_linkless_dropped() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let mut no_link = event("1", "Lunch", Some(start), ResponseStatus::Accepted);
        no_link.meet_link.clear();
        let declined = event("2", "Skip", Some(start), ResponseStatus::Declined);
        let kept = event("3", "Standup", Some(start), ResponseStatus::Tentative);

        let meetings = retain_meetings(vec![no_link, declined, kept]);
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].id, "3");
    }
}
