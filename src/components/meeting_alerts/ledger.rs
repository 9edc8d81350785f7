use crate::components::google_calendar::Event;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Ledger size above which cleanup forgets everything
pub const LEDGER_CAPACITY: usize = 100;

/// Identity of one occurrence. A rescheduled meeting keeps its id but gets a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub id: String,
    pub start_time: DateTime<Utc>,
}

impl EventKey {
    pub fn new(id: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            start_time,
        }
    }

    /// Key for an event, `None` for all-day items
    pub fn for_event(event: &Event) -> Option<Self> {
        event.start_time.map(|start| Self::new(event.id.clone(), start))
    }
}

/// Occurrences that have already been alerted
#[derive(Debug)]
pub struct NotificationLedger {
    keys: HashSet<EventKey>,
    capacity: usize,
}

impl Default for NotificationLedger {
    fn default() -> Self {
        Self::with_capacity(LEDGER_CAPACITY)
    }
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: HashSet::new(),
            capacity,
        }
    }

    pub fn contains(&self, key: &EventKey) -> bool {
        self.keys.contains(key)
    }

    pub fn insert(&mut self, key: EventKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Clear the whole ledger once it grows past capacity.
    ///
    /// Returns true if it was cleared. Past meetings stay quiet afterwards because they no
    /// longer fall inside the notify window.
    pub fn cleanup(&mut self) -> bool {
        if self.keys.len() > self.capacity {
            self.keys.clear();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn filled(count: usize) -> NotificationLedger {
        let base = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let mut ledger = NotificationLedger::new();
        for i in 0..count {
            ledger.insert(EventKey::new(i.to_string(), base + Duration::minutes(i as i64)));
        }
        ledger
    }

    #[test]
    fn test_cleanup_over_capacity() {
        let mut ledger = filled(101);
        assert!(ledger.cleanup());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_no_cleanup_at_capacity() {
        let mut ledger = filled(100);
        assert!(!ledger.cleanup());
        assert_eq!(ledger.len(), 100);
    }

    #[test]
    fn test_no_cleanup_under_capacity() {
        let mut ledger = filled(50);
        assert!(!ledger.cleanup());
        assert_eq!(ledger.len(), 50);
    }

    #[test]
    fn test_rescheduled_meeting_has_new_key() {
        let base = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let original = EventKey::new("meeting-123", base + Duration::minutes(10));
        let rescheduled = EventKey::new("meeting-123", base + Duration::minutes(30));

        let mut ledger = NotificationLedger::new();
        ledger.insert(original.clone());

        assert!(ledger.contains(&original));
        assert!(!ledger.contains(&rescheduled));
        assert_ne!(original, rescheduled);
    }

    #[test]
    fn test_duplicate_insert() {
        let base = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let mut ledger = NotificationLedger::new();
        assert!(ledger.insert(EventKey::new("m1", base)));
        assert!(!ledger.insert(EventKey::new("m1", base)));
        assert_eq!(ledger.len(), 1);
    }
}
