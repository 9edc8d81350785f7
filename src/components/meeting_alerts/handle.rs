use super::cache::{EventCache, Snapshot};
use super::scheduler::SchedulerState;
use crate::components::google_calendar::Event;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Handle for interacting with a running scheduler
#[derive(Clone)]
pub struct SchedulerHandle {
    sync_tx: mpsc::Sender<()>,
    cache: EventCache,
    state_rx: watch::Receiver<SchedulerState>,
    cancel: CancellationToken,
}

impl SchedulerHandle {
    pub(super) fn new(
        sync_tx: mpsc::Sender<()>,
        cache: EventCache,
        state_rx: watch::Receiver<SchedulerState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            sync_tx,
            cache,
            state_rx,
            cancel,
        }
    }

    /// Ask for an immediate calendar refresh
    pub fn sync(&self) {
        match self.sync_tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => debug!("Sync already pending"),
            Err(TrySendError::Closed(())) => warn!("Sync requested but scheduler is gone"),
        }
    }

    /// Stop the run loop
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    /// Wait until the run loop has exited
    pub async fn stopped(&self) {
        let mut state_rx = self.state_rx.clone();
        let _ = state_rx
            .wait_for(|state| *state == SchedulerState::Stopped)
            .await;
    }

    /// Meetings from the latest successful fetch
    pub async fn snapshot(&self) -> Snapshot {
        self.cache.read().await
    }

    /// The meeting currently in progress, if any
    pub async fn ongoing_event(&self, now: DateTime<Utc>) -> Option<Event> {
        ongoing_event(&self.snapshot().await, now).cloned()
    }

    /// The next meeting that has not started yet
    pub async fn next_event(&self, now: DateTime<Utc>) -> Option<Event> {
        next_event(&self.snapshot().await, now).cloned()
    }
}

/// First meeting that has started and not yet ended
pub fn ongoing_event(events: &[Event], now: DateTime<Utc>) -> Option<&Event> {
    events.iter().find(|event| match event.start_time {
        Some(start) => start <= now && event.end_time.map_or(true, |end| end > now),
        None => false,
    })
}

/// First meeting starting after `now`
pub fn next_event(events: &[Event], now: DateTime<Utc>) -> Option<&Event> {
    events
        .iter()
        .find(|event| event.start_time.is_some_and(|start| start > now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::ResponseStatus;
    use chrono::{Duration, TimeZone};

    fn meeting(id: &str, start: DateTime<Utc>, minutes: i64) -> Event {
        Event {
            id: id.to_string(),
            title: id.to_string(),
            start_time: Some(start),
            end_time: Some(start + Duration::minutes(minutes)),
            meet_link: format!("https://meet.google.com/{}", id),
            response_status: ResponseStatus::Accepted,
        }
    }

    #[test]
    fn test_ongoing_and_next() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let events = vec![
            meeting("ended", now - Duration::minutes(90), 30),
            meeting("current", now - Duration::minutes(10), 30),
            meeting("upcoming", now + Duration::minutes(20), 30),
            meeting("afterwards", now + Duration::minutes(60), 30),
        ];

        assert_eq!(ongoing_event(&events, now).map(|e| e.id.as_str()), Some("current"));
        assert_eq!(next_event(&events, now).map(|e| e.id.as_str()), Some("upcoming"));
    }

    #[test]
    fn test_nothing_scheduled() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let events = vec![meeting("ended", now - Duration::hours(2), 30)];
        assert!(ongoing_event(&events, now).is_none());
        assert!(next_event(&events, now).is_none());
    }

    #[test]
    fn test_meeting_without_end_counts_as_ongoing() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let mut open_ended = meeting("open", now - Duration::minutes(5), 0);
        open_ended.end_time = None;
        assert!(ongoing_event(&[open_ended], now).is_some());
    }

    #[tokio::test]
    async fn test_sync_coalesces_when_full() {
        let (sync_tx, mut sync_rx) = mpsc::channel(1);
        let (_state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let handle = SchedulerHandle::new(sync_tx, EventCache::new(), state_rx, CancellationToken::new());

        handle.sync();
        handle.sync();
        handle.sync();

        assert_eq!(sync_rx.recv().await, Some(()));
        assert!(sync_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_token() {
        let (sync_tx, _sync_rx) = mpsc::channel(1);
        let (_state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let cancel = CancellationToken::new();
        let handle = SchedulerHandle::new(sync_tx, EventCache::new(), state_rx, cancel.clone());

        assert_eq!(handle.state(), SchedulerState::Idle);
        handle.shutdown();
        assert!(cancel.is_cancelled());
    }
}
