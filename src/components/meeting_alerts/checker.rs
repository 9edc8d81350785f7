use super::cache::EventCache;
use super::ledger::{EventKey, NotificationLedger};
use super::{AlertChoice, AlertItem, AlertPresenter, LinkOpener};
use crate::components::google_calendar::Event;
use crate::error::ReminderResult;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// Whether a meeting starting `time_until` from now should be alerted.
///
/// Upcoming meetings are due from `notify_before` ahead of their start; meetings that
/// already started stay due until `missed_lookback` has passed.
pub fn is_due(time_until: Duration, notify_before: Duration, missed_lookback: Duration) -> bool {
    time_until <= notify_before && time_until > -missed_lookback
}

/// What an alert tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was due
    Idle,
    /// One alert was raised for `notified` meetings.
    /// `choice` is `None` when the alert itself failed.
    Alerted {
        notified: usize,
        choice: Option<AlertChoice>,
    },
}

/// Picks due meetings and raises alerts for them
pub struct AlertChecker {
    ledger: NotificationLedger,
    presenter: Arc<dyn AlertPresenter>,
    opener: Arc<dyn LinkOpener>,
    notify_before: Duration,
    missed_lookback: Duration,
}

impl AlertChecker {
    pub fn new(
        presenter: Arc<dyn AlertPresenter>,
        opener: Arc<dyn LinkOpener>,
        notify_before: Duration,
        missed_lookback: Duration,
    ) -> Self {
        Self {
            ledger: NotificationLedger::new(),
            presenter,
            opener,
            notify_before,
            missed_lookback,
        }
    }

    /// Replace the ledger, mainly for tests and smaller capacities
    pub fn with_ledger(mut self, ledger: NotificationLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    pub fn presenter(&self) -> Arc<dyn AlertPresenter> {
        Arc::clone(&self.presenter)
    }

    /// Meetings in `snapshot` that are due at `now` and not yet alerted, in snapshot order
    pub fn due_batch(&self, snapshot: &[Event], now: DateTime<Utc>) -> Vec<Event> {
        snapshot
            .iter()
            .filter(|event| {
                let Some(key) = EventKey::for_event(event) else {
                    return false;
                };
                if self.ledger.contains(&key) {
                    return false;
                }
                is_due(key.start_time - now, self.notify_before, self.missed_lookback)
            })
            .cloned()
            .collect()
    }

    /// Select this tick's batch from a fresh snapshot, `None` when nothing is due
    pub async fn begin_tick(&mut self, cache: &EventCache, now: DateTime<Utc>) -> Option<Vec<Event>> {
        let snapshot = cache.read().await;
        let batch = self.due_batch(&snapshot, now);

        if batch.is_empty() {
            self.ledger.cleanup();
            return None;
        }
        Some(batch)
    }

    /// Run one complete tick inline: select, present, record.
    ///
    /// `Scheduler` does not call this. It splits the same steps into [`Self::begin_tick`]
    /// and [`Self::finish`] so the alert can be shown on its own task.
    pub async fn tick(&mut self, cache: &EventCache, now: DateTime<Utc>) -> TickOutcome {
        let Some(batch) = self.begin_tick(cache, now).await else {
            return TickOutcome::Idle;
        };

        let result = present_batch(self.presenter.as_ref(), &batch).await;
        self.finish(&batch, result)
    }

    /// Record a presented batch and act on the user's choice.
    ///
    /// Every meeting in the batch is recorded, whatever the user picked and even when
    /// the alert failed.
    pub fn finish(&mut self, batch: &[Event], result: ReminderResult<AlertChoice>) -> TickOutcome {
        for key in batch.iter().filter_map(EventKey::for_event) {
            self.ledger.insert(key);
        }
        if self.ledger.cleanup() {
            info!("Notification ledger exceeded capacity, cleared");
        }

        let choice = match result {
            Ok(choice) => choice,
            Err(e) => {
                error!("Failed to show alert: {}", e);
                return TickOutcome::Alerted {
                    notified: batch.len(),
                    choice: None,
                };
            }
        };

        match choice.selected_index().and_then(|index| batch.get(index)) {
            Some(selected) => {
                info!("Opening Meet: {}", selected.meet_link);
                if let Err(e) = self.opener.open(&selected.meet_link) {
                    error!("Failed to open Meet link: {}", e);
                }
            }
            None => info!("User cancelled or closed the dialog"),
        }

        TickOutcome::Alerted {
            notified: batch.len(),
            choice: Some(choice),
        }
    }
}

/// Show one alert for the whole batch
pub async fn present_batch(
    presenter: &dyn AlertPresenter,
    batch: &[Event],
) -> ReminderResult<AlertChoice> {
    for event in batch {
        match event.start_time {
            Some(start) => info!("Notifying: {} (starts at {})", event.title, start.format("%H:%M")),
            None => info!("Notifying: {}", event.title),
        }
    }

    let items: Vec<AlertItem> = batch.iter().map(AlertItem::from).collect();
    presenter.present(&items).await
}
