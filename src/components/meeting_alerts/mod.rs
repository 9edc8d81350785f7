//! Meeting alert core: keeps a rolling window of upcoming meetings and raises one
//! interactive alert per meeting occurrence.

mod cache;
mod checker;
mod handle;
mod ledger;
pub mod notifications;
mod poller;
mod scheduler;

pub use cache::{EventCache, Snapshot};
pub use checker::{is_due, AlertChecker, TickOutcome};
pub use handle::{next_event, ongoing_event, SchedulerHandle};
pub use ledger::{EventKey, NotificationLedger, LEDGER_CAPACITY};
pub use notifications::{BrowserOpener, DialogPresenter, LogPresenter};
pub use poller::{Poller, RefreshOutcome};
pub use scheduler::{Scheduler, SchedulerState};

use crate::components::google_calendar::Event;
use crate::error::ReminderResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Where meetings come from
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Joinable meetings starting within `[start, end]`, sorted by start then response status.
    ///
    /// Authorization failures must come back as `Error::CalendarAuth`.
    async fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ReminderResult<Vec<Event>>;
}

/// One line of an alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertItem {
    pub title: String,
    pub meet_link: String,
}

impl From<&Event> for AlertItem {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            meet_link: event.meet_link.clone(),
        }
    }
}

/// What the user did with an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChoice {
    /// Join the meeting at this batch index
    Join(usize),
    /// Dismissed, cancelled or closed
    Dismissed,
}

impl AlertChoice {
    pub fn joined(&self) -> bool {
        matches!(self, AlertChoice::Join(_))
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self {
            AlertChoice::Join(index) => Some(*index),
            AlertChoice::Dismissed => None,
        }
    }
}

/// Shows alerts to the user. `present` may block for as long as the user takes.
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    /// Show a non-empty batch of meetings and report the user's choice
    async fn present(&self, batch: &[AlertItem]) -> ReminderResult<AlertChoice>;

    /// Tell the user the calendar no longer accepts our credentials
    async fn present_auth_failure(&self) -> ReminderResult<()>;
}

/// Opens meeting links
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> ReminderResult<()>;
}
