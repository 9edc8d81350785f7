use super::cache::EventCache;
use super::{AlertPresenter, CalendarSource};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of one refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub ok: bool,
    pub event_count: usize,
}

/// Refreshes the event cache from the calendar
pub struct Poller {
    source: Arc<dyn CalendarSource>,
    presenter: Arc<dyn AlertPresenter>,
    lookback: Duration,
    lookahead: Duration,
    auth_alert_shown: bool,
}

impl Poller {
    pub fn new(
        source: Arc<dyn CalendarSource>,
        presenter: Arc<dyn AlertPresenter>,
        lookback: Duration,
        lookahead: Duration,
    ) -> Self {
        Self {
            source,
            presenter,
            lookback,
            lookahead,
            auth_alert_shown: false,
        }
    }

    /// Fetch `[now - lookback, now + lookahead]` and swap the result into `cache`.
    ///
    /// On failure the cache keeps its previous contents.
    pub async fn refresh(&mut self, cache: &EventCache, now: DateTime<Utc>) -> RefreshOutcome {
        let start = now - self.lookback;
        let end = now + self.lookahead;

        match self.source.fetch(start, end).await {
            Ok(events) => {
                let event_count = events.len();
                cache.replace(events).await;
                self.auth_alert_shown = false;
                info!("Fetched {} events", event_count);
                RefreshOutcome {
                    ok: true,
                    event_count,
                }
            }
            Err(e) => {
                error!("Failed to fetch events: {}", e);
                if e.is_auth_failure() && !self.auth_alert_shown {
                    warn!("Calendar authorization failed, showing alert");
                    if let Err(alert_err) = self.presenter.present_auth_failure().await {
                        error!("Failed to show auth error alert: {}", alert_err);
                    }
                    self.auth_alert_shown = true;
                }
                RefreshOutcome {
                    ok: false,
                    event_count: 0,
                }
            }
        }
    }

    /// Whether an auth alert has been shown since the last successful fetch
    pub fn auth_alert_shown(&self) -> bool {
        self.auth_alert_shown
    }
}
