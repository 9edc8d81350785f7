use super::cache::EventCache;
use super::checker::{present_batch, AlertChecker};
use super::handle::SchedulerHandle;
use super::poller::Poller;
use super::{AlertChoice, AlertPresenter, CalendarSource, LinkOpener};
use crate::components::google_calendar::Event;
use crate::config::SchedulerSettings;
use crate::error::{other_error, ReminderResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Lifecycle of the run loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// An alert waiting for the user, presented on its own task
struct PendingAlert {
    batch: Vec<Event>,
    task: JoinHandle<ReminderResult<AlertChoice>>,
}

/// Runs the poller and the alert checker on their own timers in one dispatch loop
pub struct Scheduler {
    poller: Poller,
    checker: AlertChecker,
    cache: EventCache,
    fetch_interval: Duration,
    alert_interval: Duration,
    sync_rx: mpsc::Receiver<()>,
    state_tx: watch::Sender<SchedulerState>,
    cancel: CancellationToken,
}

impl Scheduler {
    /// Create a scheduler and the handle used to talk to it
    pub fn new(
        settings: &SchedulerSettings,
        source: Arc<dyn CalendarSource>,
        presenter: Arc<dyn AlertPresenter>,
        opener: Arc<dyn LinkOpener>,
        cancel: CancellationToken,
    ) -> (Self, SchedulerHandle) {
        let poller = Poller::new(
            source,
            Arc::clone(&presenter),
            settings.missed_lookback(),
            settings.lookahead(),
        );
        let checker = AlertChecker::new(
            presenter,
            opener,
            settings.notify_before(),
            settings.missed_lookback(),
        );

        // A pending sync already covers any further requests
        let (sync_tx, sync_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let cache = EventCache::new();

        let handle = SchedulerHandle::new(sync_tx, cache.clone(), state_rx, cancel.clone());

        let scheduler = Self {
            poller,
            checker,
            cache,
            fetch_interval: settings.fetch_interval(),
            alert_interval: settings.alert_interval(),
            sync_rx,
            state_tx,
            cancel,
        };

        (scheduler, handle)
    }

    /// Run until the cancellation token fires.
    ///
    /// An alert still on screen at that point is left to finish on its own.
    pub async fn run(mut self) {
        self.state_tx.send_replace(SchedulerState::Running);
        info!(
            "Scheduler started (fetch: {:?}, alert check: {:?})",
            self.fetch_interval, self.alert_interval
        );

        // Cold start
        self.poller.refresh(&self.cache, Utc::now()).await;

        let mut fetch_timer = interval_at(Instant::now() + self.fetch_interval, self.fetch_interval);
        fetch_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut alert_timer = interval(self.alert_interval);
        alert_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut pending: Option<PendingAlert> = None;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Scheduler stopped");
                    break;
                }
                Some(()) = self.sync_rx.recv() => {
                    info!("Sync requested, syncing...");
                    self.poller.refresh(&self.cache, Utc::now()).await;
                }
                _ = fetch_timer.tick() => {
                    self.poller.refresh(&self.cache, Utc::now()).await;
                }
                _ = alert_timer.tick(), if pending.is_none() => {
                    pending = self.start_alert().await;
                }
                result = wait_for_alert(&mut pending), if pending.is_some() => {
                    if let Some(alert) = pending.take() {
                        let outcome = self.checker.finish(&alert.batch, result);
                        debug!("Alert finished: {:?}", outcome);
                    }
                }
            }
        }

        self.state_tx.send_replace(SchedulerState::Stopped);
    }

    /// Pick the due batch and put it in front of the user without blocking the loop
    async fn start_alert(&mut self) -> Option<PendingAlert> {
        let batch = self.checker.begin_tick(&self.cache, Utc::now()).await?;

        let presenter = self.checker.presenter();
        let shown = batch.clone();
        let task = tokio::spawn(async move { present_batch(presenter.as_ref(), &shown).await });

        Some(PendingAlert { batch, task })
    }
}

async fn wait_for_alert(pending: &mut Option<PendingAlert>) -> ReminderResult<AlertChoice> {
    match pending {
        Some(alert) => match (&mut alert.task).await {
            Ok(result) => result,
            Err(e) => Err(other_error(&format!("Alert task failed: {}", e))),
        },
        None => std::future::pending().await,
    }
}
