use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use super::models::Event;
use crate::components::meeting_alerts::CalendarSource;
use crate::config::Config;
use crate::error::ReminderResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: Arc<Config>) -> Self {
        let (mut actor, handle) = GoogleCalendarActor::new(config);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> ReminderResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarHandle {
    async fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ReminderResult<Vec<Event>> {
        self.actor_handle.fetch_events(start, end).await
    }
}
