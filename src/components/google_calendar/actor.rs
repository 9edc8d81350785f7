use super::models::{retain_meetings, Event, ResponseStatus};
use super::time::{parse_event_time, to_api_time};
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{google_calendar_error, Error, ReminderResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use url::Url;

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    config: Arc<Config>,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    FetchEvents {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        response_tx: oneshot::Sender<ReminderResult<Vec<Event>>>,
    },
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Fetch joinable meetings starting within `[start, end]`
    pub async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ReminderResult<Vec<Event>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(GoogleCalendarCommand::FetchEvents {
                start,
                end,
                response_tx,
            })
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> ReminderResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<Config>) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let token_manager = TokenManager::new(
            config.token_path.clone(),
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
        );

        let actor = Self {
            config,
            token_manager,
            client: Client::new(),
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::FetchEvents {
                    start,
                    end,
                    response_tx,
                } => {
                    let result = self.fetch_events(start, end).await;
                    let _ = response_tx.send(result);
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// Query the events list endpoint and convert the items into meetings
    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ReminderResult<Vec<Event>> {
        let token = self.token_manager.get_token().await?;
        let url = events_url(&self.config.google_calendar_id, start, end)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(classify_http_failure(status.as_u16(), error_body));
        }

        let response_data: Value = response.json().await.map_err(|e| {
            google_calendar_error(&format!("Failed to parse events response: {}", e))
        })?;

        let events = parse_events_response(&response_data)?;
        debug!("Calendar returned {} meetings", events.len());
        Ok(events)
    }
}

/// Build the events list URL for one time range
pub fn events_url(calendar_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> ReminderResult<Url> {
    let mut url = Url::parse("https://www.googleapis.com/calendar/v3/calendars/")
        .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| google_calendar_error("Calendar URL cannot be a base"))?
        .pop_if_empty()
        .push(calendar_id)
        .push("events");

    url.query_pairs_mut()
        .append_pair("timeMin", &to_api_time(start))
        .append_pair("timeMax", &to_api_time(end))
        .append_pair("singleEvents", "true")
        .append_pair("orderBy", "startTime");

    Ok(url)
}

/// Map a failed HTTP status onto the error taxonomy
pub fn classify_http_failure(status: u16, body: String) -> Error {
    if status == 401 || status == 403 {
        Error::CalendarAuth {
            status,
            message: body,
        }
    } else {
        google_calendar_error(&format!("Failed to fetch events: HTTP {} - {}", status, body))
    }
}

/// Turn an events list response into sorted, joinable meetings
pub fn parse_events_response(response_data: &Value) -> ReminderResult<Vec<Event>> {
    let items = response_data
        .get("items")
        .and_then(|i| i.as_array())
        .ok_or_else(|| google_calendar_error("No items in response"))?;

    let mut events = Vec::with_capacity(items.len());
    for item in items {
        match parse_event(item) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Skipping calendar item: {}", e),
        }
    }

    Ok(retain_meetings(events))
}

fn parse_event(item: &Value) -> ReminderResult<Event> {
    let id = item
        .get("id")
        .and_then(|id| id.as_str())
        .ok_or_else(|| google_calendar_error("Event without id"))?
        .to_string();
    let title = item
        .get("summary")
        .and_then(|s| s.as_str())
        .unwrap_or("(No title)")
        .to_string();

    Ok(Event {
        id,
        title,
        start_time: parse_event_time(item.get("start"))?,
        end_time: parse_event_time(item.get("end"))?,
        meet_link: meet_link(item).unwrap_or_default(),
        response_status: response_status(item),
    })
}

fn meet_link(item: &Value) -> Option<String> {
    if let Some(link) = item.get("hangoutLink").and_then(|l| l.as_str()) {
        if !link.is_empty() {
            return Some(link.to_string());
        }
    }

    item.get("conferenceData")
        .and_then(|c| c.get("entryPoints"))
        .and_then(|e| e.as_array())?
        .iter()
        .find(|entry| entry.get("entryPointType").and_then(|t| t.as_str()) == Some("video"))
        .and_then(|entry| entry.get("uri"))
        .and_then(|uri| uri.as_str())
        .map(|uri| uri.to_string())
}

fn response_status(item: &Value) -> ResponseStatus {
    let organizer_is_self = item
        .get("organizer")
        .and_then(|o| o.get("self"))
        .and_then(|s| s.as_bool())
        .unwrap_or(false);
    if organizer_is_self {
        return ResponseStatus::Accepted;
    }

    item.get("attendees")
        .and_then(|a| a.as_array())
        .and_then(|attendees| {
            attendees
                .iter()
                .find(|a| a.get("self").and_then(|s| s.as_bool()).unwrap_or(false))
        })
        .and_then(|me| me.get("responseStatus"))
        .and_then(|s| s.as_str())
        .map(ResponseStatus::from_api)
        .unwrap_or(ResponseStatus::NeedsAction)
}
