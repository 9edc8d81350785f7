//! Print the ongoing and next meeting, then exit.

use chrono::{Duration, Local, Utc};
use meetbell::components::google_calendar::Event;
use meetbell::components::meeting_alerts::{next_event, ongoing_event, CalendarSource};
use meetbell::components::GoogleCalendarHandle;
use meetbell::config::Config;
use meetbell::utils::time::{format_countdown, minutes_remaining};
use std::sync::Arc;

const STATUS_LOOKBACK_HOURS: i64 = 2;
const STATUS_LOOKAHEAD_HOURS: i64 = 3;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = Arc::new(Config::load()?);
    let calendar = GoogleCalendarHandle::new(config);

    let now = Utc::now();
    let events = calendar
        .fetch(
            now - Duration::hours(STATUS_LOOKBACK_HOURS),
            now + Duration::hours(STATUS_LOOKAHEAD_HOURS),
        )
        .await?;
    // Best effort, the process is exiting anyway
    let _ = calendar.shutdown().await;

    let ongoing = ongoing_event(&events, now);
    let next = next_event(&events, now);

    if ongoing.is_none() && next.is_none() {
        println!("No upcoming meetings with Google Meet.");
        return Ok(());
    }

    if let Some(event) = ongoing {
        let remaining = event
            .end_time
            .map(|end| format!("{}m remaining", minutes_remaining(end, now)))
            .unwrap_or_else(|| "[ongoing]".to_string());
        print_meeting("Ongoing meeting", event, &remaining);
    }

    if let Some(event) = next {
        if ongoing.is_some() {
            println!();
        }
        let countdown = event
            .start_time
            .map(|start| format_countdown(start, now))
            .unwrap_or_default();
        print_meeting("Next meeting", event, &countdown);
    }

    Ok(())
}

fn print_meeting(label: &str, event: &Event, time_status: &str) {
    let start = event
        .start_time
        .map(|start| start.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default();

    println!("{}:", label);
    println!("  Title:  {}", event.title);
    println!("  Time:   {} {}", start, time_status);
    println!("  Status: {}", event.response_status);
    println!("  Meet:   {}", event.meet_link);
}
