//! Alert backends and link opening.
//!
//! [`DialogPresenter`] uses `osascript` dialogs, which block until the user answers.
//! [`LogPresenter`] is for hosts without a display.

use super::{AlertChoice, AlertItem, AlertPresenter, LinkOpener};
use crate::error::{alert_error, Error, ReminderResult};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

const DIALOG_TITLE: &str = "meetbell";
const JOIN_BUTTON: &str = "Join";
const LATER_BUTTON: &str = "Later";

/// Native macOS dialogs through `osascript`
#[derive(Debug, Clone, Default)]
pub struct DialogPresenter;

impl DialogPresenter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertPresenter for DialogPresenter {
    async fn present(&self, batch: &[AlertItem]) -> ReminderResult<AlertChoice> {
        match batch {
            [] => Ok(AlertChoice::Dismissed),
            [single] => {
                let output = run_osascript(&single_meeting_script(&single.title)).await?;
                Ok(output.map_or(AlertChoice::Dismissed, |out| parse_dialog_output(&out)))
            }
            _ => {
                let titles: Vec<&str> = batch.iter().map(|item| item.title.as_str()).collect();
                let output = run_osascript(&choose_meeting_script(&titles)).await?;
                Ok(output.map_or(AlertChoice::Dismissed, |out| {
                    parse_choice_output(&out, batch.len())
                }))
            }
        }
    }

    async fn present_auth_failure(&self) -> ReminderResult<()> {
        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            escape_applescript(
                "Google Calendar authorization failed. Run get_calendar_token to sign in again."
            ),
            DIALOG_TITLE
        );
        run_osascript(&script).await?;
        Ok(())
    }
}

/// Logs alerts and treats every one as dismissed
#[derive(Debug, Clone, Default)]
pub struct LogPresenter;

#[async_trait]
impl AlertPresenter for LogPresenter {
    async fn present(&self, batch: &[AlertItem]) -> ReminderResult<AlertChoice> {
        for item in batch {
            info!(title = %item.title, link = %item.meet_link, "Meeting starting");
        }
        Ok(AlertChoice::Dismissed)
    }

    async fn present_auth_failure(&self) -> ReminderResult<()> {
        warn!("Google Calendar authorization failed, run get_calendar_token");
        Ok(())
    }
}

/// Opens links in the default browser
#[derive(Debug, Clone, Default)]
pub struct BrowserOpener;

impl LinkOpener for BrowserOpener {
    fn open(&self, url: &str) -> ReminderResult<()> {
        webbrowser::open(url).map_err(|e| Error::LinkOpen {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Run an AppleScript snippet. `Ok(None)` means the user cancelled.
async fn run_osascript(script: &str) -> ReminderResult<Option<String>> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .await
        .map_err(|e| alert_error(&format!("Failed to run osascript: {}", e)))?;

    if output.status.success() {
        return Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()));
    }

    // osascript exits with 1 when the user cancels
    if output.status.code() == Some(1) {
        return Ok(None);
    }

    Err(alert_error(&format!(
        "osascript failed ({}): {}",
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    )))
}

fn single_meeting_script(title: &str) -> String {
    format!(
        "display dialog \"Meeting starting!\\n{}\" with title \"{}\" buttons {{\"{}\", \"{}\"}} default button \"{}\" with icon caution",
        escape_applescript(title),
        DIALOG_TITLE,
        LATER_BUTTON,
        JOIN_BUTTON,
        JOIN_BUTTON
    )
}

fn choose_meeting_script(titles: &[&str]) -> String {
    let items: Vec<String> = titles
        .iter()
        .enumerate()
        .map(|(index, title)| format!("\"{}\"", escape_applescript(&list_item(index, title))))
        .collect();

    format!(
        "choose from list {{{}}} with title \"{}\" with prompt \"Meetings starting! Pick one to join:\" OK button name \"{}\" cancel button name \"{}\"",
        items.join(", "),
        DIALOG_TITLE,
        JOIN_BUTTON,
        LATER_BUTTON
    )
}

/// Numbered so identical titles stay distinguishable
fn list_item(index: usize, title: &str) -> String {
    format!("{}. {}", index + 1, title)
}

fn parse_dialog_output(output: &str) -> AlertChoice {
    if output.contains(&format!("button returned:{}", JOIN_BUTTON)) {
        AlertChoice::Join(0)
    } else {
        AlertChoice::Dismissed
    }
}

fn parse_choice_output(output: &str, batch_len: usize) -> AlertChoice {
    let output = output.trim();
    if output == "false" {
        return AlertChoice::Dismissed;
    }

    output
        .split_once(". ")
        .and_then(|(number, _)| number.parse::<usize>().ok())
        .filter(|number| (1..=batch_len).contains(number))
        .map_or(AlertChoice::Dismissed, |number| AlertChoice::Join(number - 1))
}

/// Escape a string for use inside an AppleScript string literal
pub fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
