//! Ask the running daemon to fetch the calendar immediately.

use meetbell::config::{Config, DEFAULT_PID_PATH};
use meetbell::error::other_error;
use meetbell::utils::pid;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Only the PID path is needed, so calendar credentials are optional here
    let pid_path = match Config::load() {
        Ok(config) => config.pid_path,
        Err(_) => std::env::var("PID_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PID_PATH)),
    };

    let daemon_pid = pid::read_pid(&pid_path).await.map_err(|e| {
        other_error(&format!(
            "Daemon not running or PID file {} not found: {}",
            pid_path.display(),
            e
        ))
    })?;

    signal_daemon(daemon_pid)?;
    println!("Sync signal sent to daemon.");

    Ok(())
}

#[cfg(unix)]
fn signal_daemon(daemon_pid: u32) -> miette::Result<()> {
    if !pid::is_running(daemon_pid) {
        return Err(other_error(&format!("No process with id {}, is the daemon running?", daemon_pid)).into());
    }
    pid::request_sync(daemon_pid)?;
    Ok(())
}

#[cfg(not(unix))]
fn signal_daemon(_daemon_pid: u32) -> miette::Result<()> {
    Err(other_error("meeting_sync needs a Unix signal to reach the daemon").into())
}
