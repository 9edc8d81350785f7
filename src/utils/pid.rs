use crate::error::{other_error, ReminderResult};
use std::path::Path;
use tracing::warn;

/// Write the current process id to `path`, creating its directory if needed
pub async fn write_pid_file(path: &Path) -> ReminderResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(path, std::process::id().to_string()).await?;
    Ok(())
}

/// Remove the PID file. A missing file is not an error.
pub async fn remove_pid_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove PID file {}: {}", path.display(), e),
    }
}

/// Read the process id of a running daemon
pub async fn read_pid(path: &Path) -> ReminderResult<u32> {
    let content = tokio::fs::read_to_string(path).await?;
    content
        .trim()
        .parse::<u32>()
        .map_err(|e| other_error(&format!("Invalid PID file {}: {}", path.display(), e)))
}

/// Ask the daemon with process id `pid` to sync now (SIGUSR1)
#[cfg(unix)]
pub fn request_sync(pid: u32) -> ReminderResult<()> {
    send_signal(pid, libc::SIGUSR1)
}

/// Whether a process with this id exists
#[cfg(unix)]
pub fn is_running(pid: u32) -> bool {
    send_signal(pid, 0).is_ok()
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: libc::c_int) -> ReminderResult<()> {
    // 0 and negative ids address process groups
    let target = libc::pid_t::try_from(pid)
        .ok()
        .filter(|target| *target > 0)
        .ok_or_else(|| other_error(&format!("Invalid process id: {}", pid)))?;

    // SAFETY: kill has no memory safety requirements
    let ret = unsafe { libc::kill(target, signal) };
    if ret == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error().into())
    }
}
