use meetbell::components::SchedulerHandle;
use meetbell::error::ReminderResult;
use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Translate process signals into scheduler commands.
///
/// SIGUSR1 requests an immediate sync. SIGINT and SIGTERM stop the scheduler.
#[cfg(unix)]
pub async fn handle_signals(handle: SchedulerHandle) -> ReminderResult<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM signal, initiating graceful shutdown");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT signal, initiating graceful shutdown");
                break;
            }
            _ = sigusr1.recv() => {
                info!("Received SIGUSR1 signal, syncing calendar");
                handle.sync();
            }
        }
    }

    handle.shutdown();
    Ok(())
}

#[cfg(windows)]
pub async fn handle_signals(handle: SchedulerHandle) -> ReminderResult<()> {
    let mut ctrlc = ctrl_c()?;
    let mut ctrlbreak = ctrl_break()?;

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, initiating graceful shutdown");
        }
    }

    handle.shutdown();
    Ok(())
}
