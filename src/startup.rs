use meetbell::components::meeting_alerts::{
    AlertPresenter, BrowserOpener, DialogPresenter, LogPresenter, Scheduler,
};
use meetbell::components::google_calendar::TokenManager;
use meetbell::components::GoogleCalendarHandle;
use meetbell::config::{AlertBackend, Config};
use meetbell::error::Error;
use meetbell::utils::pid;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::shutdown;

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

fn build_presenter(backend: AlertBackend) -> Arc<dyn AlertPresenter> {
    match backend {
        AlertBackend::Dialog => Arc::new(DialogPresenter::new()),
        AlertBackend::Log => Arc::new(LogPresenter),
    }
}

/// Run the alert daemon until a termination signal arrives
pub async fn run_daemon(config: Arc<Config>) -> miette::Result<()> {
    // Fail early instead of alerting about auth on the first fetch
    let token_manager = TokenManager::new(
        config.token_path.clone(),
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    token_manager.load_token().await?;

    if let Err(e) = pid::write_pid_file(&config.pid_path).await {
        warn!("Failed to write PID file: {}", e);
    } else {
        info!("PID file written to {}", config.pid_path.display());
    }

    let calendar = GoogleCalendarHandle::new(Arc::clone(&config));
    let presenter = build_presenter(config.alert_backend);
    info!("Using {:?} alert backend", config.alert_backend);

    let cancel = CancellationToken::new();
    let (scheduler, handle) = Scheduler::new(
        &config.scheduler,
        Arc::new(calendar.clone()),
        presenter,
        Arc::new(BrowserOpener),
        cancel.clone(),
    );

    let signal_handle = handle.clone();
    let signal_task = tokio::spawn(async move {
        if let Err(e) = shutdown::handle_signals(signal_handle.clone()).await {
            error!("Signal handling failed: {:?}", e);
            signal_handle.shutdown();
        }
    });

    scheduler.run().await;

    signal_task.abort();
    pid::remove_pid_file(&config.pid_path).await;

    if let Err(e) = calendar.shutdown().await {
        error!("Error shutting down Google Calendar actor: {:?}", e);
    } else {
        info!("Google Calendar actor shut down successfully");
    }

    Ok(())
}
