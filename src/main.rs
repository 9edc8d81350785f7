mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting meetbell");

    // Load configuration
    let config = startup::load_config()?;

    // Run until a termination signal
    startup::run_daemon(config).await
}
