use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use connection_audit::app_state::build_app_state;
use connection_audit::config::AppConfig;
use connection_audit::logging::init_tracing;
use connection_audit::routes::app_router;
use connection_audit::scheduler::spawn_purge_scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _log_guard = init_tracing(&config.log_dir);

    info!(
        data_dir = ?config.data_dir,
        retention_days = config.retention_days,
        "Starting connection audit on {}",
        config.bind_addr
    );

    let state = build_app_state(&config);
    let purge_task = spawn_purge_scheduler(state.clone(), config.purge_interval);

    let app = app_router().with_state(state);
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge_task.abort();
    info!("Connection audit stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
