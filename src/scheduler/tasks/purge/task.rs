use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::app_state::AppState;

/// Drops hourly event counts older than the configured retention.
pub async fn run(state: &AppState, now: DateTime<Utc>) -> Result<usize> {
    debug!("Running audit purge (retention {} days)...", state.retention_days);

    let purged = state
        .audit_service
        .purge_older_than(state.retention_days, now)
        .await?;

    Ok(purged)
}
