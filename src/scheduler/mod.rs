//! Background jobs

pub mod tasks;

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::app_state::AppState;

/// Spawns the periodic purge loop. The first run happens immediately.
pub fn spawn_purge_scheduler(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match tasks::purge::run(&state, Utc::now()).await {
                Ok(purged) => info!(purged, "Audit purge finished"),
                Err(e) => error!(?e, "Audit purge failed"),
            }
        }
    })
}
