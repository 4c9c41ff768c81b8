use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::core::persistence::audit::audit_event_count_repository_traits::{
    BulkInsertEventCountsQuery, PurgeEventCountsQuery, SelectConnectionsEventCountByDayQuery,
};
use crate::domain::audit::error::{invalid_input, AuditError};
use crate::domain::audit::model::hourly_event_count::HourlyEventCount;
use crate::domain::audit::model::weekly_event_counts::WeeklyEventCounts;
use crate::domain::audit::query::count_daily_events_by_connection::{
    CountDailyEventsByConnectionHandler, CountDailyEventsByConnectionQuery,
};

/// Longest retention accepted by a purge.
pub const MAX_RETENTION_DAYS: u32 = 3650;

pub struct AuditService<R> {
    repo: Arc<R>,
    count_daily_events: CountDailyEventsByConnectionHandler<Arc<R>>,
}

impl<R> AuditService<R>
where
    R: SelectConnectionsEventCountByDayQuery + BulkInsertEventCountsQuery + PurgeEventCountsQuery,
{
    pub fn new(repo: R) -> Self {
        let repo = Arc::new(repo);
        Self {
            count_daily_events: CountDailyEventsByConnectionHandler::new(Arc::clone(&repo)),
            repo,
        }
    }

    pub async fn count_daily_events(
        &self,
        query: CountDailyEventsByConnectionQuery,
    ) -> Result<Vec<WeeklyEventCounts>, AuditError> {
        self.count_daily_events.handle(&query)
    }

    pub async fn record_hourly_event_counts(
        &self,
        rows: Vec<HourlyEventCount>,
    ) -> Result<usize, AuditError> {
        if rows.is_empty() {
            return Ok(0);
        }

        self.repo
            .bulk_insert(&rows)
            .map_err(AuditError::CollaboratorFailure)?;
        Ok(rows.len())
    }

    pub async fn purge_older_than(
        &self,
        retention_days: u32,
        now: DateTime<Utc>,
    ) -> Result<usize, AuditError> {
        if retention_days > MAX_RETENTION_DAYS {
            return Err(invalid_input(format!(
                "retention_days must be at most {}",
                MAX_RETENTION_DAYS
            )));
        }

        let before = now - Duration::days(i64::from(retention_days));
        let purged = self
            .repo
            .purge_before(before)
            .map_err(AuditError::CollaboratorFailure)?;

        info!(purged, %before, "Purged hourly event counts");
        Ok(purged)
    }
}
