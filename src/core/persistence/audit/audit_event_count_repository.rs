use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error};

use super::audit_event_count_fs_adapter::{first_of_month, AuditEventCountFsAdapter};
use super::audit_event_count_repository_traits::{
    BulkInsertEventCountsQuery, ConnectionHourlyEvents, PurgeEventCountsQuery,
    SelectConnectionsEventCountByDayQuery,
};
use crate::domain::audit::model::event_type::EventType;
use crate::domain::audit::model::hourly_event_count::HourlyEventCount;

type MonthKey = (EventType, String, NaiveDate);

pub struct AuditEventCountRepository {
    adapter: AuditEventCountFsAdapter,
    write_lock: Mutex<()>,
}

impl AuditEventCountRepository {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            adapter: AuditEventCountFsAdapter::new(base_dir),
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow!("audit store write lock poisoned"))
    }
}

impl SelectConnectionsEventCountByDayQuery for AuditEventCountRepository {
    fn execute(
        &self,
        event_type: EventType,
        from: DateTime<Utc>,
        up_to: DateTime<Utc>,
    ) -> Result<Vec<ConnectionHourlyEvents>> {
        let codes = self.adapter.connection_codes(event_type).map_err(|err| {
            error!(error = %err, %event_type, "Failed to list audited connections");
            err
        })?;

        codes
            .into_iter()
            .map(|code| -> Result<ConnectionHourlyEvents> {
                let hourly_events = self
                    .adapter
                    .get_row_between(event_type, &code, from, up_to)
                    .map_err(|err| {
                        error!(error = %err, %event_type, connection_code = %code, "Failed to read hourly event counts");
                        err
                    })?;
                Ok(ConnectionHourlyEvents::new(code, hourly_events))
            })
            .collect()
    }
}

impl BulkInsertEventCountsQuery for AuditEventCountRepository {
    fn bulk_insert(&self, rows: &[HourlyEventCount]) -> Result<()> {
        let mut by_month: BTreeMap<MonthKey, Vec<(DateTime<Utc>, u64)>> = BTreeMap::new();
        for row in rows {
            let hour = row.hourly_interval().from();
            by_month
                .entry((
                    row.event_type(),
                    row.connection_code().to_string(),
                    first_of_month(hour.date_naive()),
                ))
                .or_default()
                .push((hour, row.event_count()));
        }

        let _guard = self.lock()?;
        for ((event_type, code, month), month_rows) in &by_month {
            self.adapter
                .upsert_month(*event_type, code, *month, month_rows)
                .map_err(|err| {
                    error!(error = %err, %event_type, connection_code = %code, "Failed to write hourly event counts");
                    err
                })?;
        }

        debug!(rows = rows.len(), files = by_month.len(), "Upserted hourly event counts");
        Ok(())
    }
}

impl PurgeEventCountsQuery for AuditEventCountRepository {
    fn purge_before(&self, before: DateTime<Utc>) -> Result<usize> {
        let _guard = self.lock()?;
        self.adapter.cleanup_old(before).map_err(|err| {
            error!(error = %err, %before, "Failed to purge hourly event counts");
            err
        })
    }
}
