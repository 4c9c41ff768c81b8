use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::domain::audit::model::event_type::EventType;
use crate::domain::audit::model::hourly_event_count::HourlyEventCount;

/// Hourly counts of one connection, ordered by hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHourlyEvents {
    pub connection_code: String,
    pub hourly_events: Vec<(DateTime<Utc>, u64)>,
}

impl ConnectionHourlyEvents {
    pub fn new(connection_code: impl Into<String>, hourly_events: Vec<(DateTime<Utc>, u64)>) -> Self {
        Self {
            connection_code: connection_code.into(),
            hourly_events,
        }
    }
}

/// Read side used by the daily aggregation.
///
/// Returns every known connection for `event_type` with its hour-aligned
/// counts in `[from, up_to)`. A connection without events in the window is
/// still listed, with an empty vector.
pub trait SelectConnectionsEventCountByDayQuery {
    fn execute(
        &self,
        event_type: EventType,
        from: DateTime<Utc>,
        up_to: DateTime<Utc>,
    ) -> Result<Vec<ConnectionHourlyEvents>>;
}

/// Write side: upsert keyed by (event type, connection, hour).
pub trait BulkInsertEventCountsQuery {
    fn bulk_insert(&self, rows: &[HourlyEventCount]) -> Result<()>;
}

/// Retention: drop every hourly row strictly before `before`.
pub trait PurgeEventCountsQuery {
    fn purge_before(&self, before: DateTime<Utc>) -> Result<usize>;
}

impl<T: SelectConnectionsEventCountByDayQuery + ?Sized> SelectConnectionsEventCountByDayQuery for &T {
    fn execute(
        &self,
        event_type: EventType,
        from: DateTime<Utc>,
        up_to: DateTime<Utc>,
    ) -> Result<Vec<ConnectionHourlyEvents>> {
        (**self).execute(event_type, from, up_to)
    }
}

impl<T: SelectConnectionsEventCountByDayQuery + ?Sized> SelectConnectionsEventCountByDayQuery for Arc<T> {
    fn execute(
        &self,
        event_type: EventType,
        from: DateTime<Utc>,
        up_to: DateTime<Utc>,
    ) -> Result<Vec<ConnectionHourlyEvents>> {
        (**self).execute(event_type, from, up_to)
    }
}
