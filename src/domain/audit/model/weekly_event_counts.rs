use std::collections::BTreeMap;

use serde::Serialize;

/// Daily totals keyed by local calendar date (`YYYY-MM-DD`).
pub type DailyEventCounts = BTreeMap<String, u64>;

/// Daily event totals of one connection over a requested date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyEventCounts {
    connection_code: String,
    start_date: String,
    end_date: String,
    daily_event_counts: DailyEventCounts,
}

impl WeeklyEventCounts {
    pub fn new(
        connection_code: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        daily_event_counts: DailyEventCounts,
    ) -> Self {
        Self {
            connection_code: connection_code.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            daily_event_counts,
        }
    }

    pub fn connection_code(&self) -> &str {
        &self.connection_code
    }

    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    pub fn end_date(&self) -> &str {
        &self.end_date
    }

    pub fn daily_event_counts(&self) -> &DailyEventCounts {
        &self.daily_event_counts
    }

    /// Sum over all days, `None` when it does not fit in a `u64`.
    pub fn total(&self) -> Option<u64> {
        self.daily_event_counts
            .values()
            .try_fold(0u64, |acc, count| acc.checked_add(*count))
    }
}
