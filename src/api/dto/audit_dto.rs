//! Audit API DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::audit::model::event_type::EventType;
use crate::domain::audit::query::count_daily_events_by_connection::CountDailyEventsByConnectionQuery;

#[derive(Deserialize, Debug, Validate)]
pub struct DailyEventsQuery {
    pub event_type: EventType,
    #[validate(length(equal = 10))]
    pub start_date: String,
    #[validate(length(equal = 10))]
    pub end_date: String,
    #[validate(length(min = 1, max = 64))]
    pub timezone: String,
}

impl From<DailyEventsQuery> for CountDailyEventsByConnectionQuery {
    fn from(q: DailyEventsQuery) -> Self {
        CountDailyEventsByConnectionQuery::new(q.event_type, q.start_date, q.end_date, q.timezone)
    }
}

#[derive(Serialize, Debug)]
pub struct InsertedResponse {
    pub inserted: usize,
}

#[derive(Serialize, Debug)]
pub struct PurgedResponse {
    pub purged: usize,
    pub retention_days: u32,
}
