//! Audit value types and read models

pub mod event_type;
pub mod hourly_event_count;
pub mod hourly_interval;
pub mod weekly_event_counts;
