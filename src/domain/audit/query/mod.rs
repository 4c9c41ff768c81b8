pub mod count_daily_events_by_connection;
