pub mod audit_purge_request;
pub mod hourly_event_count_insert_request;
