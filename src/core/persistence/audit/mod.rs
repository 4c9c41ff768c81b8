//! Hourly audit event counts on the local filesystem

pub mod audit_event_count_fs_adapter;
pub mod audit_event_count_repository;
pub mod audit_event_count_repository_traits;
pub mod path;
