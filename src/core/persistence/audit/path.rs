use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::audit::model::event_type::EventType;

pub const AUDIT_DIR: &str = "audit";
pub const AUDIT_FILE_EXT: &str = "rdb";

/// `{base}/audit`
pub fn audit_root_dir_path(base_dir: &Path) -> PathBuf {
    base_dir.join(AUDIT_DIR)
}

/// `{base}/audit/{event_type}`
pub fn audit_event_type_dir_path(base_dir: &Path, event_type: EventType) -> PathBuf {
    audit_root_dir_path(base_dir).join(event_type.as_str())
}

/// `{base}/audit/{event_type}/{connection_code}`
pub fn audit_connection_dir_path(base_dir: &Path, event_type: EventType, connection_code: &str) -> PathBuf {
    audit_event_type_dir_path(base_dir, event_type).join(connection_code)
}

/// `{base}/audit/{event_type}/{connection_code}/{YYYY-MM}.rdb`
pub fn audit_month_file_path(
    base_dir: &Path,
    event_type: EventType,
    connection_code: &str,
    month: NaiveDate,
) -> PathBuf {
    audit_connection_dir_path(base_dir, event_type, connection_code)
        .join(format!("{}.{}", month_key(month), AUDIT_FILE_EXT))
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Inverse of [`month_key`] on a file stem; returns the first day of the month.
pub fn parse_month_key(stem: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", stem), "%Y-%m-%d").ok()
}
