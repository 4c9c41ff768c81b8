use serde::Serialize;

use super::event_type::EventType;
use super::hourly_interval::HourlyInterval;
use crate::domain::audit::error::{invalid_input, AuditError};

pub const CONNECTION_CODE_MAX_LEN: usize = 100;

/// Number of events of one type a connection produced during one hour.
#[derive(Debug, Clone, Serialize)]
pub struct HourlyEventCount {
    connection_code: String,
    hourly_interval: HourlyInterval,
    event_count: u64,
    event_type: EventType,
}

impl HourlyEventCount {
    pub fn new(
        connection_code: impl Into<String>,
        hourly_interval: HourlyInterval,
        event_count: u64,
        event_type: EventType,
    ) -> Result<Self, AuditError> {
        let connection_code = connection_code.into();
        validate_connection_code(&connection_code)?;

        Ok(Self {
            connection_code,
            hourly_interval,
            event_count,
            event_type,
        })
    }

    pub fn connection_code(&self) -> &str {
        &self.connection_code
    }

    pub fn hourly_interval(&self) -> HourlyInterval {
        self.hourly_interval
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }
}

/// Connection codes end up as directory names, so only `[A-Za-z0-9_]` is allowed.
pub fn validate_connection_code(code: &str) -> Result<(), AuditError> {
    if code.is_empty() || code.len() > CONNECTION_CODE_MAX_LEN {
        return Err(invalid_input(format!(
            "connection code must be between 1 and {} characters",
            CONNECTION_CODE_MAX_LEN
        )));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid_input(format!(
            "connection code \"{}\" may only contain letters, digits and underscores",
            code
        )));
    }

    Ok(())
}
