use chrono::{DateTime, FixedOffset, SecondsFormat};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::audit::error::{invalid_input, AuditError};
use crate::domain::audit::model::event_type::EventType;
use crate::domain::audit::model::hourly_event_count::{HourlyEventCount, CONNECTION_CODE_MAX_LEN};
use crate::domain::audit::model::hourly_interval::HourlyInterval;

const CONNECTION_CODE_MAX_CHARS: u64 = CONNECTION_CODE_MAX_LEN as u64;

/// Upper bound for one hour; keeps a day of 25 hours well inside `u64`.
pub const MAX_HOURLY_EVENT_COUNT: u64 = u32::MAX as u64;

/// One hourly count pushed by an event producer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HourlyEventCountInsertRequest {
    #[validate(length(min = 1, max = CONNECTION_CODE_MAX_CHARS))]
    pub connection_code: String,

    pub event_type: EventType,

    /// Any instant inside the hour, RFC 3339 with a `Z` or `+00:00` offset.
    pub hour: DateTime<FixedOffset>,

    #[validate(range(max = MAX_HOURLY_EVENT_COUNT))]
    pub event_count: u64,
}

impl HourlyEventCountInsertRequest {
    pub fn into_hourly_event_count(self) -> Result<HourlyEventCount, AuditError> {
        if self.hour.offset().local_minus_utc() != 0 {
            return Err(invalid_input(format!(
                "hour \"{}\" should be expressed in UTC",
                self.hour.to_rfc3339_opts(SecondsFormat::Secs, true)
            )));
        }

        let interval = HourlyInterval::create_from_instant(self.hour.with_timezone(&Tz::UTC))?;
        HourlyEventCount::new(self.connection_code, interval, self.event_count, self.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    fn request(hour: &str) -> HourlyEventCountInsertRequest {
        serde_json::from_value(json!({
            "connection_code": "erp",
            "event_type": "product_updated",
            "hour": hour,
            "event_count": 12
        }))
        .unwrap()
    }

    #[test]
    fn normalizes_the_hour() {
        let count = request("2020-01-01T10:42:00Z").into_hourly_event_count().unwrap();
        assert_eq!(count.hourly_interval().from().to_rfc3339(), "2020-01-01T10:00:00+00:00");
        assert_eq!(count.event_type(), EventType::ProductUpdated);
        assert_eq!(count.event_count(), 12);
    }

    #[test]
    fn rejects_offsets_other_than_utc() {
        let err = request("2020-01-01T10:42:00+02:00")
            .into_hourly_event_count()
            .unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput(_)));
    }

    #[test]
    fn empty_connection_code_fails_validation() {
        let mut req = request("2020-01-01T10:00:00Z");
        req.connection_code.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn connection_code_length_is_bounded() {
        let mut req = request("2020-01-01T10:00:00Z");
        req.connection_code = "a".repeat(CONNECTION_CODE_MAX_LEN);
        assert!(req.validate().is_ok());

        req.connection_code.push('a');
        assert!(req.validate().is_err());
    }

    #[test]
    fn event_count_is_capped() {
        let mut req = request("2020-01-01T10:00:00Z");
        req.event_count = MAX_HOURLY_EVENT_COUNT;
        assert!(req.validate().is_ok());

        req.event_count = u64::MAX;
        assert!(req.validate().is_err());
    }
}
