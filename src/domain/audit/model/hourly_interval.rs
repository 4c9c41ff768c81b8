use std::hash::{Hash, Hasher};

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::audit::error::{invalid_input, AuditError};

/// One-hour UTC bucket. A time between 10:00:00 and 10:59:59 belongs to
/// the interval 10:00:00 → 11:00:00.
///
/// Equality only looks at the upper bound: two intervals ending on the same
/// hour compare equal whatever their lower bound.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HourlyInterval {
    from: DateTime<Utc>,
    up_to: DateTime<Utc>,
}

impl HourlyInterval {
    /// Builds the interval containing `instant`, which must carry the UTC zone.
    pub fn create_from_instant(instant: DateTime<Tz>) -> Result<Self, AuditError> {
        let tz = instant.timezone();
        if !matches!(tz, Tz::UTC | Tz::Etc__UTC) {
            return Err(invalid_input(format!(
                "instant \"{}\" with timezone \"{}\" should have the timezone \"UTC\"",
                instant.to_rfc3339_opts(SecondsFormat::Secs, false),
                tz.name()
            )));
        }

        Self::from_utc(instant.with_timezone(&Utc))
    }

    pub fn from_utc(instant: DateTime<Utc>) -> Result<Self, AuditError> {
        let top_of_hour = NaiveTime::from_hms_opt(instant.hour(), 0, 0)
            .ok_or_else(|| invalid_input(format!("cannot truncate {} to its hour", instant)))?;
        let from = instant.date_naive().and_time(top_of_hour).and_utc();
        let up_to = from
            .checked_add_signed(Duration::hours(1))
            .ok_or_else(|| invalid_input(format!("{} is out of the supported range", instant)))?;

        Ok(Self { from, up_to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn up_to(&self) -> DateTime<Utc> {
        self.up_to
    }

    pub fn equals(first: &HourlyInterval, second: &HourlyInterval) -> bool {
        first.up_to == second.up_to
    }
}

impl PartialEq for HourlyInterval {
    fn eq(&self, other: &Self) -> bool {
        Self::equals(self, other)
    }
}

impl Eq for HourlyInterval {}

impl Hash for HourlyInterval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.up_to.hash(state);
    }
}
