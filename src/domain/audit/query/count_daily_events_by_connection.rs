//! Hourly → daily event rollup per connection, in the requester's timezone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::core::persistence::audit::audit_event_count_repository_traits::SelectConnectionsEventCountByDayQuery;
use crate::domain::audit::error::{invalid_input, AuditError};
use crate::domain::audit::model::event_type::EventType;
use crate::domain::audit::model::weekly_event_counts::{DailyEventCounts, WeeklyEventCounts};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Deserialize)]
pub struct CountDailyEventsByConnectionQuery {
    pub event_type: EventType,
    pub start_date: String,
    pub end_date: String,
    pub timezone: String,
}

impl CountDailyEventsByConnectionQuery {
    pub fn new(
        event_type: EventType,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            start_date: start_date.into(),
            end_date: end_date.into(),
            timezone: timezone.into(),
        }
    }
}

pub struct CountDailyEventsByConnectionHandler<R> {
    select_event_counts: R,
}

impl<R: SelectConnectionsEventCountByDayQuery> CountDailyEventsByConnectionHandler<R> {
    pub fn new(select_event_counts: R) -> Self {
        Self { select_event_counts }
    }

    pub fn handle(
        &self,
        query: &CountDailyEventsByConnectionQuery,
    ) -> Result<Vec<WeeklyEventCounts>, AuditError> {
        let timezone = parse_timezone(&query.timezone)?;
        let (from, up_to) = utc_interval(&query.start_date, &query.end_date, timezone)?;

        let hourly_events_per_connection = self
            .select_event_counts
            .execute(query.event_type, from, up_to)
            .map_err(AuditError::CollaboratorFailure)?;

        hourly_events_per_connection
            .into_iter()
            .map(|connection| -> Result<WeeklyEventCounts, AuditError> {
                let daily = group_by_local_day(&connection.hourly_events, timezone)?;
                Ok(WeeklyEventCounts::new(
                    connection.connection_code,
                    query.start_date.clone(),
                    query.end_date.clone(),
                    daily,
                ))
            })
            .collect()
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, AuditError> {
    name.parse::<Tz>()
        .map_err(|_| invalid_input(format!("unknown timezone \"{}\"", name)))
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AuditError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        invalid_input(format!("{} \"{}\" is not a YYYY-MM-DD date", field, value))
    })
}

/// UTC instants bounding every local hour of `[start_date, end_date]`.
pub fn utc_interval(
    start_date: &str,
    end_date: &str,
    timezone: Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AuditError> {
    let start = parse_date(start_date, "start_date")?;
    let end = parse_date(end_date, "end_date")?;
    if start > end {
        return Err(invalid_input(format!(
            "start_date {} is after end_date {}",
            start_date, end_date
        )));
    }

    let day_after_end = end
        .succ_opt()
        .ok_or_else(|| invalid_input(format!("end_date {} is out of range", end_date)))?;

    Ok((
        local_midnight_in_utc(start, timezone)?,
        local_midnight_in_utc(day_after_end, timezone)?,
    ))
}

/// Start of `date` in `timezone`. Ambiguous midnights take the earliest
/// mapping; a midnight swallowed by a DST gap moves to the end of the gap.
fn local_midnight_in_utc(date: NaiveDate, timezone: Tz) -> Result<DateTime<Utc>, AuditError> {
    let midnight: NaiveDateTime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| invalid_input(format!("{} has no midnight", date)))?;

    if let Some(t) = resolve_local(midnight, timezone) {
        return Ok(t);
    }
    let no_valid_time =
        || invalid_input(format!("{} has no valid local time in {}", date, timezone.name()));

    // First valid minute after the gap, then back off to the exact second.
    let first_valid_minute = (1..=24 * 60)
        .map(|minute| midnight + Duration::minutes(minute))
        .find(|local| resolve_local(*local, timezone).is_some())
        .ok_or_else(no_valid_time)?;

    (0..60)
        .rev()
        .find_map(|second| resolve_local(first_valid_minute - Duration::seconds(second), timezone))
        .ok_or_else(no_valid_time)
}

fn resolve_local(local: NaiveDateTime, timezone: Tz) -> Option<DateTime<Utc>> {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

fn group_by_local_day(
    hourly_events: &[(DateTime<Utc>, u64)],
    timezone: Tz,
) -> Result<DailyEventCounts, AuditError> {
    hourly_events
        .iter()
        .try_fold(DailyEventCounts::new(), |mut daily, (hour, count)| {
            let local_date = hour.with_timezone(&timezone).format(DATE_FORMAT).to_string();
            let total = daily.entry(local_date).or_insert(0);
            *total = total.checked_add(*count).ok_or_else(|| {
                invalid_input(format!("daily event count overflows at {}", hour))
            })?;
            Ok(daily)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persistence::audit::audit_event_count_repository_traits::ConnectionHourlyEvents;
    use anyhow::anyhow;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubSelectQuery {
        response: Vec<ConnectionHourlyEvents>,
        fail_with: Option<String>,
        calls: Mutex<Vec<(EventType, DateTime<Utc>, DateTime<Utc>)>>,
    }

    impl StubSelectQuery {
        fn returning(response: Vec<ConnectionHourlyEvents>) -> Self {
            Self {
                response,
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl SelectConnectionsEventCountByDayQuery for StubSelectQuery {
        fn execute(
            &self,
            event_type: EventType,
            from: DateTime<Utc>,
            up_to: DateTime<Utc>,
        ) -> anyhow::Result<Vec<ConnectionHourlyEvents>> {
            self.calls.lock().unwrap().push((event_type, from, up_to));
            match &self.fail_with {
                Some(msg) => Err(anyhow!(msg.clone())),
                None => Ok(self.response.clone()),
            }
        }
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn query(start: &str, end: &str, tz: &str) -> CountDailyEventsByConnectionQuery {
        CountDailyEventsByConnectionQuery::new(EventType::ProductCreated, start, end, tz)
    }

    #[test]
    fn paris_winter_day_maps_to_utc_window() {
        let (from, up_to) = utc_interval("2020-01-01", "2020-01-01", Tz::Europe__Paris).unwrap();
        assert_eq!(from, utc("2019-12-31T23:00:00Z"));
        assert_eq!(up_to, utc("2020-01-01T23:00:00Z"));
    }

    #[test]
    fn window_follows_dst_switch() {
        // Paris springs forward on 2020-03-29: that local day lasts 23 hours.
        let (from, up_to) = utc_interval("2020-03-29", "2020-03-29", Tz::Europe__Paris).unwrap();
        assert_eq!(from, utc("2020-03-28T23:00:00Z"));
        assert_eq!(up_to, utc("2020-03-29T22:00:00Z"));
    }

    #[test]
    fn missing_local_midnight_moves_to_end_of_gap() {
        // Sao Paulo skipped 2018-11-04 00:00 → 01:00 local.
        let (from, _) =
            utc_interval("2018-11-04", "2018-11-04", Tz::America__Sao_Paulo).unwrap();
        assert_eq!(from, utc("2018-11-04T03:00:00Z"));
    }

    #[test]
    fn repeated_local_midnight_takes_the_earliest_mapping() {
        // Havana falls back on 2020-11-01 at 01:00 CDT, so 00:00 happens twice.
        let (from, up_to) = utc_interval("2020-11-01", "2020-11-01", Tz::America__Havana).unwrap();
        assert_eq!(from, utc("2020-11-01T04:00:00Z"));
        assert_eq!(up_to, utc("2020-11-02T05:00:00Z"));
    }

    #[test]
    fn gap_end_is_found_to_the_second() {
        // Abidjan left LMT (-0:16:08) for GMT at local midnight on 1912-01-01.
        let (from, _) = utc_interval("1912-01-01", "1912-01-01", Tz::Africa__Abidjan).unwrap();
        assert_eq!(from, utc("1912-01-01T00:16:08Z"));
    }

    #[test]
    fn handler_passes_window_and_event_type_to_the_query() {
        let stub = StubSelectQuery::default();
        let handler = CountDailyEventsByConnectionHandler::new(&stub);

        handler
            .handle(&query("2020-01-01", "2020-01-07", "Europe/Paris"))
            .unwrap();

        let calls = stub.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[(
                EventType::ProductCreated,
                utc("2019-12-31T23:00:00Z"),
                utc("2020-01-07T23:00:00Z")
            )]
        );
    }

    #[test]
    fn hours_are_bucketed_into_the_local_day() {
        let stub = StubSelectQuery::returning(vec![ConnectionHourlyEvents::new(
            "erp",
            vec![(utc("2020-01-01T23:00:00Z"), 3), (utc("2020-01-02T00:00:00Z"), 5)],
        )]);
        let handler = CountDailyEventsByConnectionHandler::new(&stub);

        let result = handler
            .handle(&query("2020-01-02", "2020-01-02", "Europe/Paris"))
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].connection_code(), "erp");
        assert_eq!(result[0].start_date(), "2020-01-02");
        assert_eq!(result[0].end_date(), "2020-01-02");
        let expected: DailyEventCounts = [("2020-01-02".to_string(), 8)].into_iter().collect();
        assert_eq!(result[0].daily_event_counts(), &expected);
    }

    #[test]
    fn zero_days_are_absent_and_empty_connections_are_kept() {
        let stub = StubSelectQuery::returning(vec![
            ConnectionHourlyEvents::new(
                "erp",
                vec![(utc("2020-01-01T10:00:00Z"), 1), (utc("2020-01-03T10:00:00Z"), 2)],
            ),
            ConnectionHourlyEvents::new("dam", vec![]),
        ]);
        let handler = CountDailyEventsByConnectionHandler::new(&stub);

        let result = handler.handle(&query("2020-01-01", "2020-01-03", "UTC")).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].connection_code(), "erp");
        assert_eq!(result[0].daily_event_counts().len(), 2);
        assert!(!result[0].daily_event_counts().contains_key("2020-01-02"));
        assert_eq!(result[1].connection_code(), "dam");
        assert!(result[1].daily_event_counts().is_empty());
    }

    #[test]
    fn rebucketing_keeps_every_count() {
        let hourly: Vec<(DateTime<Utc>, u64)> = (0..72)
            .map(|h| (utc("2020-01-05T05:00:00Z") + Duration::hours(h), (h as u64 * 7) % 13))
            .collect();
        let expected_total: u64 = hourly.iter().map(|(_, c)| c).sum();
        let stub = StubSelectQuery::returning(vec![ConnectionHourlyEvents::new("erp", hourly)]);
        let handler = CountDailyEventsByConnectionHandler::new(&stub);

        let result = handler
            .handle(&query("2020-01-05", "2020-01-07", "America/New_York"))
            .unwrap();

        assert_eq!(result[0].total(), Some(expected_total));
        assert_eq!(
            result[0].daily_event_counts().keys().collect::<Vec<_>>(),
            vec!["2020-01-05", "2020-01-06", "2020-01-07"]
        );
    }

    #[test]
    fn daily_total_overflow_is_rejected() {
        let stub = StubSelectQuery::returning(vec![ConnectionHourlyEvents::new(
            "erp",
            vec![(utc("2020-01-01T10:00:00Z"), u64::MAX), (utc("2020-01-01T11:00:00Z"), 1)],
        )]);
        let handler = CountDailyEventsByConnectionHandler::new(&stub);

        let err = handler
            .handle(&query("2020-01-01", "2020-01-01", "UTC"))
            .unwrap_err();

        assert!(matches!(err, AuditError::InvalidInput(_)));
    }

    #[test]
    fn unknown_timezone_fails_before_querying() {
        let stub = StubSelectQuery::default();
        let handler = CountDailyEventsByConnectionHandler::new(&stub);

        let err = handler
            .handle(&query("2020-01-01", "2020-01-01", "Not/AZone"))
            .unwrap_err();

        assert!(matches!(err, AuditError::InvalidInput(_)));
        assert_eq!(stub.call_count(), 0);
    }

    #[test]
    fn malformed_or_reversed_dates_fail_before_querying() {
        let stub = StubSelectQuery::default();
        let handler = CountDailyEventsByConnectionHandler::new(&stub);

        for (start, end) in [
            ("2020-13-01", "2020-12-01"),
            ("01/01/2020", "2020-01-02"),
            ("2020-01-01", "tomorrow"),
            ("2020-01-05", "2020-01-01"),
        ] {
            let err = handler.handle(&query(start, end, "UTC")).unwrap_err();
            assert!(matches!(err, AuditError::InvalidInput(_)), "{start} / {end}");
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[test]
    fn collaborator_errors_propagate_unchanged() {
        let stub = StubSelectQuery {
            fail_with: Some("storage offline".into()),
            ..Default::default()
        };
        let handler = CountDailyEventsByConnectionHandler::new(&stub);

        let err = handler
            .handle(&query("2020-01-01", "2020-01-01", "UTC"))
            .unwrap_err();

        assert!(matches!(err, AuditError::CollaboratorFailure(_)));
        assert_eq!(err.to_string(), "storage offline");
        assert_eq!(stub.call_count(), 1);
    }
}
