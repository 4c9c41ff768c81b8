use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Months, NaiveDate, SecondsFormat, Utc};
use tracing::{debug, warn};

use super::path::{
    audit_connection_dir_path, audit_event_type_dir_path, audit_month_file_path, parse_month_key,
    AUDIT_FILE_EXT,
};
use crate::domain::audit::model::event_type::EventType;

/// Hourly rows of one month file, keyed by hour.
pub type HourRows = BTreeMap<DateTime<Utc>, u64>;

/// Filesystem layout for hourly audit counts.
///
/// One directory per event type and connection, one file per month, one
/// `TIME|COUNT` line per hour.
#[derive(Debug, Clone)]
pub struct AuditEventCountFsAdapter {
    base_dir: PathBuf,
}

impl AuditEventCountFsAdapter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Connection codes with a directory under `event_type`, sorted.
    pub fn connection_codes(&self, event_type: EventType) -> Result<Vec<String>> {
        let dir = audit_event_type_dir_path(&self.base_dir, event_type);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut codes = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("reading {:?}", dir))? {
            let entry = entry?;
            if entry.path().is_dir() {
                if let Some(code) = entry.file_name().to_str() {
                    codes.push(code.to_string());
                }
            }
        }
        codes.sort();
        Ok(codes)
    }

    /// Rows with `from <= hour < up_to`, ordered by hour.
    pub fn get_row_between(
        &self,
        event_type: EventType,
        connection_code: &str,
        from: DateTime<Utc>,
        up_to: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, u64)>> {
        if from >= up_to {
            return Ok(Vec::new());
        }

        let mut rows = HourRows::new();
        let mut month = first_of_month(from.date_naive());
        let last_month = first_of_month(up_to.date_naive());

        while month <= last_month {
            let path = audit_month_file_path(&self.base_dir, event_type, connection_code, month);
            rows.extend(
                Self::read_file(&path)?
                    .into_iter()
                    .filter(|(hour, _)| *hour >= from && *hour < up_to),
            );

            month = match month.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(rows.into_iter().collect())
    }

    /// Replaces or adds `rows` in the month file of `month`.
    pub fn upsert_month(
        &self,
        event_type: EventType,
        connection_code: &str,
        month: NaiveDate,
        rows: &[(DateTime<Utc>, u64)],
    ) -> Result<()> {
        let path = audit_month_file_path(&self.base_dir, event_type, connection_code, month);
        let mut stored = Self::read_file(&path)?;
        stored.extend(rows.iter().copied());
        Self::write_file(&path, &stored)
    }

    /// Drops rows strictly before `before` in every file, returns how many went.
    pub fn cleanup_old(&self, before: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;

        for event_type in EventType::ALL {
            for code in self.connection_codes(event_type)? {
                let dir = audit_connection_dir_path(&self.base_dir, event_type, &code);
                for path in Self::month_files(&dir)? {
                    removed += Self::cleanup_file(&path, before)?;
                }
            }
        }

        Ok(removed)
    }

    fn cleanup_file(path: &Path, before: DateTime<Utc>) -> Result<usize> {
        let rows = Self::read_file(path)?;
        let kept: HourRows = rows
            .iter()
            .filter(|(hour, _)| **hour >= before)
            .map(|(hour, count)| (*hour, *count))
            .collect();
        let removed = rows.len() - kept.len();

        if kept.is_empty() {
            fs::remove_file(path).with_context(|| format!("removing {:?}", path))?;
            debug!("Deleted purged audit file {:?}", path);
        } else if removed > 0 {
            Self::write_file(path, &kept)?;
        }

        Ok(removed)
    }

    /// `{YYYY-MM}.rdb` files of a connection directory, sorted.
    fn month_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("reading {:?}", dir))? {
            let path = entry?.path();
            let is_month_file = path.extension().and_then(|e| e.to_str()) == Some(AUDIT_FILE_EXT)
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(parse_month_key)
                    .is_some();
            if is_month_file {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_file(path: &Path) -> Result<HourRows> {
        if !path.exists() {
            return Ok(HourRows::new());
        }

        let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
        let mut rows = HourRows::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match Self::parse_line(&line) {
                Some((hour, count)) => {
                    rows.insert(hour, count);
                }
                None => warn!("Skipping malformed audit row {:?} in {:?}", line, path),
            }
        }
        Ok(rows)
    }

    fn write_file(path: &Path, rows: &HourRows) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension(format!("{}.tmp", AUDIT_FILE_EXT));
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            for (hour, count) in rows {
                writeln!(
                    writer,
                    "{}|{}",
                    hour.to_rfc3339_opts(SecondsFormat::Secs, true),
                    count
                )?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path).with_context(|| format!("replacing {:?}", path))?;
        Ok(())
    }

    // TIME|COUNT
    fn parse_line(line: &str) -> Option<(DateTime<Utc>, u64)> {
        let (time, count) = line.split_once('|')?;
        Some((time.parse().ok()?, count.trim().parse().ok()?))
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
