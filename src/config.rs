//! Runtime configuration read from the environment (and `.env` when present).

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::domain::audit::service::audit_service::MAX_RETENTION_DAYS;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub retention_days: u32,
    pub purge_interval: Duration,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            retention_days: 10,
            purge_interval: Duration::from_secs(3600),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let purge_interval_secs: u64 = parse_or(
            &lookup,
            "AUDIT_PURGE_INTERVAL_SECS",
            defaults.purge_interval.as_secs(),
        )?;
        if purge_interval_secs == 0 {
            bail!("AUDIT_PURGE_INTERVAL_SECS must be greater than zero");
        }

        let retention_days: u32 =
            parse_or(&lookup, "AUDIT_RETENTION_DAYS", defaults.retention_days)?;
        if retention_days > MAX_RETENTION_DAYS {
            bail!("AUDIT_RETENTION_DAYS must be at most {}", MAX_RETENTION_DAYS);
        }

        Ok(Self {
            data_dir: lookup("AUDIT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            bind_addr: parse_or(&lookup, "AUDIT_BIND_ADDR", defaults.bind_addr)?,
            retention_days,
            purge_interval: Duration::from_secs(purge_interval_secs),
            log_dir: lookup("AUDIT_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value {:?} for {}", raw, key)),
        None => Ok(default),
    }
}
