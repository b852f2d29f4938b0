//! Environment-driven daemon configuration.
//!
//! Missing required values or unparseable numbers abort startup; there is no
//! partial configuration.

use anyhow::{Context, bail};
use std::env;
use std::time::Duration;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the `SQLite` database file.
    pub database_path: String,
    /// Cadence of the scheduled scan.
    pub scan_interval: Duration,
    /// Deadline for one account's candidate fetch.
    pub fetch_timeout: Duration,
    /// Candidate messages fetched per account per cycle.
    pub page_size: u32,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `SPENDMAIL_DATABASE` is required; the rest default to 60 s interval,
    /// 10 s fetch timeout, and a page size of
    /// [`spendmail_gmail::DEFAULT_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_path =
            env::var("SPENDMAIL_DATABASE").context("SPENDMAIL_DATABASE must be set")?;

        let scan_interval = parse_secs(
            "SPENDMAIL_SCAN_INTERVAL_SECS",
            env::var("SPENDMAIL_SCAN_INTERVAL_SECS").ok(),
            60,
        )?;
        let fetch_timeout = parse_secs(
            "SPENDMAIL_FETCH_TIMEOUT_SECS",
            env::var("SPENDMAIL_FETCH_TIMEOUT_SECS").ok(),
            10,
        )?;
        let page_size = parse_page_size(env::var("SPENDMAIL_PAGE_SIZE").ok())?;

        Ok(Self {
            database_path,
            scan_interval,
            fetch_timeout,
            page_size,
        })
    }
}

/// Parse an optional seconds value, falling back to a default. Zero is
/// rejected: a zero-period scheduler tick is never meaningful.
fn parse_secs(name: &str, raw: Option<String>, default_secs: u64) -> anyhow::Result<Duration> {
    let secs = match raw {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{name} must be an integer number of seconds, got {raw:?}"))?,
        None => default_secs,
    };
    if secs == 0 {
        bail!("{name} must be at least 1 second");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_page_size(raw: Option<String>) -> anyhow::Result<u32> {
    let size = match raw {
        Some(raw) => raw.parse::<u32>().with_context(|| {
            format!("SPENDMAIL_PAGE_SIZE must be a positive integer, got {raw:?}")
        })?,
        None => spendmail_gmail::DEFAULT_PAGE_SIZE,
    };
    if size == 0 {
        bail!("SPENDMAIL_PAGE_SIZE must be at least 1");
    }
    Ok(size)
}
