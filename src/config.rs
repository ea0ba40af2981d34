// config.rs
use std::{env, fmt::Display, str::FromStr, time::Duration};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::{auth::AdminCredentials, window::VoteWindow};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub window: VoteWindow,
    pub admin: AdminCredentials,
    pub port: u16,
    pub pg_max_conns: u32,
    pub pg_min_conns: u32,
    pub redeem_timeout: Duration,
    pub run_migrations: bool,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;

        // RFC 3339, e.g. 2025-09-01T08:00:00+07:00
        let start = instant(&lookup, "VOTE_START")?;
        let end = instant(&lookup, "VOTE_END")?;
        let window = VoteWindow::new(start, end);
        if window.is_empty() {
            warn!("VOTE_START is not before VOTE_END, voting will never open");
        }

        let admin = AdminCredentials::new(
            lookup("ADMIN_USER").unwrap_or_default(),
            lookup("ADMIN_PASS").unwrap_or_default(),
        );
        if !admin.is_configured() {
            warn!("ADMIN_USER or ADMIN_PASS not set, admin view is disabled");
        }

        let redeem_timeout_ms: u64 = parse_or(&lookup, "REDEEM_TIMEOUT_MS", 5000)?;

        Ok(Self {
            database_url,
            window,
            admin,
            port: parse_or(&lookup, "PORT", 8080)?,
            pg_max_conns: parse_or(&lookup, "PG_MAX_CONNS", 20)?,
            pg_min_conns: parse_or(&lookup, "PG_MIN_CONNS", 1)?,
            redeem_timeout: Duration::from_millis(redeem_timeout_ms),
            run_migrations: lookup("RUN_MIGRATIONS").is_some_and(|v| v.trim() == "1"),
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn instant<F>(lookup: &F, key: &'static str) -> Result<DateTime<Utc>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = required(lookup, key)?;

    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
