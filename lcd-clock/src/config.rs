//! Clock configuration module.
//!
//! This module provides configuration loading for the LCD clock from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `LCD_CLOCK_LISTEN_PORT`: Port the time source service listens on (default: `3000`)
//! - `LCD_CLOCK_SERVE`: Whether to host the time source in-process (default: `true`)
//! - `LCD_CLOCK_TIME_SOURCE_URL`: Endpoint to sync against
//!   (default: `http://127.0.0.1:{port}/api/ntp`)
//! - `LCD_CLOCK_FETCH_TIMEOUT_MS`: Upper bound on a single fetch (default: `5000`)
//! - `LCD_CLOCK_RESYNC_INTERVAL_SECS`: Seconds between re-syncs, or `never` (default: `never`)
//! - `LCD_CLOCK_UTC_OFFSET_MINUTES`: Offset of the displayed time from UTC (default: `0`)
//!
//! # Invariants
//!
//! - `fetch_timeout` is never zero
//! - `resync_interval`, when set, is never zero
//! - `utc_offset` is strictly within one day of UTC

use std::time::Duration;

use chrono::FixedOffset;

use crate::ntp::NTP_PATH;
use crate::sync::ClockTaskConfig;

/// Clock configuration.
///
/// Contains all configuration parameters needed to run the clock binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockConfig {
    /// Port to listen on for time source requests.
    pub listen_port: u16,
    /// Whether this process hosts the time source service.
    pub serve: bool,
    /// URL of the time source endpoint.
    pub time_source_url: String,
    /// Upper bound on a single fetch.
    pub fetch_timeout: Duration,
    /// Interval between re-syncs. `None` syncs once per session.
    pub resync_interval: Option<Duration>,
    /// Offset applied when formatting the displayed time.
    pub utc_offset: FixedOffset,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl ConfigError {
    fn invalid(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const LISTEN_PORT: &str = "LCD_CLOCK_LISTEN_PORT";
const SERVE: &str = "LCD_CLOCK_SERVE";
const TIME_SOURCE_URL: &str = "LCD_CLOCK_TIME_SOURCE_URL";
const FETCH_TIMEOUT_MS: &str = "LCD_CLOCK_FETCH_TIMEOUT_MS";
const RESYNC_INTERVAL_SECS: &str = "LCD_CLOCK_RESYNC_INTERVAL_SECS";
const UTC_OFFSET_MINUTES: &str = "LCD_CLOCK_UTC_OFFSET_MINUTES";

impl ClockConfig {
    /// Default port for the time source service.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default fetch timeout in milliseconds.
    pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listen_port = load_listen_port(&lookup)?;
        let serve = load_serve(&lookup)?;
        let time_source_url = load_time_source_url(&lookup, listen_port)?;
        let fetch_timeout = load_fetch_timeout(&lookup)?;
        let resync_interval = load_resync_interval(&lookup)?;
        let utc_offset = load_utc_offset(&lookup)?;

        Ok(Self {
            listen_port,
            serve,
            time_source_url,
            fetch_timeout,
            resync_interval,
            utc_offset,
        })
    }

    /// The scheduler settings derived from this configuration.
    #[must_use]
    pub const fn task_config(&self) -> ClockTaskConfig {
        ClockTaskConfig {
            fetch_timeout: self.fetch_timeout,
            resync_interval: self.resync_interval,
        }
    }
}

fn load_listen_port(lookup: &impl Fn(&str) -> Option<String>) -> Result<u16, ConfigError> {
    match lookup(LISTEN_PORT) {
        Some(value) => match value.parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(ConfigError::invalid(
                LISTEN_PORT,
                format!("'{value}' is not a valid port number (must be 1-65535)"),
            )),
        },
        None => Ok(ClockConfig::DEFAULT_PORT),
    }
}

fn load_serve(lookup: &impl Fn(&str) -> Option<String>) -> Result<bool, ConfigError> {
    match lookup(SERVE).as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ConfigError::invalid(
            SERVE,
            format!("'{other}' is not a boolean (expected true or false)"),
        )),
    }
}

fn load_time_source_url(
    lookup: &impl Fn(&str) -> Option<String>,
    listen_port: u16,
) -> Result<String, ConfigError> {
    match lookup(TIME_SOURCE_URL) {
        Some(url) if url.trim().is_empty() => {
            Err(ConfigError::invalid(TIME_SOURCE_URL, "must not be empty"))
        }
        Some(url) => Ok(url),
        None => Ok(format!("http://127.0.0.1:{listen_port}{NTP_PATH}")),
    }
}

fn load_fetch_timeout(lookup: &impl Fn(&str) -> Option<String>) -> Result<Duration, ConfigError> {
    let Some(value) = lookup(FETCH_TIMEOUT_MS) else {
        return Ok(Duration::from_millis(ClockConfig::DEFAULT_FETCH_TIMEOUT_MS));
    };
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::invalid(
            FETCH_TIMEOUT_MS,
            format!("'{value}' is not a positive number of milliseconds"),
        )),
    }
}

fn load_resync_interval(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = lookup(RESYNC_INTERVAL_SECS) else {
        return Ok(None);
    };
    if value.eq_ignore_ascii_case("never") {
        return Ok(None);
    }
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(ConfigError::invalid(
            RESYNC_INTERVAL_SECS,
            format!("'{value}' is not a positive number of seconds or 'never'"),
        )),
    }
}

fn load_utc_offset(lookup: &impl Fn(&str) -> Option<String>) -> Result<FixedOffset, ConfigError> {
    let value = lookup(UTC_OFFSET_MINUTES).unwrap_or_else(|| "0".to_string());
    value
        .parse::<i32>()
        .ok()
        .and_then(|minutes| minutes.checked_mul(60))
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            ConfigError::invalid(
                UTC_OFFSET_MINUTES,
                format!("'{value}' is not an offset in minutes between -1439 and 1439"),
            )
        })
}
