//! Authoritative time sources.
//!
//! A [`TimeSource`] answers a single request with a [`TimePayload`]. The
//! payload carries the instant as epoch milliseconds in `unix`; `iso` and
//! `timezoneOffset` are informational and the sync engine ignores them.
//!
//! # Wire format
//!
//! ```json
//! { "iso": "2024-03-05T13:07:09.000Z", "unix": 1709644029000, "timezoneOffset": 0 }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Instant;

/// Response body of the time source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePayload {
    /// ISO-8601 rendering of the instant.
    #[serde(default)]
    pub iso: Option<String>,
    /// Milliseconds since the Unix epoch. The only field the clock relies on.
    pub unix: i64,
    /// Minutes to add to local time to reach UTC, as reported by the server.
    #[serde(default)]
    pub timezone_offset: Option<i32>,
}

impl TimePayload {
    /// Build a payload for the given instant.
    #[must_use]
    pub fn for_instant(instant: Instant, timezone_offset: i32) -> Self {
        Self {
            iso: instant
                .to_utc()
                .map(|utc| utc.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            unix: instant.epoch_millis(),
            timezone_offset: Some(timezone_offset),
        }
    }

    /// Extract the authoritative instant.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidPayload` if `unix` cannot be represented as
    /// a calendar date.
    pub fn instant(&self) -> Result<Instant, SyncError> {
        let instant = Instant::from_epoch_millis(self.unix);
        if instant.to_utc().is_none() {
            return Err(SyncError::InvalidPayload(format!(
                "unix timestamp {} is out of range",
                self.unix
            )));
        }
        Ok(instant)
    }
}

/// A request/response source of authoritative time.
///
/// Implementations must not fall back to the local system clock: a failed
/// request is reported as an error and the caller stays unsynchronized.
pub trait TimeSource {
    /// Fetch the current authoritative time.
    fn fetch(&self) -> impl Future<Output = Result<TimePayload, SyncError>> + Send;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<TimePayload, SyncError>> + Send {
        (**self).fetch()
    }
}

/// Error returned when the time source cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The request failed or the source answered with a non-success status.
    Unavailable(String),
    /// The request did not complete within the fetch timeout.
    Timeout(Duration),
    /// The response body was not a usable time payload.
    InvalidPayload(String),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "time source unavailable: {reason}"),
            Self::Timeout(after) => {
                write!(f, "time source timed out after {}ms", after.as_millis())
            }
            Self::InvalidPayload(reason) => write!(f, "invalid time payload: {reason}"),
        }
    }
}

impl std::error::Error for SyncError {}

/// Time source that queries an HTTP endpoint such as `/api/ntp`.
#[derive(Debug, Clone)]
pub struct HttpTimeSource {
    client: reqwest::Client,
    url: String,
}

impl HttpTimeSource {
    /// Create a source for the given endpoint URL.
    ///
    /// System proxy settings are ignored; the endpoint is expected to be
    /// reachable directly.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    /// The endpoint this source queries.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self) -> Result<TimePayload, SyncError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SyncError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Unavailable(format!(
                "{} answered {status}",
                self.url
            )));
        }

        let payload = response
            .json::<TimePayload>()
            .await
            .map_err(|e| SyncError::InvalidPayload(e.to_string()))?;
        payload.instant()?;
        Ok(payload)
    }
}

impl TimeSource for HttpTimeSource {
    fn fetch(&self) -> impl Future<Output = Result<TimePayload, SyncError>> + Send {
        self.request()
    }
}
