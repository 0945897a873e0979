use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;

/// Reads the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The local system clock, read as UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstantSource {
    Network,
    LocalClock,
}

/// The reference "now", acquired once and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquiredInstant {
    pub instant: DateTime<Utc>,
    pub source: InstantSource,
}

#[derive(Deserialize)]
struct UtcTimeResponse {
    utc_datetime: String,
}

pub struct TimeSource<C = SystemClock> {
    http: Client,
    url: Option<String>,
    clock: C,
}

impl TimeSource<SystemClock> {
    /// Build a time source backed by the system clock.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            url: config.time_url.clone(),
            clock: SystemClock,
        })
    }
}

impl<C: Clock> TimeSource<C> {
    /// Replace the fallback clock.
    pub fn with_clock<D: Clock>(self, clock: D) -> TimeSource<D> {
        TimeSource {
            http: self.http,
            url: self.url,
            clock,
        }
    }

    /// Query the time service once, falling back to the clock on any failure.
    pub async fn acquire(&self) -> AcquiredInstant {
        let Some(url) = self.url.as_deref() else {
            return self.local();
        };

        match self.fetch_utc(url).await {
            Ok(instant) => {
                debug!(%instant, url, "Using network UTC time");
                AcquiredInstant {
                    instant,
                    source: InstantSource::Network,
                }
            }
            Err(e) => {
                warn!(url, "Time service unavailable, using local clock: {e:#}");
                self.local()
            }
        }
    }

    fn local(&self) -> AcquiredInstant {
        AcquiredInstant {
            instant: self.clock.now(),
            source: InstantSource::LocalClock,
        }
    }

    async fn fetch_utc(&self, url: &str) -> Result<DateTime<Utc>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error querying time service: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Time service returned HTTP {}",
                status.as_u16()
            ));
        }

        let body: UtcTimeResponse = resp
            .json()
            .await
            .context("Failed to deserialize time service response")?;

        parse_utc_datetime(&body.utc_datetime)
    }
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_utc_datetime(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .with_context(|| format!("Invalid utc_datetime {raw:?}"))?;
    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_service_timestamp() {
        let got = parse_utc_datetime("2024-03-01T12:34:56.123456+00:00").unwrap();
        assert_eq!(
            got.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-03-01 12:34:56"
        );
    }

    #[test]
    fn normalizes_offsets_to_utc() {
        let got = parse_utc_datetime("2024-03-01T01:00:00+02:00").unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_utc_datetime("yesterday").is_err());
        assert!(parse_utc_datetime("").is_err());
    }

    #[tokio::test]
    async fn offline_reads_the_clock() {
        let fixed = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let config = Config {
            time_url: None,
            ..Config::default()
        };
        let source = TimeSource::new(&config).unwrap().with_clock(FixedClock(fixed));

        let got = source.acquire().await;
        assert_eq!(
            got,
            AcquiredInstant {
                instant: fixed,
                source: InstantSource::LocalClock,
            }
        );
    }
}
