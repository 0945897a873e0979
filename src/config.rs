use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_TIME_URL: &str = "https://worldtimeapi.org/api/timezone/Etc/UTC";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const TIME_URL_VAR: &str = "AGECALC_TIME_URL";
const TIMEOUT_VAR: &str = "AGECALC_TIMEOUT_SECS";

/// Runtime settings for acquiring the reference instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Time service endpoint; `None` reads the local clock only.
    pub time_url: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_url: Some(DEFAULT_TIME_URL.to_string()),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("agecalc/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `AGECALC_TIME_URL` and `AGECALC_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(TIME_URL_VAR) {
            let url = url.trim();
            config.time_url = (!url.is_empty()).then(|| url.to_string());
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().with_context(|| {
                format!("{TIMEOUT_VAR} must be a whole number of seconds, got {raw:?}")
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
