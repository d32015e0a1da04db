//! Dashboard configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::state::list::FetchOrdering;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: '{value}' is not a number of seconds")]
    InvalidSeconds { key: &'static str, value: String },

    #[error("unknown DASHBOARD_LIST_ORDERING: '{0}' (expected 'last_resolved' or 'latest_request')")]
    UnknownOrdering(String),

    #[error("DASHBOARD_API_BASE must not be empty")]
    EmptyApiBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub api_base: String,
    pub timeouts: Timeouts,
    pub ordering: FetchOrdering,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { api_base: DEFAULT_API_BASE.to_owned(), timeouts: Timeouts::default(), ordering: FetchOrdering::default() }
    }
}

impl DashboardConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `DASHBOARD_API_BASE`: backend base URL, default `http://localhost:8000`
    /// - `DASHBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `DASHBOARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `DASHBOARD_LIST_ORDERING`: `last_resolved` (default) or `latest_request`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DashboardConfig::from_env`] over an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any value is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = match lookup("DASHBOARD_API_BASE") {
            Some(raw) => {
                let trimmed = raw.trim().trim_end_matches('/');
                if trimmed.is_empty() {
                    return Err(ConfigError::EmptyApiBase);
                }
                trimmed.to_owned()
            }
            None => DEFAULT_API_BASE.to_owned(),
        };

        let timeouts = Timeouts {
            request_secs: parse_secs(&lookup, "DASHBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, "DASHBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        let ordering = parse_ordering(lookup("DASHBOARD_LIST_ORDERING").as_deref())?;

        Ok(Self { api_base, timeouts, ordering })
    }
}

fn parse_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSeconds { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_ordering(raw: Option<&str>) -> Result<FetchOrdering, ConfigError> {
    match raw.map(str::trim).unwrap_or("last_resolved") {
        "last_resolved" => Ok(FetchOrdering::LastResolvedWins),
        "latest_request" => Ok(FetchOrdering::LatestRequestWins),
        other => Err(ConfigError::UnknownOrdering(other.to_owned())),
    }
}
