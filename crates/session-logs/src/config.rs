// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Logger configuration read from `SESSION_LOGS_*` environment variables.
//!
//! | variable | default |
//! | --- | --- |
//! | `SESSION_LOGS_URL` | `http://localhost:8000/api/v1` |
//! | `SESSION_LOGS_FLUSH_INTERVAL_MS` | `5000` |
//! | `SESSION_LOGS_CAPACITY` | `1000` |
//! | `SESSION_LOGS_TIMEOUT_SECS` | `5` |
//! | `SESSION_LOGS_MIRROR_LEVEL` | `warn` (`off` disables mirroring) |
//! | `SESSION_LOGS_SESSION_PREFIX` | `frontend` |
//! | `SESSION_LOGS_COMPRESSION_LEVEL` | unset, bodies sent uncompressed |
//! | `SESSION_LOGS_PROXY_HTTPS` / `HTTPS_PROXY` | unset |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::constants;
use crate::entry::Level;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid URL '{value}': {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("{var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
    #[error("{var}: {reason}")]
    InvalidLevel { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Collector API prefix; batches go to `{base_url}/logs`.
    pub base_url: String,
    pub flush_interval: Duration,
    pub capacity: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Entries at or above this level are echoed through `tracing`. `None` disables.
    pub mirror_level: Option<Level>,
    pub session_prefix: String,
    /// zstd level applied to request bodies; `None` sends plain JSON.
    pub compression_level: Option<i32>,
    pub https_proxy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            flush_interval: constants::DEFAULT_FLUSH_INTERVAL,
            capacity: constants::DEFAULT_CAPACITY,
            timeout: constants::DEFAULT_TIMEOUT,
            mirror_level: Some(Level::Warn),
            session_prefix: constants::DEFAULT_SESSION_PREFIX.to_string(),
            compression_level: None,
            https_proxy: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable source. Unset or blank
    /// variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };
        let defaults = Config::default();

        let base_url = match get("SESSION_LOGS_URL") {
            Some(url) => parse_base_url("SESSION_LOGS_URL", &url)?,
            None => defaults.base_url,
        };

        let flush_interval = match get("SESSION_LOGS_FLUSH_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(parse_positive("SESSION_LOGS_FLUSH_INTERVAL_MS", &raw)?),
            None => defaults.flush_interval,
        };

        let capacity = match get("SESSION_LOGS_CAPACITY") {
            Some(raw) => usize::try_from(parse_positive("SESSION_LOGS_CAPACITY", &raw)?)
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "SESSION_LOGS_CAPACITY",
                    value: raw,
                })?,
            None => defaults.capacity,
        };

        let timeout = match get("SESSION_LOGS_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("SESSION_LOGS_TIMEOUT_SECS", &raw)?),
            None => defaults.timeout,
        };

        let mirror_level = match get("SESSION_LOGS_MIRROR_LEVEL") {
            Some(raw) if raw.eq_ignore_ascii_case("off") => None,
            Some(raw) => Some(Level::from_str(&raw).map_err(|reason| ConfigError::InvalidLevel {
                var: "SESSION_LOGS_MIRROR_LEVEL",
                reason,
            })?),
            None => defaults.mirror_level,
        };

        let compression_level = match get("SESSION_LOGS_COMPRESSION_LEVEL") {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| ConfigError::InvalidNumber {
                var: "SESSION_LOGS_COMPRESSION_LEVEL",
                value: raw,
            })?),
            None => None,
        };

        Ok(Config {
            base_url,
            flush_interval,
            capacity,
            timeout,
            mirror_level,
            session_prefix: get("SESSION_LOGS_SESSION_PREFIX").unwrap_or(defaults.session_prefix),
            compression_level,
            https_proxy: get("SESSION_LOGS_PROXY_HTTPS").or_else(|| get("HTTPS_PROXY")),
        })
    }

    #[must_use]
    pub fn logs_url(&self) -> String {
        format!("{}{}", self.base_url, constants::LOGS_PATH)
    }

    #[must_use]
    pub fn clear_logs_url(&self) -> String {
        format!("{}{}", self.base_url, constants::CLEAR_LOGS_PATH)
    }
}

fn parse_base_url(var: &'static str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            var,
            value: value.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::Zero { var }),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}
