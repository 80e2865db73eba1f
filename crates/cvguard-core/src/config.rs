//! Configuration module
//!
//! Settings come from the environment. A malformed or out-of-range value never
//! aborts startup: it is logged and replaced by a safe default.

use std::env;
use std::time::Duration;

use crate::constants::{
    CLAMAV_DEFAULT_HOST, CLAMAV_DEFAULT_PORT, CLAMAV_DEFAULT_TIMEOUT_MS, CLAMAV_MAX_TIMEOUT_MS,
    CLAMAV_MIN_TIMEOUT_MS, ZIP_BOMB_MAX_RATIO,
};

/// External anti-virus scanner settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvScanConfig {
    pub enabled: bool,
    /// Reject uploads when the scanner cannot answer.
    pub fail_closed: bool,
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for AvScanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fail_closed: true,
            host: CLAMAV_DEFAULT_HOST.to_string(),
            port: CLAMAV_DEFAULT_PORT,
            timeout_ms: CLAMAV_DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AvScanConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = match lookup("CLAMAV_HOST") {
            Some(h) if !h.trim().is_empty() => h.trim().to_string(),
            Some(_) => {
                tracing::warn!("CLAMAV_HOST is blank, using default");
                defaults.host
            }
            None => defaults.host,
        };

        Self {
            enabled: parse_bool(&lookup, "CLAMAV_ENABLED", defaults.enabled),
            fail_closed: parse_bool(&lookup, "CLAMAV_FAIL_CLOSED", defaults.fail_closed),
            host,
            port: parse_bounded(&lookup, "CLAMAV_PORT", 1, u16::MAX as u64, defaults.port as u64)
                as u16,
            timeout_ms: parse_bounded(
                &lookup,
                "CLAMAV_TIMEOUT_MS",
                CLAMAV_MIN_TIMEOUT_MS,
                CLAMAV_MAX_TIMEOUT_MS,
                defaults.timeout_ms,
            ),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Upload pipeline settings.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadConfig {
    /// Require trailers, minimum sizes, and package markers beyond the magic header.
    pub strict_structure: bool,
    /// Sanity bound handed to the zip-bomb heuristic.
    pub zip_max_ratio: f64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            strict_structure: true,
            zip_max_ratio: ZIP_BOMB_MAX_RATIO,
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Parseable but unsafe ratios pass through; the zip-bomb detector
        // rejects every ZIP upload under them.
        let zip_max_ratio = match lookup("UPLOAD_ZIP_MAX_RATIO") {
            Some(raw) => raw.trim().parse::<f64>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid UPLOAD_ZIP_MAX_RATIO, using default");
                defaults.zip_max_ratio
            }),
            None => defaults.zip_max_ratio,
        };

        Self {
            strict_structure: parse_bool(
                &lookup,
                "UPLOAD_STRICT_VALIDATION",
                defaults.strict_structure,
            ),
            zip_max_ratio,
        }
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            tracing::warn!(key, value = %raw, default, "Invalid boolean, using default");
            default
        }
    }
}

fn parse_bounded<F>(lookup: &F, key: &str, min: u64, max: u64, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if (min..=max).contains(&v) => v,
        Ok(v) => {
            tracing::warn!(key, value = v, min, max, default, "Value out of range, using default");
            default
        }
        Err(_) => {
            tracing::warn!(key, value = %raw, default, "Invalid number, using default");
            default
        }
    }
}
