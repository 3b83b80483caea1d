use std::{env, time::Duration};

use url::Url;

use crate::{
    backend_readiness::ReadinessSettings, APP_URL_ENV, DEFAULT_APP_URL,
    DEFAULT_READY_POLL_INTERVAL_MS, DEFAULT_READY_PROBE_TIMEOUT_MS, DEFAULT_READY_TIMEOUT,
    DISABLE_GPU_ENV, OPEN_AT_LOGIN_ENV, READY_POLL_INTERVAL_ENV, READY_POLL_INTERVAL_MAX_MS,
    READY_POLL_INTERVAL_MIN_MS, READY_PROBE_TIMEOUT_ENV, READY_PROBE_TIMEOUT_MAX_MS,
    READY_PROBE_TIMEOUT_MIN_MS, READY_TIMEOUT_ENV,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KioskConfig {
    pub(crate) app_url: String,
    pub(crate) readiness: ReadinessSettings,
    pub(crate) open_at_login: bool,
    pub(crate) disable_gpu: bool,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl KioskConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_ms = parse_clamped_ms(
            lookup(READY_POLL_INTERVAL_ENV).as_deref(),
            DEFAULT_READY_POLL_INTERVAL_MS,
            READY_POLL_INTERVAL_MIN_MS,
            READY_POLL_INTERVAL_MAX_MS,
        );
        let probe_timeout_ms = parse_clamped_ms(
            lookup(READY_PROBE_TIMEOUT_ENV).as_deref(),
            DEFAULT_READY_PROBE_TIMEOUT_MS,
            READY_PROBE_TIMEOUT_MIN_MS,
            READY_PROBE_TIMEOUT_MAX_MS,
        )
        .min(interval_ms.max(READY_PROBE_TIMEOUT_MIN_MS));

        Self {
            app_url: normalize_app_url(lookup(APP_URL_ENV).as_deref().unwrap_or_default()),
            readiness: ReadinessSettings {
                timeout: parse_timeout(lookup(READY_TIMEOUT_ENV).as_deref()),
                interval: Duration::from_millis(interval_ms),
                probe_timeout: Duration::from_millis(probe_timeout_ms),
            },
            open_at_login: parse_flag(lookup(OPEN_AT_LOGIN_ENV).as_deref(), true),
            disable_gpu: parse_flag(lookup(DISABLE_GPU_ENV).as_deref(), true),
        }
    }
}

/// Unparseable values are kept verbatim so the permission gate can refuse them
/// instead of silently pointing the kiosk at the default origin.
pub(crate) fn normalize_app_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_APP_URL.to_string();
    }

    match Url::parse(trimmed) {
        Ok(mut parsed) => {
            if parsed.path().is_empty() {
                parsed.set_path("/");
            }
            parsed.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

fn parse_timeout(raw: Option<&str>) -> Duration {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_READY_TIMEOUT)
}

fn parse_clamped_ms(raw: Option<&str>, default_ms: u64, min_ms: u64, max_ms: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default_ms)
        .clamp(min_ms, max_ms)
}

fn parse_flag(raw: Option<&str>, default_value: bool) -> bool {
    let Some(raw) = raw else {
        return default_value;
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default_value,
    }
}
