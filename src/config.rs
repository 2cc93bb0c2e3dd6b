//! Runtime configuration from the process environment.

use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::infra::cards_api::{DEFAULT_BASE_URL, DEFAULT_TTL};

pub const ENV_API_URL: &str = "CARD_SCANNER_API_URL";
pub const ENV_CACHE_TTL_SECS: &str = "CARD_SCANNER_CACHE_TTL_SECS";
pub const ENV_LOG: &str = "CARD_SCANNER_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub cache_ttl: Duration,
    pub log_filter: String,
}

/// A setting that was present but unusable, so the default applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigIssue {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConfigIssue {
    /// Report through the installed subscriber.
    pub fn log(&self) {
        warn!(key = self.key, value = %self.value, reason = %self.reason, "invalid setting, using default");
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}: {}", self.key, self.value, self.reason)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: DEFAULT_TTL,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Read the process environment. The caller logs the issues once tracing
    /// is installed.
    pub fn from_env() -> (Self, Vec<ConfigIssue>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Bad values fall back to defaults and are
    /// reported in the returned issue list.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigIssue>) {
        let defaults = Self::default();
        let mut issues = Vec::new();

        let api_url = lookup(ENV_API_URL)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_url);

        let cache_ttl = match lookup(ENV_CACHE_TTL_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(err) => {
                    issues.push(ConfigIssue {
                        key: ENV_CACHE_TTL_SECS,
                        value: raw,
                        reason: err.to_string(),
                    });
                    defaults.cache_ttl
                }
            },
            None => defaults.cache_ttl,
        };

        let log_filter = lookup(ENV_LOG)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        let config = Self {
            api_url,
            cache_ttl,
            log_filter,
        };
        (config, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let (config, issues) = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert!(issues.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let (config, issues) = AppConfig::from_lookup(lookup(&[
            (ENV_API_URL, " https://cards.example/ "),
            (ENV_CACHE_TTL_SECS, "120"),
            (ENV_LOG, "debug"),
        ]));
        assert_eq!(config.api_url, "https://cards.example/");
        assert_eq!(config.cache_ttl, Duration::from_secs(120));
        assert_eq!(config.log_filter, "debug");
        assert!(issues.is_empty());
    }

    #[test]
    fn bad_ttl_falls_back_and_is_reported() {
        let (config, issues) = AppConfig::from_lookup(lookup(&[(ENV_CACHE_TTL_SECS, "soon")]));
        assert_eq!(config.cache_ttl, DEFAULT_TTL);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, ENV_CACHE_TTL_SECS);
        assert_eq!(issues[0].value, "soon");
        assert!(issues[0].to_string().starts_with("CARD_SCANNER_CACHE_TTL_SECS=\"soon\""));
    }
}
