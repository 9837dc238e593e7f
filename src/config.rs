//! Runtime configuration for the marketplace binary.
//!
//! Loaded from environment variables with defaults; a value that fails to
//! parse falls back to its default.

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Whether commands are counted in the prometheus registry
    pub metrics_enabled: bool,
    /// Name of the administrator who verifies listings in the demo run
    pub admin_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Include thread ids in log lines
    pub thread_ids: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                filter: "info".to_string(),
                thread_ids: true,
            },
            metrics_enabled: true,
            admin_name: "Administrator".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            logging: LoggingConfig {
                filter: lookup("MARKETPLACE_LOG_FILTER")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(defaults.logging.filter),
                thread_ids: lookup("MARKETPLACE_LOG_THREAD_IDS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.logging.thread_ids),
            },
            metrics_enabled: lookup("MARKETPLACE_METRICS_ENABLED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.metrics_enabled),
            admin_name: lookup("MARKETPLACE_ADMIN_NAME")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.admin_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.logging.filter, "info");
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("MARKETPLACE_LOG_FILTER", "ticket_marketplace=debug"),
            ("MARKETPLACE_LOG_THREAD_IDS", "false"),
            ("MARKETPLACE_METRICS_ENABLED", "false"),
            ("MARKETPLACE_ADMIN_NAME", "Moderator"),
        ]));

        assert_eq!(config.logging.filter, "ticket_marketplace=debug");
        assert!(!config.logging.thread_ids);
        assert!(!config.metrics_enabled);
        assert_eq!(config.admin_name, "Moderator");
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("MARKETPLACE_LOG_THREAD_IDS", "sometimes"),
            ("MARKETPLACE_METRICS_ENABLED", "1"),
            ("MARKETPLACE_ADMIN_NAME", "   "),
        ]));

        assert!(config.logging.thread_ids);
        assert!(config.metrics_enabled);
        assert_eq!(config.admin_name, "Administrator");
    }
}
