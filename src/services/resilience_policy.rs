use std::collections::HashMap;
use std::time::Duration;

use crate::domain::{
    errors::{ConfigIssue, ConfigurationError},
    models::ResilienceSettings,
};

/// One optional configuration key: where to read it, how to parse it, and its default
struct Setting<T> {
    key: &'static str,
    default: T,
    parse: fn(&str) -> Option<T>,
    expected: &'static str,
}

impl<T: Copy> Setting<T> {
    /// Absent or empty keys take the default; unparsable values are recorded as issues
    fn resolve(&self, config: &HashMap<String, String>, issues: &mut Vec<ConfigIssue>) -> T {
        let Some(raw) = config.get(self.key).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            return self.default;
        };

        match (self.parse)(raw) {
            Some(value) => value,
            None => {
                issues.push(ConfigIssue::invalid(self.key, raw, self.expected));
                self.default
            }
        }
    }
}

pub const DRY_RUN_KEY: &str = "dry_run";
pub const THREADS_KEY: &str = "threads";
pub const DIAL_TIMEOUT_KEY: &str = "dial_timeout";
pub const REQUEST_TIMEOUT_KEY: &str = "request_timeout";
pub const RETRIES_KEY: &str = "retries";

const DRY_RUN: Setting<bool> = Setting {
    key: DRY_RUN_KEY,
    default: false,
    parse: parse_bool,
    expected: "boolean",
};

const THREADS: Setting<usize> = Setting {
    key: THREADS_KEY,
    default: ResilienceSettings::DEFAULT_THREADS,
    parse: parse_count,
    expected: "non-negative integer",
};

const DIAL_TIMEOUT: Setting<Duration> = Setting {
    key: DIAL_TIMEOUT_KEY,
    default: ResilienceSettings::DEFAULT_DIAL_TIMEOUT,
    parse: parse_seconds,
    expected: "whole number of seconds",
};

const REQUEST_TIMEOUT: Setting<Duration> = Setting {
    key: REQUEST_TIMEOUT_KEY,
    default: ResilienceSettings::DEFAULT_REQUEST_TIMEOUT,
    parse: parse_seconds,
    expected: "whole number of seconds",
};

const RETRIES: Setting<u32> = Setting {
    key: RETRIES_KEY,
    default: ResilienceSettings::DEFAULT_RETRIES,
    parse: parse_count,
    expected: "non-negative integer",
};

/// Resolve all transport settings at once.
///
/// Either every present key parses or the whole resolution fails with one
/// error naming each bad key.
pub fn resolve_settings(
    config: &HashMap<String, String>,
) -> Result<ResilienceSettings, ConfigurationError> {
    let mut issues = Vec::new();

    let settings = ResilienceSettings {
        dry_run: DRY_RUN.resolve(config, &mut issues),
        threads: THREADS.resolve(config, &mut issues),
        dial_timeout: DIAL_TIMEOUT.resolve(config, &mut issues),
        request_timeout: REQUEST_TIMEOUT.resolve(config, &mut issues),
        retries: RETRIES.resolve(config, &mut issues),
    };

    if issues.is_empty() {
        Ok(settings)
    } else {
        Err(ConfigurationError::new(issues))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_count<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

/// Zero is accepted and disables the timeout
fn parse_seconds(raw: &str) -> Option<Duration> {
    raw.parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_keys_absent() {
        let settings = resolve_settings(&HashMap::new()).unwrap();

        assert!(!settings.dry_run);
        assert_eq!(settings.threads, 3);
        assert_eq!(settings.dial_timeout, Duration::from_secs(30));
        assert_eq!(settings.request_timeout, Duration::from_secs(600));
        assert_eq!(settings.retries, 3);
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let settings = resolve_settings(&config(&[("threads", ""), ("dry_run", " ")])).unwrap();
        assert_eq!(settings, ResilienceSettings::default());
    }

    #[test]
    fn test_explicit_values() {
        let settings = resolve_settings(&config(&[
            ("dry_run", "true"),
            ("threads", "8"),
            ("dial_timeout", "5"),
            ("request_timeout", "120"),
            ("retries", "0"),
        ]))
        .unwrap();

        assert!(settings.dry_run);
        assert_eq!(settings.threads, 8);
        assert_eq!(settings.dial_timeout, Duration::from_secs(5));
        assert_eq!(settings.request_timeout, Duration::from_secs(120));
        assert_eq!(settings.retries, 0);
    }

    #[test]
    fn test_unparsable_threads_fails() {
        let err = resolve_settings(&config(&[("threads", "abc")])).unwrap_err();
        assert!(err.mentions("threads"));
    }

    #[test]
    fn test_every_bad_key_is_reported() {
        let err = resolve_settings(&config(&[
            ("dry_run", "maybe"),
            ("threads", "-2"),
            ("dial_timeout", "-1"),
            ("request_timeout", "10m"),
            ("retries", "many"),
        ]))
        .unwrap_err();

        assert_eq!(err.issues().len(), 5);
        for key in ["dry_run", "threads", "dial_timeout", "request_timeout", "retries"] {
            assert!(err.mentions(key), "{} should be reported", key);
        }
    }

    #[test]
    fn test_zero_is_a_valid_value() {
        let settings = resolve_settings(&config(&[
            ("threads", "0"),
            ("dial_timeout", "0"),
            ("request_timeout", "0"),
        ]))
        .unwrap();

        assert_eq!(settings.threads, 0);
        assert_eq!(settings.effective_threads(), 1);
        assert_eq!(settings.dial_timeout, Duration::ZERO);
        assert_eq!(settings.connect_timeout(), None);
        assert_eq!(settings.overall_timeout(), None);
    }

    #[test]
    fn test_bool_spellings() {
        for raw in ["1", "t", "TRUE", "True"] {
            assert_eq!(parse_bool(raw), Some(true));
        }
        for raw in ["0", "f", "FALSE", "false"] {
            assert_eq!(parse_bool(raw), Some(false));
        }
        assert_eq!(parse_bool("yes"), None);
    }
}
