use std::time::Duration;

use crate::error::ConfigError;

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default backoff unit; the n-th retry waits `n * base`.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

/// Verb used in error messages when a call does not name one.
pub const DEFAULT_ACTION: &str = "update";

/// Coordinator-wide retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Retries allowed after the first attempt (default: `2`).
    pub max_retries: u32,
    /// Linear backoff unit in milliseconds (default: `1000`).
    pub backoff_base_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `MUTATION_MAX_RETRIES`     | `2`     |
    /// | `MUTATION_BACKOFF_BASE_MS` | `1000`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_retries: u32 = match lookup("MUTATION_MAX_RETRIES") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "MUTATION_MAX_RETRIES",
                expected: "u32",
                value: raw,
            })?,
            None => defaults.max_retries,
        };

        let backoff_base_ms: u64 = match lookup("MUTATION_BACKOFF_BASE_MS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "MUTATION_BACKOFF_BASE_MS",
                expected: "u64",
                value: raw,
            })?,
            None => defaults.backoff_base_ms,
        };

        Ok(Self {
            max_retries,
            backoff_base_ms,
        })
    }
}

/// Per-call overrides for [`MutationCoordinator::mutate`].
///
/// [`MutationCoordinator::mutate`]: crate::MutationCoordinator::mutate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOptions {
    /// Human-readable name used in the composed error message. Defaults to
    /// the entity id.
    pub label: Option<String>,
    /// Verb for the error message, e.g. `"create"`. Defaults to `"update"`.
    pub action: Option<String>,
    pub max_retries: Option<u32>,
    pub backoff_base_ms: Option<u64>,
}

impl MutationOptions {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub(crate) fn label_or<'a>(&'a self, id: &'a str) -> &'a str {
        self.label.as_deref().unwrap_or(id)
    }

    pub(crate) fn action_or_default(&self) -> &str {
        self.action.as_deref().unwrap_or(DEFAULT_ACTION)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = Some(backoff_base_ms);
        self
    }
}

/// Retry policy after applying per-call overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    pub fn resolve(config: &CoordinatorConfig, options: &MutationOptions) -> Self {
        Self {
            max_retries: options.max_retries.unwrap_or(config.max_retries),
            backoff_base_ms: options.backoff_base_ms.unwrap_or(config.backoff_base_ms),
        }
    }

    /// Wait before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(u64::from(retry)))
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
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CoordinatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.backoff_base_ms, 1000);
    }

    #[test]
    fn reads_overrides() {
        let config = CoordinatorConfig::from_lookup(lookup(&[
            ("MUTATION_MAX_RETRIES", "5"),
            ("MUTATION_BACKOFF_BASE_MS", " 250 "),
        ]))
        .unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.backoff_base_ms, 250);
    }

    #[test]
    fn invalid_value_names_the_variable() {
        let err = CoordinatorConfig::from_lookup(lookup(&[("MUTATION_BACKOFF_BASE_MS", "-1")]))
            .unwrap_err();
        assert!(err.to_string().contains("MUTATION_BACKOFF_BASE_MS"));
    }

    #[test]
    fn options_override_config() {
        let config = CoordinatorConfig::default();
        let options = MutationOptions::labeled("Essay").with_max_retries(0);
        let policy = RetryPolicy::resolve(&config, &options);
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.backoff_base_ms, 1000);
    }

    #[test]
    fn label_and_action_fall_back() {
        let options = MutationOptions::default();
        assert_eq!(options.label_or("hw-1"), "hw-1");
        assert_eq!(options.action_or_default(), "update");

        let options = MutationOptions::labeled("Biology").with_action("create");
        assert_eq!(options.label_or("import:0"), "Biology");
        assert_eq!(options.action_or_default(), "create");
    }

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_base_ms: 1000,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff(3), Duration::from_millis(3000));
    }
}
