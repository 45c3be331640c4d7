//! Configuration for the async patterns
//!
//! - `PatternsConfig` holds the simulated latencies, retry budget and default
//!   deadline shared by every pattern
//! - `ConfigBuilder` trait for consistent configuration APIs
//! - `EnvOverrides` reads typed, range-checked `{PREFIX}{FIELD}` overrides
//!
//! # Example
//!
//! ```rust,ignore
//! use async_patterns::config::{ConfigBuilder, PatternsConfig};
//!
//! // ASYNC_PATTERNS_LOOKUP_LATENCY_MS=20 ASYNC_PATTERNS_MAX_ATTEMPTS=5
//! let config = PatternsConfig::from_env_with_defaults("ASYNC_PATTERNS_")?;
//! let policy = config.retry_policy();
//! ```

mod builder;
mod env;

pub use builder::ConfigBuilder;
pub use env::{EnvOverrides, MAX_LATENCY, MAX_TIMEOUT};

use crate::async_utils::retry::RetryPolicy;
use crate::logging::millis;
use crate::{PatternError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment prefix used by the CLI
pub const ENV_PREFIX: &str = "ASYNC_PATTERNS_";

/// Settings shared by all patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Simulated latency of a single user lookup
    pub lookup_latency_ms: u64,
    /// Simulated latency of acquiring and of releasing a scoped resource
    pub resource_latency_ms: u64,
    /// Delay before the first retry; later retries double it
    pub retry_base_delay_ms: u64,
    /// Attempt budget for the retry wrapper (including the first attempt)
    pub max_attempts: usize,
    /// Randomize retry delays
    pub retry_jitter: bool,
    /// Deadline applied by the CLI's timeout demo
    pub default_timeout_ms: u64,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            lookup_latency_ms: 100,
            resource_latency_ms: 50,
            retry_base_delay_ms: 100,
            max_attempts: 3,
            retry_jitter: false,
            default_timeout_ms: 1000,
            log_filter: "info".to_string(),
        }
    }
}

impl PatternsConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the simulated lookup latency
    pub fn with_lookup_latency(mut self, latency: Duration) -> Self {
        self.lookup_latency_ms = millis(latency);
        self
    }

    /// Set the simulated resource acquire/release latency
    pub fn with_resource_latency(mut self, latency: Duration) -> Self {
        self.resource_latency_ms = millis(latency);
        self
    }

    /// Set the delay before the first retry
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay_ms = millis(delay);
        self
    }

    /// Set the deadline used by the timeout demo
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = millis(timeout);
        self
    }

    /// Set the retry budget
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn lookup_latency(&self) -> Duration {
        Duration::from_millis(self.lookup_latency_ms)
    }

    pub fn resource_latency(&self) -> Duration {
        Duration::from_millis(self.resource_latency_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Build the retry policy described by this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.retry_base_delay_ms))
            .with_jitter(self.retry_jitter)
    }
}

impl ConfigBuilder for PatternsConfig {
    fn validate(&self) -> Result<()> {
        let latencies = [
            ("lookup_latency_ms", self.lookup_latency_ms),
            ("resource_latency_ms", self.resource_latency_ms),
            ("retry_base_delay_ms", self.retry_base_delay_ms),
        ];
        for (field, value_ms) in latencies {
            if Duration::from_millis(value_ms) > MAX_LATENCY {
                return Err(PatternError::Config(format!(
                    "{} must be at most {}ms, got {}",
                    field,
                    MAX_LATENCY.as_millis(),
                    value_ms
                )));
            }
        }
        if Duration::from_millis(self.default_timeout_ms) > MAX_TIMEOUT {
            return Err(PatternError::Config(format!(
                "default_timeout_ms must be at most {}ms, got {}",
                MAX_TIMEOUT.as_millis(),
                self.default_timeout_ms
            )));
        }
        if self.max_attempts == 0 {
            return Err(PatternError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.default_timeout_ms == 0 {
            return Err(PatternError::Config(
                "default_timeout_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    fn from_env(prefix: &str) -> Result<Self> {
        let overrides = EnvOverrides::new(prefix);
        let mut config = Self::default();

        if let Some(latency) = overrides.millis("lookup_latency_ms", MAX_LATENCY)? {
            config = config.with_lookup_latency(latency);
        }
        if let Some(latency) = overrides.millis("resource_latency_ms", MAX_LATENCY)? {
            config = config.with_resource_latency(latency);
        }
        if let Some(delay) = overrides.millis("retry_base_delay_ms", MAX_LATENCY)? {
            config = config.with_retry_base_delay(delay);
        }
        if let Some(timeout) = overrides.millis("default_timeout_ms", MAX_TIMEOUT)? {
            config = config.with_default_timeout(timeout);
        }
        if let Some(max_attempts) = overrides.count("max_attempts")? {
            config = config.with_max_attempts(max_attempts);
        }
        if let Some(jitter) = overrides.flag("retry_jitter")? {
            config.retry_jitter = jitter;
        }
        if let Some(filter) = overrides.text("log_filter")? {
            config.log_filter = filter;
        }

        Ok(config)
    }

    fn merge(&mut self, other: Self) -> &mut Self {
        let defaults = Self::default();

        if other.lookup_latency_ms != defaults.lookup_latency_ms {
            self.lookup_latency_ms = other.lookup_latency_ms;
        }
        if other.resource_latency_ms != defaults.resource_latency_ms {
            self.resource_latency_ms = other.resource_latency_ms;
        }
        if other.retry_base_delay_ms != defaults.retry_base_delay_ms {
            self.retry_base_delay_ms = other.retry_base_delay_ms;
        }
        if other.max_attempts != defaults.max_attempts {
            self.max_attempts = other.max_attempts;
        }
        if other.retry_jitter != defaults.retry_jitter {
            self.retry_jitter = other.retry_jitter;
        }
        if other.default_timeout_ms != defaults.default_timeout_ms {
            self.default_timeout_ms = other.default_timeout_ms;
        }
        if other.log_filter != defaults.log_filter {
            self.log_filter = other.log_filter;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PatternsConfig::default();
        assert_eq!(config.lookup_latency(), Duration::from_millis(100));
        assert_eq!(config.max_attempts, 3);
        assert!(!config.retry_jitter);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PatternsConfig::new()
            .with_lookup_latency(Duration::from_millis(20))
            .with_resource_latency(Duration::from_millis(5))
            .with_max_attempts(5);

        assert_eq!(config.lookup_latency_ms, 20);
        assert_eq!(config.resource_latency(), Duration::from_millis(5));
        assert_eq!(config.retry_policy().max_attempts, 5);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = PatternsConfig::new().with_max_attempts(0);
        assert!(matches!(config.validate(), Err(PatternError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = PatternsConfig {
            default_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = PatternsConfig {
            retry_base_delay_ms: 250,
            ..Default::default()
        };

        let policy = config.retry_policy();
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
    }

    #[test]
    fn test_deserialize_partial_json_uses_defaults() {
        let config: PatternsConfig =
            serde_json::from_str(r#"{ "lookup_latency_ms": 10, "retry_jitter": true }"#).unwrap();

        assert_eq!(config.lookup_latency_ms, 10);
        assert!(config.retry_jitter);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_from_env_with_defaults() {
        std::env::set_var("CFG_TEST_A_LOOKUP_LATENCY_MS", "15");
        std::env::set_var("CFG_TEST_A_RETRY_JITTER", "yes");

        let config = PatternsConfig::from_env_with_defaults("CFG_TEST_A_").unwrap();
        assert_eq!(config.lookup_latency_ms, 15);
        assert!(config.retry_jitter);
        assert_eq!(config.resource_latency_ms, 50);

        std::env::remove_var("CFG_TEST_A_LOOKUP_LATENCY_MS");
        std::env::remove_var("CFG_TEST_A_RETRY_JITTER");
    }

    #[test]
    fn test_from_env_rejects_out_of_range_latency() {
        std::env::set_var("CFG_TEST_C_LOOKUP_LATENCY_MS", "90000");

        let result = PatternsConfig::from_env_with_defaults("CFG_TEST_C_");
        assert!(
            matches!(result, Err(PatternError::Config(ref m)) if m.starts_with("CFG_TEST_C_LOOKUP"))
        );

        std::env::remove_var("CFG_TEST_C_LOOKUP_LATENCY_MS");
    }

    #[test]
    fn test_validate_rejects_deserialized_latency_over_limit() {
        let config: PatternsConfig =
            serde_json::from_str(r#"{ "resource_latency_ms": 120000 }"#).unwrap();

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            PatternError::Config(
                "resource_latency_ms must be at most 60000ms, got 120000".to_string()
            )
        );
    }

    #[test]
    fn test_oversized_durations_saturate() {
        let config = PatternsConfig::new().with_default_timeout(Duration::MAX);

        assert_eq!(config.default_timeout_ms, u64::MAX);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_with_defaults_validates() {
        std::env::set_var("CFG_TEST_B_MAX_ATTEMPTS", "0");

        let result = PatternsConfig::from_env_with_defaults("CFG_TEST_B_");
        assert!(matches!(result, Err(PatternError::Config(_))));

        std::env::remove_var("CFG_TEST_B_MAX_ATTEMPTS");
    }
}
