//! Environment overrides for [`PatternsConfig`](super::PatternsConfig)
//!
//! Each setting is read from `{prefix}{FIELD}`, with the field name
//! uppercased. An unset variable keeps the default; a set but unusable one
//! is a [`PatternError::Config`] naming the variable and the bad value.

use crate::{PatternError, Result};
use std::env;
use std::time::Duration;

/// Upper bound for simulated latencies and retry delays
pub const MAX_LATENCY: Duration = Duration::from_secs(60);

/// Upper bound for the default deadline
pub const MAX_TIMEOUT: Duration = Duration::from_secs(600);

/// Reads configuration fields for one variable prefix
#[derive(Debug, Clone, Copy)]
pub struct EnvOverrides<'a> {
    prefix: &'a str,
}

impl<'a> EnvOverrides<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    /// Variable name for a field
    ///
    /// ```rust
    /// use async_patterns::config::EnvOverrides;
    ///
    /// let env = EnvOverrides::new("ASYNC_PATTERNS_");
    /// assert_eq!(env.key("max_attempts"), "ASYNC_PATTERNS_MAX_ATTEMPTS");
    /// ```
    pub fn key(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field.to_uppercase())
    }

    fn raw(&self, field: &str) -> Result<Option<(String, String)>> {
        let key = self.key(field);
        match env::var(&key) {
            Ok(value) => Ok(Some((key, value.trim().to_string()))),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(PatternError::Config(format!(
                "{} contains invalid UTF-8",
                key
            ))),
        }
    }

    /// A whole number of milliseconds, no larger than `max`
    pub fn millis(&self, field: &str, max: Duration) -> Result<Option<Duration>> {
        let Some((key, value)) = self.raw(field)? else {
            return Ok(None);
        };

        let millis: u64 = value.parse().map_err(|_| {
            PatternError::Config(format!("{}: expected milliseconds, got {:?}", key, value))
        })?;
        let duration = Duration::from_millis(millis);

        if duration > max {
            return Err(PatternError::Config(format!(
                "{}: {}ms exceeds the {}ms limit",
                key,
                millis,
                max.as_millis()
            )));
        }
        Ok(Some(duration))
    }

    /// A non-negative count such as an attempt budget
    pub fn count(&self, field: &str) -> Result<Option<usize>> {
        let Some((key, value)) = self.raw(field)? else {
            return Ok(None);
        };

        value.parse().map(Some).map_err(|_| {
            PatternError::Config(format!("{}: expected a count, got {:?}", key, value))
        })
    }

    /// A switch: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`, any case
    pub fn flag(&self, field: &str) -> Result<Option<bool>> {
        let Some((key, value)) = self.raw(field)? else {
            return Ok(None);
        };

        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(PatternError::Config(format!(
                "{}: expected on/off, got {:?}",
                key, value
            ))),
        }
    }

    /// Free text, such as a `tracing` filter directive
    pub fn text(&self, field: &str) -> Result<Option<String>> {
        Ok(self.raw(field)?.map(|(_, value)| value))
    }
}
