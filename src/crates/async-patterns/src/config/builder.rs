//! Configuration builder trait
//!
//! A common shape for configuration structures: defaults, validation,
//! environment loading and layering of several sources.

use crate::Result;

/// Trait for configuration structures that support building, validation, and merging
///
/// # Example
///
/// ```rust,ignore
/// use async_patterns::config::{ConfigBuilder, PatternsConfig};
///
/// // Defaults, then ASYNC_PATTERNS_* overrides, then validation
/// let config = PatternsConfig::from_env_with_defaults("ASYNC_PATTERNS_")?;
/// ```
pub trait ConfigBuilder: Default + Clone {
    /// Validate the configuration
    ///
    /// Returns an error if any value is outside its valid range.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `{PREFIX}{FIELD_NAME}` where FIELD_NAME is
    /// the uppercased field name. Unset variables keep their default value.
    fn from_env(prefix: &str) -> Result<Self>;

    /// Merge another configuration into this one
    ///
    /// Values in `other` that differ from the defaults overwrite the values
    /// in `self`. Returns self for chaining.
    fn merge(&mut self, other: Self) -> &mut Self;

    /// Create, validate, and return the default configuration
    fn build() -> Result<Self> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Start from defaults, layer the environment on top, and validate
    fn from_env_with_defaults(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::from_env(prefix)?);
        config.validate()?;
        Ok(config)
    }
}
