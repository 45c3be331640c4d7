//! Error chain reporting
//!
//! Failures nest: a `TimeoutError<PatternError>` wraps the lookup failure it
//! observed, and [`PatternError::CleanupFailed`](super::PatternError) wraps
//! the error raised while releasing a resource. These helpers follow the
//! `source()` links.

use std::error::Error as StdError;

/// Every error in the chain, outermost first
pub fn error_chain<'a>(
    error: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(error), |&current| current.source())
}

/// Render an error and its causes, one per line
///
/// ```rust
/// use async_patterns::error::format_error_chain;
/// use async_patterns::PatternError;
///
/// let err = PatternError::CleanupFailed {
///     resource: "resource-7".to_string(),
///     source: Box::new(PatternError::NotFound(7)),
/// };
/// assert_eq!(
///     format_error_chain(&err),
///     "Cleanup of resource resource-7 failed\n  caused by: User 7 not found"
/// );
/// ```
pub fn format_error_chain(error: &(dyn StdError + 'static)) -> String {
    error_chain(error)
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n  caused by: ")
}

/// The innermost error, or `error` itself when it has no source
pub fn root_cause<'a>(error: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    error_chain(error).last().unwrap_or(error)
}
