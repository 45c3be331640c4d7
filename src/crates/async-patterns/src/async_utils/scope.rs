//! Resource-scoped operations with guaranteed cleanup
//!
//! A [`ResourceScope`] acquires a resource, runs a main step with it and then
//! always runs a cleanup step before settling, whether the main step
//! succeeded or failed.
//!
//! ```text
//! Idle -> Acquiring -> Running -> Cleanup -> Done
//!                   \          \-> Failed -/  \-> CleanupFailed
//!                    \-> Failed (nothing acquired, nothing to clean up)
//! ```
//!
//! When cleanup fails after the main step already failed, the main step's
//! error is what the caller sees; the cleanup error is logged. When cleanup
//! fails after a successful main step, the caller gets
//! [`PatternError::CleanupFailed`].
//!
//! Cleanup is asynchronous, so it only runs if the scope's future is driven
//! to completion. Dropping that future mid-run skips it.

use crate::config::PatternsConfig;
use crate::error::format_error_chain;
use crate::logging::LogGuard;
use crate::{PatternError, Result};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Lifecycle of one scoped run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePhase {
    Idle,
    Acquiring,
    Running,
    Failed,
    Cleanup,
    Done,
    CleanupFailed,
}

/// Runs one acquire / use / release cycle and records its phases
#[derive(Debug)]
pub struct ResourceScope {
    name: String,
    phases: Vec<ScopePhase>,
}

impl ResourceScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phases: vec![ScopePhase::Idle],
        }
    }

    /// Every phase entered so far, in order
    pub fn phases(&self) -> &[ScopePhase] {
        &self.phases
    }

    /// The current phase
    pub fn phase(&self) -> ScopePhase {
        self.phases.last().copied().unwrap_or(ScopePhase::Idle)
    }

    fn enter(&mut self, phase: ScopePhase) {
        tracing::trace!(scope = %self.name, "{:?} -> {:?}", self.phase(), phase);
        self.phases.push(phase);
    }

    /// Acquire a resource, run `main` with it, then always run `cleanup`
    ///
    /// `R` is a handle: the clone given to `main` and the value given to
    /// `cleanup` refer to the same underlying resource. If `acquire` fails
    /// there is nothing to release and its error is returned directly.
    pub async fn run<R, T, A, AFut, M, MFut, C, CFut>(
        &mut self,
        acquire: A,
        main: M,
        cleanup: C,
    ) -> Result<T>
    where
        R: Clone + fmt::Display,
        A: FnOnce() -> AFut,
        AFut: Future<Output = Result<R>>,
        M: FnOnce(R) -> MFut,
        MFut: Future<Output = Result<T>>,
        C: FnOnce(R) -> CFut,
        CFut: Future<Output = Result<()>>,
    {
        let _guard = LogGuard::new(format!("scope {}", self.name));

        self.enter(ScopePhase::Acquiring);
        let resource = match acquire().await {
            Ok(resource) => resource,
            Err(e) => {
                self.enter(ScopePhase::Failed);
                return Err(e);
            }
        };
        let resource_id = resource.to_string();

        self.enter(ScopePhase::Running);
        let outcome = main(resource.clone()).await;
        if outcome.is_err() {
            self.enter(ScopePhase::Failed);
        }

        self.enter(ScopePhase::Cleanup);
        match cleanup(resource).await {
            Ok(()) => {
                self.enter(ScopePhase::Done);
                outcome
            }
            Err(cleanup_error) => {
                self.enter(ScopePhase::CleanupFailed);
                match outcome {
                    Err(main_error) => {
                        tracing::error!(
                            resource = %resource_id,
                            "Cleanup failed after main step failed; keeping main error. {}",
                            format_error_chain(&cleanup_error)
                        );
                        Err(main_error)
                    }
                    Ok(_) => Err(PatternError::CleanupFailed {
                        resource: resource_id,
                        source: Box::new(cleanup_error),
                    }),
                }
            }
        }
    }
}

/// A simulated resource handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    id: String,
}

impl Resource {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Acquire the resource named `label` after `latency`
///
/// The handle's identity comes from the caller, so concurrent scopes never
/// share any bookkeeping.
pub async fn acquire_resource(label: &str, latency: Duration) -> Result<Resource> {
    tokio::time::sleep(latency).await;
    let id = format!("resource-{}", label);
    tracing::debug!(resource = %id, "Acquired resource");
    Ok(Resource { id })
}

/// Release a resource after `latency`
pub async fn release_resource(resource: &Resource, latency: Duration) -> Result<()> {
    tokio::time::sleep(latency).await;
    tracing::info!(resource = %resource.id, "Cleaning up resource");
    Ok(())
}

/// Acquire a resource, use it, and release it regardless of the outcome
///
/// The main step fails when `should_fail` is set; the release still runs
/// before the error is returned.
pub async fn operation_with_cleanup(config: &PatternsConfig, should_fail: bool) -> Result<String> {
    let latency = config.resource_latency();
    let mut scope = ResourceScope::new("operation_with_cleanup");

    scope
        .run(
            || acquire_resource(if should_fail { "failing" } else { "main" }, latency),
            |resource| async move {
                tokio::time::sleep(latency).await;
                if should_fail {
                    Err(PatternError::InvalidOperation(format!(
                        "operation using {} failed",
                        resource
                    )))
                } else {
                    Ok(format!("Operation completed with {}", resource))
                }
            },
            |resource| async move { release_resource(&resource, latency).await },
        )
        .await
}
