//! Best-effort side effects
//!
//! Secondary operations (label, reviewer, auto-merge, approval, branch
//! delete) are attempted independently and collected into a report; a
//! failure is logged and never fails the overall operation. Only the
//! designated primary call of a flow is fatal.

use crate::error::Result;
use tracing::warn;

/// Record of one best-effort side effect attempt
#[derive(Debug, Clone)]
pub struct SideEffect {
    /// Short name of the operation ("label", "reviewer", ...)
    pub name: &'static str,
    /// Entity the operation targeted (PR number, branch name)
    pub target: String,
    /// Error message, if the attempt failed
    pub error: Option<String>,
}

impl SideEffect {
    /// Record a successful attempt
    pub fn ok(name: &'static str, target: impl Into<String>) -> Self {
        Self {
            name,
            target: target.into(),
            error: None,
        }
    }

    /// Record a failed attempt
    pub fn failed(name: &'static str, target: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name,
            target: target.into(),
            error: Some(error.into()),
        }
    }

    /// Whether the attempt succeeded
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Run one best-effort operation, converting failure into a report entry.
pub async fn attempt(
    name: &'static str,
    target: String,
    fut: impl Future<Output = Result<()>>,
) -> SideEffect {
    match fut.await {
        Ok(()) => SideEffect::ok(name, target),
        Err(e) => {
            warn!(operation = name, target = %target, error = %e, "side effect failed");
            SideEffect::failed(name, target, e.to_string())
        }
    }
}
