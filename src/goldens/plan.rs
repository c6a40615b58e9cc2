//! Reconciliation planning - pure functions for the goldens PR
//!
//! This module contains the pure, testable logic that decides whether the
//! goldens PR gets created or updated. No I/O happens here - the open-PR
//! query result is passed in, making it easy to unit test.

use crate::types::PullRequest;
use chrono::{DateTime, Duration, Utc};

/// Label applied to every goldens PR
pub const GOLDENS_LABEL: &str = "auto-visual-diff";

/// Age after which an open goldens PR counts as stale
const STALE_AFTER_DAYS: i64 = 3;

/// Inputs describing the goldens update being reconciled
#[derive(Debug, Clone)]
pub struct GoldensContext {
    /// Branch whose test run produced the new goldens (PR base)
    pub source_branch: String,
    /// Branch holding the regenerated golden images (PR head)
    pub goldens_branch: String,
    /// PR that triggered the test run, if it was PR-triggered
    pub trigger_pr: Option<u64>,
    /// Actor whose push/PR triggered the run; requested as reviewer
    pub actor: String,
    /// Links to failed visual-diff reports, if any
    pub failed_reports: Vec<String>,
}

/// What the reconciler should do to the goldens PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStep {
    /// No open PR exists for this head/base pair - open a draft
    Create {
        /// Title for the new PR
        title: String,
        /// Computed body
        body: String,
    },
    /// An open PR exists - refresh its description in place
    UpdateBody {
        /// Number of the existing PR
        number: u64,
        /// Recomputed body
        body: String,
    },
}

/// The reconciliation decision for one invocation
#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    /// The create-or-update step to perform
    pub step: ReconcileStep,
    /// Whether the existing PR is older than the staleness threshold
    pub stale: bool,
    /// Open PRs beyond the first returned for the head/base pair.
    ///
    /// At most one open PR per pair is expected; extras are counted so the
    /// caller can warn instead of silently indexing.
    pub ignored_extras: usize,
}

/// Whether a PR opened at `created_at` is stale at `now`.
///
/// Strictly older than the threshold counts; a PR exactly at the boundary
/// does not. A missing creation timestamp is never stale.
pub fn is_stale(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    created_at.is_some_and(|created| now - created > Duration::days(STALE_AFTER_DAYS))
}

/// Title for a new goldens PR, derived from the trigger
pub fn pr_title(ctx: &GoldensContext) -> String {
    ctx.trigger_pr.map_or_else(
        || format!("Updating Visual Diff Goldens for Branch {}", ctx.source_branch),
        |num| format!("Updating Visual Diff Goldens for PR {num}"),
    )
}

/// Compose the goldens PR body from the trigger and any failed reports.
///
/// Each report link is named by its second-to-last path segment (the
/// report directory), matching the report publisher's layout.
pub fn compose_body(ctx: &GoldensContext) -> String {
    let target = ctx.trigger_pr.map_or_else(
        || format!("branch `{}`.", ctx.source_branch),
        |num| format!("the changes in pull request #{num}."),
    );
    let mut body =
        format!("This pull request updates the visual-diff golden images for {target}");

    if ctx.failed_reports.is_empty() {
        return body;
    }

    body.push_str(
        "\n\nPlease review the following failed reports closely before merging to ensure the visual differences are expected.",
    );
    body.push_str("\n\nFailed Reports:");
    for link in &ctx.failed_reports {
        let name = link.split('/').rev().nth(1).unwrap_or(link.as_str());
        body.push_str(&format!("\n- [{name}]({link})"));
    }
    body
}

/// Decide what to do given the open PRs for `(head=goldens, base=source)`.
///
/// The first open PR is canonical; if the hosting API returns more than
/// one they are counted in `ignored_extras`, not treated as an error.
pub fn plan_reconcile(
    open_prs: &[PullRequest],
    ctx: &GoldensContext,
    now: DateTime<Utc>,
) -> ReconcilePlan {
    let body = compose_body(ctx);

    match open_prs.first() {
        None => ReconcilePlan {
            step: ReconcileStep::Create {
                title: pr_title(ctx),
                body,
            },
            stale: false,
            ignored_extras: 0,
        },
        Some(existing) => ReconcilePlan {
            step: ReconcileStep::UpdateBody {
                number: existing.number,
                body,
            },
            stale: is_stale(existing.created_at, now),
            ignored_extras: open_prs.len() - 1,
        },
    }
}
