//! Lock-update PR reconciliation
//!
//! Finds or creates the pull request carrying an automated `package-lock`
//! update, with a dependency-diff table in the description. Auto-merge and
//! approval are optional best-effort side effects gated on whether their
//! tokens were supplied; each uses its own host instance because each token
//! is a different identity.

use crate::effects::{SideEffect, attempt};
use crate::error::Result;
use crate::host::PrHost;
use crate::lockdiff;
use crate::types::MergeMethod;
use std::path::Path;
use tracing::{debug, warn};

/// Hosting-platform limit on PR body length, in characters
const MAX_BODY_LEN: usize = 65536;

/// Snapshot filename for the pre-update dependency tree
pub const BEFORE_SNAPSHOT: &str = "dependencies-before.json";

/// Snapshot filename for the post-update dependency tree
pub const AFTER_SNAPSHOT: &str = "dependencies-after.json";

/// Inputs for one lock-PR reconciliation
#[derive(Debug, Clone)]
pub struct LockPrContext {
    /// Branch carrying the lockfile update (PR head)
    pub branch: String,
    /// Default branch of the repository (PR base)
    pub default_branch: String,
    /// Title for a newly created PR
    pub title: String,
    /// Validated auto-merge method
    pub merge_method: MergeMethod,
}

/// Result of a lock-PR reconciliation
#[derive(Debug, Clone)]
pub struct LockPrOutcome {
    /// Number of the lock-update PR (created or existing)
    pub pr_number: u64,
    /// Whether this invocation created the PR
    pub created: bool,
    /// Report of the best-effort side effects attempted
    pub side_effects: Vec<SideEffect>,
}

/// Compute the dependency-diff table from the snapshots in `temp_dir`.
///
/// Missing or unparsable snapshots degrade to empty trees; a no-op diff
/// renders as an empty string.
pub fn diff_table(temp_dir: &Path) -> String {
    let before = lockdiff::flatten(&lockdiff::load_snapshot(&temp_dir.join(BEFORE_SNAPSHOT)));
    let after = lockdiff::flatten(&lockdiff::load_snapshot(&temp_dir.join(AFTER_SNAPSHOT)));
    lockdiff::render_table(&lockdiff::diff(&before, &after))
}

/// Compose the PR body, applying the size policy.
///
/// The diff engine never truncates; if the table would push the body past
/// the platform limit it is omitted here with a short note.
pub fn compose_body(diff_table: &str) -> String {
    let intro = "Automatic update of the `package-lock.json` file.";
    if diff_table.is_empty() {
        return intro.to_string();
    }

    let body = format!("{intro}\n{diff_table}");
    if body.len() > MAX_BODY_LEN {
        warn!(
            len = body.len(),
            "dependency diff too large for PR body, omitting table"
        );
        return format!("{intro}\n\nDependency diff omitted: too large for the PR description.");
    }
    body
}

/// Find or create the lock-update PR and run the optional side effects.
///
/// An existing open PR for `(head=branch, base=default_branch)` gets its
/// description refreshed in place; otherwise a PR is created. Only that
/// create/update call is fatal. `automerge_host`/`approval_host` are the
/// token-gated identities for the optional follow-ups.
pub async fn reconcile(
    host: &dyn PrHost,
    ctx: &LockPrContext,
    body: &str,
    automerge_host: Option<&dyn PrHost>,
    approval_host: Option<&dyn PrHost>,
) -> Result<LockPrOutcome> {
    let open = host
        .list_open_prs(&ctx.branch, Some(&ctx.default_branch))
        .await?;

    if open.len() > 1 {
        warn!(
            head = %ctx.branch,
            count = open.len(),
            "multiple open PRs for head/base pair, using the first"
        );
    }

    let (pr, created) = match open.into_iter().next() {
        Some(existing) => {
            debug!(pr_number = existing.number, "lock PR exists, updating body");
            host.update_pr_body(existing.number, body).await?;
            (existing, false)
        }
        None => {
            debug!(head = %ctx.branch, "no lock PR, creating");
            let pr = host
                .create_pr(&ctx.branch, &ctx.default_branch, &ctx.title, Some(body), false)
                .await?;
            (pr, true)
        }
    };

    let mut side_effects = Vec::new();

    // Mutations need the GraphQL node id; without one there is nothing to do.
    let node_id = pr.node_id.as_deref();

    if let Some(automerge) = automerge_host {
        side_effects.push(match node_id {
            Some(id) => {
                attempt(
                    "auto-merge",
                    pr.number.to_string(),
                    automerge.enable_auto_merge(id, ctx.merge_method),
                )
                .await
            }
            None => SideEffect::failed("auto-merge", pr.number.to_string(), "PR has no node id"),
        });
    }

    if let Some(approval) = approval_host {
        side_effects.push(match node_id {
            Some(id) => {
                attempt("approval", pr.number.to_string(), approval.approve_pr(id)).await
            }
            None => SideEffect::failed("approval", pr.number.to_string(), "PR has no node id"),
        });
    }

    Ok(LockPrOutcome {
        pr_number: pr.number,
        created,
        side_effects,
    })
}
