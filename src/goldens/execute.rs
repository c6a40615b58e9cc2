//! Reconciliation execution - effectful operations
//!
//! Takes a `ReconcilePlan` (created by the pure planning functions) and
//! performs it via the hosting API. The create/update call is the primary
//! operation and fatal on failure; label, trigger-PR comment and reviewer
//! request are independent best-effort side effects collected into a
//! report.

use crate::effects::{SideEffect, attempt};
use crate::error::Result;
use crate::goldens::plan::{GOLDENS_LABEL, GoldensContext, ReconcilePlan, ReconcileStep};
use crate::host::PrHost;

/// Result of executing a reconciliation plan
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Number of the goldens PR (created or existing)
    pub pr_number: u64,
    /// Web URL of the goldens PR, when known
    pub html_url: Option<String>,
    /// Whether this invocation created the PR
    pub created: bool,
    /// Whether the existing PR is stale (always false on create)
    pub stale: bool,
    /// Report of the best-effort side effects attempted
    pub side_effects: Vec<SideEffect>,
}

/// Execute the reconciliation plan (EFFECTFUL).
///
/// Returns `Err` only if the create/update call itself fails; side-effect
/// failures are recorded in the outcome and logged.
pub async fn execute_reconcile(
    plan: &ReconcilePlan,
    ctx: &GoldensContext,
    host: &dyn PrHost,
) -> Result<ReconcileOutcome> {
    let mut side_effects = Vec::new();

    let (pr_number, html_url, created) = match &plan.step {
        ReconcileStep::Create { title, body } => {
            let pr = host
                .create_pr(&ctx.goldens_branch, &ctx.source_branch, title, Some(body), true)
                .await?;

            side_effects.push(
                attempt(
                    "label",
                    pr.number.to_string(),
                    host.add_labels(pr.number, &[GOLDENS_LABEL.to_string()]),
                )
                .await,
            );

            if let Some(trigger) = ctx.trigger_pr {
                let comment = format!(
                    "Visual diff tests failed - pull request #{} has been opened with the updated goldens.",
                    pr.number
                );
                side_effects.push(
                    attempt(
                        "trigger-comment",
                        trigger.to_string(),
                        host.create_issue_comment(trigger, &comment),
                    )
                    .await,
                );
            }

            (pr.number, Some(pr.html_url), true)
        }
        ReconcileStep::UpdateBody { number, body } => {
            host.update_pr_body(*number, body).await?;
            (*number, None, false)
        }
    };

    // Requested on both paths; fails for bot actors and that is fine
    side_effects.push(
        attempt(
            "reviewer",
            ctx.actor.clone(),
            host.request_reviewers(pr_number, &[ctx.actor.clone()]),
        )
        .await,
    );

    Ok(ReconcileOutcome {
        pr_number,
        html_url,
        created,
        stale: plan.stale,
        side_effects,
    })
}
