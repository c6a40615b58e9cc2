//! Goldens commands - manage visual-diff golden-image PRs

use crate::cli::context::HostContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use chrono::Utc;
use ci_kit::config::{optional_env, require_env};
use ci_kit::error::{Error, Result};
use ci_kit::goldens::{GoldensContext, execute_reconcile, plan_reconcile};
use ci_kit::host::PrHost;
use ci_kit::outputs::set_output;
use ci_kit::types::PrState;

fn parse_pr_number(raw: &str, var: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| Error::Config(format!("{var} must be a PR number, got `{raw}`")))
}

/// Configuration for the goldens-pr command
struct GoldensPrConfig {
    ctx: GoldensContext,
}

impl GoldensPrConfig {
    fn from_env() -> Result<Self> {
        let trigger_pr = optional_env("PULL_REQUEST_NUM")
            .map(|raw| parse_pr_number(&raw, "PULL_REQUEST_NUM"))
            .transpose()?;
        let failed_reports = optional_env("FAILED_REPORTS")
            .map(|raw| {
                raw.split(',')
                    .map(|link| link.trim().to_string())
                    .filter(|link| !link.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            ctx: GoldensContext {
                source_branch: require_env("SOURCE_BRANCH")?,
                goldens_branch: require_env("VISUAL_DIFF_BRANCH")?,
                trigger_pr,
                actor: require_env("GITHUB_ACTOR")?,
                failed_reports,
            },
        })
    }
}

/// Check that the PR or branch that triggered the test run still matches
/// what the goldens were generated against.
async fn verify_trigger(host: &dyn PrHost, ctx: &GoldensContext) -> Result<()> {
    if let Some(trigger) = ctx.trigger_pr {
        println!(
            "{}",
            "Tests triggered by PR - verifying PR information".emphasis()
        );
        let pr = host.get_pr(trigger).await.map_err(|e| {
            Error::Precondition(format!(
                "could not find PR #{trigger} that triggered the visual-diff test run: {e}"
            ))
        })?;

        if pr.head_ref != ctx.source_branch {
            return Err(Error::Precondition(format!(
                "PR #{trigger} head is `{}` but the goldens were generated for `{}`",
                pr.head_ref, ctx.source_branch
            )));
        }
        if pr.state != PrState::Open {
            return Err(Error::Precondition(format!(
                "PR #{trigger} that triggered the visual-diff test run is no longer open"
            )));
        }
        println!(
            "New goldens are for PR #{trigger} (branch: {})",
            ctx.source_branch.accent()
        );
    } else {
        println!(
            "{}",
            "Tests triggered by push to branch - verifying branch information".emphasis()
        );
        if !host.branch_exists(&ctx.source_branch).await? {
            return Err(Error::Precondition(format!(
                "could not find branch `{}` that triggered the visual-diff test run",
                ctx.source_branch
            )));
        }
        println!("New goldens are for branch {}", ctx.source_branch.accent());
    }
    Ok(())
}

/// Run the goldens-pr command
pub async fn run_goldens_pr() -> Result<()> {
    let config = GoldensPrConfig::from_env()?;
    let host_ctx = HostContext::from_env()?;
    let host = host_ctx.host.as_ref();

    verify_trigger(host, &config.ctx).await?;

    println!("{}", "Checking for existing goldens PR".emphasis());
    let open = host
        .list_open_prs(&config.ctx.goldens_branch, Some(&config.ctx.source_branch))
        .await?;

    let plan = plan_reconcile(&open, &config.ctx, Utc::now());
    if plan.ignored_extras > 0 {
        println!(
            "{}",
            format!(
                "Found {} extra open goldens PR(s) for this branch pair, using the first",
                plan.ignored_extras
            )
            .warn()
        );
    }

    let outcome = execute_reconcile(&plan, &config.ctx, host).await?;

    if outcome.created {
        let url = outcome.html_url.as_deref().unwrap_or_default();
        println!("{} PR #{} opened: {url}", check(), outcome.pr_number);
    } else {
        println!(
            "{} Goldens PR #{} already exists, description updated",
            check(),
            outcome.pr_number
        );
    }

    for effect in &outcome.side_effects {
        if let Some(error) = &effect.error {
            // Expected for bot actors on the reviewer request
            println!(
                "{}",
                format!("Could not run {} for {}: {error}", effect.name, effect.target).warn()
            );
        }
    }

    set_output("pr-num", &outcome.pr_number.to_string())?;
    set_output("stale", if outcome.stale { "true" } else { "false" })?;
    if outcome.stale {
        println!(
            "{}",
            format!("Goldens PR #{} is older than 3 days", outcome.pr_number).warn()
        );
    }

    Ok(())
}

/// Configuration for the goldens-comment command
struct GoldensCommentConfig {
    trigger_pr: u64,
    conflict: bool,
    base_branch: Option<String>,
}

impl GoldensCommentConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            trigger_pr: parse_pr_number(&require_env("PULL_REQUEST_NUM")?, "PULL_REQUEST_NUM")?,
            conflict: optional_env("GOLDENS_CONFLICT").is_some_and(|v| v == "true"),
            base_branch: optional_env("PULL_REQUEST_BASE_BRANCH"),
        })
    }
}

/// Run the goldens-comment command
pub async fn run_goldens_comment() -> Result<()> {
    let config = GoldensCommentConfig::from_env()?;
    let host_ctx = HostContext::from_env()?;

    let body = if config.conflict {
        let base = config
            .base_branch
            .ok_or_else(|| Error::MissingEnv("PULL_REQUEST_BASE_BRANCH".to_string()))?;
        println!("Adding comment to pull request about goldens conflict.");
        format!(
            "Could not generate new goldens - your code changes will update golden files that you do not have the latest version of.  Please rebase or merge `{base}` into your branch."
        )
    } else {
        println!("Adding comment to pull request about general issues.");
        let server = require_env("GITHUB_SERVER_URL")?;
        let repo = require_env("GITHUB_REPOSITORY")?;
        let run_id = require_env("GITHUB_RUN_ID")?;
        format!(
            "Could not generate new goldens - please check the [GitHub Action run log]({server}/{repo}/actions/runs/{run_id}) for errors."
        )
    };

    host_ctx
        .host
        .create_issue_comment(config.trigger_pr, &body)
        .await?;

    println!("{} Commented on PR #{}", check(), config.trigger_pr);
    Ok(())
}

/// Run the goldens-cleanup command
pub async fn run_goldens_cleanup() -> Result<()> {
    let prefix = require_env("VISUAL_DIFF_BRANCH_PREFIX")?;
    let host_ctx = HostContext::from_env()?;
    let host = host_ctx.host.as_ref();

    println!(
        "{}",
        format!("Looking for orphaned {prefix}* branches").emphasis()
    );

    let branches = host.list_branches(&prefix).await?;
    if branches.is_empty() {
        println!("{}", "No visual-diff branches to clean up".muted());
        return Ok(());
    }

    let mut deleted = 0usize;
    let mut kept = 0usize;
    for branch in &branches {
        let open = host.list_open_prs(branch, None).await?;
        if open.is_empty() {
            // Individual deletions are best-effort; keep sweeping on failure
            match host.delete_branch(branch).await {
                Ok(()) => {
                    println!("{} Deleted {}", check(), branch.accent());
                    deleted += 1;
                }
                Err(e) => {
                    println!(
                        "{}",
                        format!("Could not delete branch {branch}: {e}").warn()
                    );
                }
            }
        } else {
            println!(
                "{}",
                format!("Keeping {branch}: open PR #{}", open[0].number).muted()
            );
            kept += 1;
        }
    }

    println!(
        "{}",
        format!("Cleanup complete: {deleted} deleted, {kept} kept").muted()
    );
    Ok(())
}
