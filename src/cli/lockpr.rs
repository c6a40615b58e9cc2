//! Lock-PR command - reconcile the package-lock update pull request

use crate::cli::context::HostContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use ci_kit::config::{optional_env, require_env};
use ci_kit::error::Result;
use ci_kit::lockpr::{self, LockPrContext};
use ci_kit::types::MergeMethod;
use std::path::PathBuf;

/// Configuration for the lock-PR command, gathered once from the environment
struct LockPrConfig {
    ctx: LockPrContext,
    temp_dir: PathBuf,
    automerge_token: Option<String>,
    approval_token: Option<String>,
}

impl LockPrConfig {
    fn from_env() -> Result<Self> {
        // Parsing the merge method up front keeps an unsupported value a
        // pure configuration error, reported before any API call.
        let merge_method: MergeMethod = require_env("AUTO_MERGE_METHOD")?.parse()?;

        Ok(Self {
            ctx: LockPrContext {
                branch: require_env("BRANCH_NAME")?,
                default_branch: require_env("DEFAULT_BRANCH")?,
                title: require_env("PR_TITLE")?,
                merge_method,
            },
            temp_dir: PathBuf::from(require_env("TEMP_DIR")?),
            automerge_token: optional_env("AUTO_MERGE_TOKEN"),
            approval_token: optional_env("APPROVAL_TOKEN"),
        })
    }
}

/// Run the lock-pr command
pub async fn run_lock_pr() -> Result<()> {
    let config = LockPrConfig::from_env()?;
    let host_ctx = HostContext::from_env()?;

    let table = lockpr::diff_table(&config.temp_dir);
    let body = lockpr::compose_body(&table);

    let automerge_host = config
        .automerge_token
        .as_deref()
        .map(|token| host_ctx.host_with_token(token))
        .transpose()?;
    let approval_host = config
        .approval_token
        .as_deref()
        .map(|token| host_ctx.host_with_token(token))
        .transpose()?;

    println!(
        "{}",
        format!(
            "Reconciling lock-update PR for branch {}",
            config.ctx.branch
        )
        .emphasis()
    );

    let outcome = lockpr::reconcile(
        host_ctx.host.as_ref(),
        &config.ctx,
        &body,
        automerge_host.as_deref(),
        approval_host.as_deref(),
    )
    .await?;

    if outcome.created {
        println!(
            "{} PR for branch {} created: #{}",
            check(),
            config.ctx.branch.accent(),
            outcome.pr_number
        );
    } else {
        println!(
            "{} PR for branch {} already exists: #{} (description updated)",
            check(),
            config.ctx.branch.accent(),
            outcome.pr_number
        );
    }

    for effect in &outcome.side_effects {
        match (&effect.error, effect.name) {
            (None, "auto-merge") => println!("{} PR set to auto-merge", check()),
            (None, "approval") => println!("{} PR auto-approved", check()),
            (None, name) => println!("{} {name} done", check()),
            (Some(error), name) => {
                println!(
                    "{}",
                    format!("Could not run {name} for PR #{}: {error}", outcome.pr_number).warn()
                );
            }
        }
    }

    Ok(())
}
