//! Shared test utilities

#![allow(dead_code)]

mod mock_host;

pub use mock_host::{AutoMergeCall, CommentCall, CreatePrCall, MockPrHost, UpdateBodyCall};

use ci_kit::goldens::GoldensContext;

/// A goldens context for a PR-triggered run
pub fn pr_triggered_ctx(trigger_pr: u64) -> GoldensContext {
    GoldensContext {
        source_branch: "feat-buttons".to_string(),
        goldens_branch: "gh-visual-diff/feat-buttons".to_string(),
        trigger_pr: Some(trigger_pr),
        actor: "octocat".to_string(),
        failed_reports: Vec::new(),
    }
}

/// A goldens context for a branch-push-triggered run
pub fn branch_triggered_ctx() -> GoldensContext {
    GoldensContext {
        source_branch: "main".to_string(),
        goldens_branch: "gh-visual-diff/main".to_string(),
        trigger_pr: None,
        actor: "octocat".to_string(),
        failed_reports: Vec::new(),
    }
}
