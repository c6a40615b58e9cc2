//! Pull-request hosting services
//!
//! Provides the seam between the automation flows and the hosting API.

mod github;

pub use github::GitHubHost;

use crate::config::RepoSlug;
use crate::error::Result;
use crate::types::{MergeMethod, PullRequest};
use async_trait::async_trait;

/// Hosting-service trait for the operations the CI automation needs
///
/// This trait abstracts the pull-request hosting API so the reconciliation
/// flows can be exercised against a mock in tests. One instance is bound to
/// one token; flows that use a separate auto-merge or approval identity
/// construct a second instance for it.
#[async_trait]
pub trait PrHost: Send + Sync {
    /// List open PRs for a head branch, optionally restricted to a base
    /// branch, in the order the API returns them.
    ///
    /// Callers treat the result as an ordered sequence: the first entry is
    /// canonical and extras are reported, never silently indexed away.
    async fn list_open_prs(&self, head: &str, base: Option<&str>) -> Result<Vec<PullRequest>>;

    /// Get a PR by number
    async fn get_pr(&self, number: u64) -> Result<PullRequest>;

    /// Create a new PR
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest>;

    /// Replace the body/description of an existing PR
    async fn update_pr_body(&self, number: u64, body: &str) -> Result<()>;

    /// Add labels to a PR (or issue)
    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()>;

    /// Request reviews from the given users
    async fn request_reviewers(&self, number: u64, reviewers: &[String]) -> Result<()>;

    /// Post a comment on a PR (or issue)
    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<()>;

    /// Enable auto-merge on a PR, identified by its GraphQL node ID
    async fn enable_auto_merge(&self, pr_node_id: &str, method: MergeMethod) -> Result<()>;

    /// Submit an approving review on a PR, identified by its GraphQL node ID
    async fn approve_pr(&self, pr_node_id: &str) -> Result<()>;

    /// List branch names starting with the given prefix
    async fn list_branches(&self, prefix: &str) -> Result<Vec<String>>;

    /// Check whether a branch exists
    async fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Delete a branch ref
    async fn delete_branch(&self, name: &str) -> Result<()>;

    /// Create a release for an existing tag (the tag is created on the
    /// default branch head if it does not exist yet)
    async fn create_release(&self, tag: &str, name: &str) -> Result<()>;

    /// The repository this host is bound to
    fn slug(&self) -> &RepoSlug;
}
