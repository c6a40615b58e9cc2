//! Mock hosting service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ci_kit::config::RepoSlug;
use ci_kit::error::{Error, Result};
use ci_kit::host::PrHost;
use ci_kit::types::{MergeMethod, PrState, PullRequest};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
    pub draft: bool,
}

/// Call record for `update_pr_body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBodyCall {
    pub number: u64,
    pub body: String,
}

/// Call record for `create_issue_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCall {
    pub number: u64,
    pub body: String,
}

/// Call record for `enable_auto_merge`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoMergeCall {
    pub node_id: String,
    pub method: MergeMethod,
}

/// Simple stateful mock host for testing
///
/// Created PRs are registered as open PRs for their head branch, so a
/// second reconciliation pass observes the PR the first one created.
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Configurable responses per branch
/// - Error injection for failure path testing
pub struct MockPrHost {
    slug: RepoSlug,
    next_pr_number: AtomicU64,
    // Configurable state
    open_prs: Mutex<HashMap<String, Vec<PullRequest>>>,
    prs_by_number: Mutex<HashMap<u64, PullRequest>>,
    branches: Mutex<Vec<String>>,
    missing_branches: Mutex<Vec<String>>,
    // Call tracking
    list_open_prs_calls: Mutex<Vec<(String, Option<String>)>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    update_body_calls: Mutex<Vec<UpdateBodyCall>>,
    label_calls: Mutex<Vec<(u64, Vec<String>)>>,
    reviewer_calls: Mutex<Vec<(u64, Vec<String>)>>,
    comment_calls: Mutex<Vec<CommentCall>>,
    automerge_calls: Mutex<Vec<AutoMergeCall>>,
    approve_calls: Mutex<Vec<String>>,
    delete_branch_calls: Mutex<Vec<String>>,
    release_calls: Mutex<Vec<(String, String)>>,
    // Error injection
    error_on_create_pr: Mutex<Option<String>>,
    error_on_update_body: Mutex<Option<String>>,
    error_on_labels: Mutex<Option<String>>,
    error_on_reviewers: Mutex<Option<String>>,
    error_on_comment: Mutex<Option<String>>,
    error_on_automerge: Mutex<Option<String>>,
    error_on_approve: Mutex<Option<String>>,
    error_on_delete_branch: Mutex<Option<String>>,
}

impl Default for MockPrHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPrHost {
    /// Create a new mock bound to a test repository
    pub fn new() -> Self {
        Self {
            slug: RepoSlug {
                owner: "test".to_string(),
                repo: "repo".to_string(),
            },
            next_pr_number: AtomicU64::new(1),
            open_prs: Mutex::new(HashMap::new()),
            prs_by_number: Mutex::new(HashMap::new()),
            branches: Mutex::new(Vec::new()),
            missing_branches: Mutex::new(Vec::new()),
            list_open_prs_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_body_calls: Mutex::new(Vec::new()),
            label_calls: Mutex::new(Vec::new()),
            reviewer_calls: Mutex::new(Vec::new()),
            comment_calls: Mutex::new(Vec::new()),
            automerge_calls: Mutex::new(Vec::new()),
            approve_calls: Mutex::new(Vec::new()),
            delete_branch_calls: Mutex::new(Vec::new()),
            release_calls: Mutex::new(Vec::new()),
            error_on_create_pr: Mutex::new(None),
            error_on_update_body: Mutex::new(None),
            error_on_labels: Mutex::new(None),
            error_on_reviewers: Mutex::new(None),
            error_on_comment: Mutex::new(None),
            error_on_automerge: Mutex::new(None),
            error_on_approve: Mutex::new(None),
            error_on_delete_branch: Mutex::new(None),
        }
    }

    /// Build a PR value the way this mock's `create_pr` would
    pub fn make_pr(
        number: u64,
        head: &str,
        base: &str,
        created_at: DateTime<Utc>,
    ) -> PullRequest {
        PullRequest {
            number,
            node_id: Some(format!("PR_node_{number}")),
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            head_ref: head.to_string(),
            base_ref: base.to_string(),
            title: format!("PR {number}"),
            body: None,
            state: PrState::Open,
            is_draft: false,
            created_at: Some(created_at),
        }
    }

    // === Setup methods ===

    /// Register an open PR for its head branch (and by number)
    pub fn add_open_pr(&self, pr: PullRequest) {
        self.prs_by_number
            .lock()
            .unwrap()
            .insert(pr.number, pr.clone());
        self.open_prs
            .lock()
            .unwrap()
            .entry(pr.head_ref.clone())
            .or_default()
            .push(pr);
    }

    /// Register a PR only retrievable by number (e.g. a closed trigger PR)
    pub fn set_pr(&self, pr: PullRequest) {
        self.prs_by_number.lock().unwrap().insert(pr.number, pr);
    }

    /// Register existing branch names
    pub fn set_branches(&self, names: &[&str]) {
        *self.branches.lock().unwrap() = names.iter().map(ToString::to_string).collect();
    }

    /// Make `branch_exists` report the branch as missing
    pub fn set_branch_missing(&self, name: &str) {
        self.missing_branches.lock().unwrap().push(name.to_string());
    }

    // === Error injection methods ===

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `update_pr_body` return an error
    pub fn fail_update_body(&self, msg: &str) {
        *self.error_on_update_body.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `add_labels` return an error
    pub fn fail_labels(&self, msg: &str) {
        *self.error_on_labels.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `request_reviewers` return an error
    pub fn fail_reviewers(&self, msg: &str) {
        *self.error_on_reviewers.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_issue_comment` return an error
    pub fn fail_comment(&self, msg: &str) {
        *self.error_on_comment.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `enable_auto_merge` return an error
    pub fn fail_automerge(&self, msg: &str) {
        *self.error_on_automerge.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `approve_pr` return an error
    pub fn fail_approve(&self, msg: &str) {
        *self.error_on_approve.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `delete_branch` return an error
    pub fn fail_delete_branch(&self, msg: &str) {
        *self.error_on_delete_branch.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// Get all `create_pr` calls
    pub fn create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all `update_pr_body` calls
    pub fn update_body_calls(&self) -> Vec<UpdateBodyCall> {
        self.update_body_calls.lock().unwrap().clone()
    }

    /// Get all `add_labels` calls
    pub fn label_calls(&self) -> Vec<(u64, Vec<String>)> {
        self.label_calls.lock().unwrap().clone()
    }

    /// Get all `request_reviewers` calls
    pub fn reviewer_calls(&self) -> Vec<(u64, Vec<String>)> {
        self.reviewer_calls.lock().unwrap().clone()
    }

    /// Get all `create_issue_comment` calls
    pub fn comment_calls(&self) -> Vec<CommentCall> {
        self.comment_calls.lock().unwrap().clone()
    }

    /// Get all `enable_auto_merge` calls
    pub fn automerge_calls(&self) -> Vec<AutoMergeCall> {
        self.automerge_calls.lock().unwrap().clone()
    }

    /// Get all `approve_pr` calls
    pub fn approve_calls(&self) -> Vec<String> {
        self.approve_calls.lock().unwrap().clone()
    }

    /// Get all `delete_branch` calls
    pub fn delete_branch_calls(&self) -> Vec<String> {
        self.delete_branch_calls.lock().unwrap().clone()
    }

    /// Get all `create_release` calls
    pub fn release_calls(&self) -> Vec<(String, String)> {
        self.release_calls.lock().unwrap().clone()
    }

    fn injected(&self, slot: &Mutex<Option<String>>) -> Result<()> {
        if let Some(msg) = slot.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl PrHost for MockPrHost {
    async fn list_open_prs(&self, head: &str, base: Option<&str>) -> Result<Vec<PullRequest>> {
        self.list_open_prs_calls
            .lock()
            .unwrap()
            .push((head.to_string(), base.map(ToString::to_string)));

        let prs = self.open_prs.lock().unwrap();
        Ok(prs
            .get(head)
            .map(|list| {
                list.iter()
                    .filter(|pr| base.is_none_or(|b| pr.base_ref == b))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_pr(&self, number: u64) -> Result<PullRequest> {
        self.prs_by_number
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| Error::GitHubApi(format!("get_pr: no PR #{number} configured")))
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
            draft,
        });
        self.injected(&self.error_on_create_pr)?;

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            number,
            node_id: Some(format!("PR_node_{number}")),
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            head_ref: head.to_string(),
            base_ref: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
            state: PrState::Open,
            is_draft: draft,
            created_at: Some(Utc::now()),
        };
        self.add_open_pr(pr.clone());
        Ok(pr)
    }

    async fn update_pr_body(&self, number: u64, body: &str) -> Result<()> {
        self.update_body_calls.lock().unwrap().push(UpdateBodyCall {
            number,
            body: body.to_string(),
        });
        self.injected(&self.error_on_update_body)?;

        if let Some(pr) = self.prs_by_number.lock().unwrap().get_mut(&number) {
            pr.body = Some(body.to_string());
        }
        Ok(())
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        self.label_calls
            .lock()
            .unwrap()
            .push((number, labels.to_vec()));
        self.injected(&self.error_on_labels)
    }

    async fn request_reviewers(&self, number: u64, reviewers: &[String]) -> Result<()> {
        self.reviewer_calls
            .lock()
            .unwrap()
            .push((number, reviewers.to_vec()));
        self.injected(&self.error_on_reviewers)
    }

    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<()> {
        self.comment_calls.lock().unwrap().push(CommentCall {
            number,
            body: body.to_string(),
        });
        self.injected(&self.error_on_comment)
    }

    async fn enable_auto_merge(&self, pr_node_id: &str, method: MergeMethod) -> Result<()> {
        self.automerge_calls.lock().unwrap().push(AutoMergeCall {
            node_id: pr_node_id.to_string(),
            method,
        });
        self.injected(&self.error_on_automerge)
    }

    async fn approve_pr(&self, pr_node_id: &str) -> Result<()> {
        self.approve_calls
            .lock()
            .unwrap()
            .push(pr_node_id.to_string());
        self.injected(&self.error_on_approve)
    }

    async fn list_branches(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .branches
            .lock()
            .unwrap()
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(!self.missing_branches.lock().unwrap().contains(&name.to_string()))
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        self.delete_branch_calls
            .lock()
            .unwrap()
            .push(name.to_string());
        self.injected(&self.error_on_delete_branch)
    }

    async fn create_release(&self, tag: &str, name: &str) -> Result<()> {
        self.release_calls
            .lock()
            .unwrap()
            .push((tag.to_string(), name.to_string()));
        Ok(())
    }

    fn slug(&self) -> &RepoSlug {
        &self.slug
    }
}
