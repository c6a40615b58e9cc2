//! Core types for ci-kit

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A pull request as seen through the hosting API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// GraphQL node ID (used for auto-merge/approval mutations)
    pub node_id: Option<String>,
    /// Web URL for the PR
    pub html_url: String,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Current state of the PR
    pub state: PrState,
    /// Whether the PR is a draft
    pub is_draft: bool,
    /// When the PR was opened (None if the API omitted it)
    pub created_at: Option<DateTime<Utc>>,
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Merge strategy requested when enabling auto-merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto the base branch
    Rebase,
}

impl MergeMethod {
    /// The `PullRequestMergeMethod` value expected by the GraphQL API
    pub const fn as_graphql(self) -> &'static str {
        match self {
            Self::Merge => "MERGE",
            Self::Squash => "SQUASH",
            Self::Rebase => "REBASE",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

impl FromStr for MergeMethod {
    type Err = Error;

    /// Parse a merge method name, case-insensitively.
    ///
    /// Anything outside merge/squash/rebase is a configuration error and
    /// must be rejected before any API call is attempted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            _ => Err(Error::UnsupportedMergeMethod(s.to_string())),
        }
    }
}
