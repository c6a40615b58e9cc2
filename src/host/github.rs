//! GitHub hosting service implementation

use crate::config::RepoSlug;
use crate::error::{Error, Result};
use crate::host::PrHost;
use crate::types::{MergeMethod, PrState, PullRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::params::repos::Reference;
use serde::Deserialize;
use tracing::debug;

// GraphQL response types for the auto-merge and approval mutations

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct MutationAck {
    #[serde(rename = "clientMutationId")]
    #[allow(dead_code)]
    client_mutation_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnableAutoMergeData {
    #[allow(dead_code)]
    enable_pull_request_auto_merge: MutationAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApprovePrData {
    #[allow(dead_code)]
    add_pull_request_review: MutationAck,
    #[allow(dead_code)]
    submit_pull_request_review: MutationAck,
}

impl<T> GraphQlResponse<T> {
    /// Extract the data payload, surfacing GraphQL-level errors.
    fn into_data(self, operation: &str) -> Result<T> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "{operation} failed: {}",
                messages.join(", ")
            )));
        }
        self.data
            .ok_or_else(|| Error::GitHubApi(format!("no data in {operation} response")))
    }
}

/// GitHub service using octocrab
pub struct GitHubHost {
    client: Octocrab,
    slug: RepoSlug,
}

impl GitHubHost {
    /// Create a new GitHub host bound to one token.
    ///
    /// `api_url` overrides the API base for GitHub Enterprise installs;
    /// `user_agent` identifies the workflow in request logs.
    pub fn new(
        token: &str,
        slug: RepoSlug,
        api_url: Option<&str>,
        user_agent: &str,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .personal_token(token.to_string())
            .add_header(
                reqwest::header::USER_AGENT,
                user_agent.to_string(),
            );

        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| Error::GitHubApi(format!("invalid GITHUB_API_URL `{url}`: {e}")))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client, slug })
    }
}

/// Helper to convert an octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    // Closed + merged_at distinguishes merged from plain closed
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
        // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
        Some(_) | None => PrState::Closed,
    };

    PullRequest {
        number: pr.number,
        node_id: pr.node_id.clone(),
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        head_ref: pr.head.ref_field.clone(),
        base_ref: pr.base.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        body: pr.body.clone(),
        state,
        is_draft: pr.draft.unwrap_or(false),
        created_at: pr.created_at,
    }
}

#[async_trait]
impl PrHost for GitHubHost {
    async fn list_open_prs(&self, head: &str, base: Option<&str>) -> Result<Vec<PullRequest>> {
        debug!(head, base, "listing open PRs");
        let pulls = self.client.pulls(&self.slug.owner, &self.slug.repo);
        let mut builder = pulls
            .list()
            .head(format!("{}:{}", &self.slug.owner, head))
            .state(octocrab::params::State::Open);

        if let Some(base_ref) = base {
            builder = builder.base(base_ref);
        }

        let prs = builder.send().await?;
        let result: Vec<PullRequest> = prs.items.iter().map(pr_from_octocrab).collect();
        debug!(head, count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn get_pr(&self, number: u64) -> Result<PullRequest> {
        debug!(number, "getting PR");
        let pr = self
            .client
            .pulls(&self.slug.owner, &self.slug.repo)
            .get(number)
            .await?;
        Ok(pr_from_octocrab(&pr))
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        debug!(head, base, draft, "creating PR");
        let pulls = self.client.pulls(&self.slug.owner, &self.slug.repo);
        let mut builder = pulls.create(title, head, base).draft(draft);

        if let Some(body_text) = body {
            builder = builder.body(body_text);
        }

        let pr = builder.send().await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn update_pr_body(&self, number: u64, body: &str) -> Result<()> {
        debug!(number, "updating PR body");
        self.client
            .pulls(&self.slug.owner, &self.slug.repo)
            .update(number)
            .body(body)
            .send()
            .await?;
        debug!(number, "updated PR body");
        Ok(())
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        debug!(number, ?labels, "adding labels");
        self.client
            .issues(&self.slug.owner, &self.slug.repo)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn request_reviewers(&self, number: u64, reviewers: &[String]) -> Result<()> {
        debug!(number, ?reviewers, "requesting reviewers");
        self.client
            .pulls(&self.slug.owner, &self.slug.repo)
            .request_reviews(number, reviewers.to_vec(), Vec::<String>::new())
            .await?;
        Ok(())
    }

    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<()> {
        debug!(number, "creating comment");
        self.client
            .issues(&self.slug.owner, &self.slug.repo)
            .create_comment(number, body)
            .await?;
        debug!(number, "created comment");
        Ok(())
    }

    async fn enable_auto_merge(&self, pr_node_id: &str, method: MergeMethod) -> Result<()> {
        debug!(pr_node_id, %method, "enabling auto-merge");
        let response: GraphQlResponse<EnableAutoMergeData> = self
            .client
            .graphql(&serde_json::json!({
                "query": r"
                    mutation EnableAutoMerge($pullRequestId: ID!, $mergeMethod: PullRequestMergeMethod!) {
                        enablePullRequestAutoMerge(input: {
                            pullRequestId: $pullRequestId,
                            mergeMethod: $mergeMethod
                        }) {
                            clientMutationId
                        }
                    }
                ",
                "variables": {
                    "pullRequestId": pr_node_id,
                    "mergeMethod": method.as_graphql()
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("enablePullRequestAutoMerge failed: {e}")))?;

        response.into_data("enablePullRequestAutoMerge")?;
        debug!(pr_node_id, "enabled auto-merge");
        Ok(())
    }

    async fn approve_pr(&self, pr_node_id: &str) -> Result<()> {
        debug!(pr_node_id, "approving PR");
        let response: GraphQlResponse<ApprovePrData> = self
            .client
            .graphql(&serde_json::json!({
                "query": r"
                    mutation ApprovePr($pullRequestId: ID!) {
                        addPullRequestReview(input: {pullRequestId: $pullRequestId}) {
                            clientMutationId
                        }
                        submitPullRequestReview(input: {event: APPROVE, pullRequestId: $pullRequestId}) {
                            clientMutationId
                        }
                    }
                ",
                "variables": {
                    "pullRequestId": pr_node_id
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("submitPullRequestReview failed: {e}")))?;

        response.into_data("submitPullRequestReview")?;
        debug!(pr_node_id, "approved PR");
        Ok(())
    }

    async fn list_branches(&self, prefix: &str) -> Result<Vec<String>> {
        debug!(prefix, "listing branches");
        // The REST API has no prefix filter; fetch all pages and filter here.
        let page = self
            .client
            .repos(&self.slug.owner, &self.slug.repo)
            .list_branches()
            .per_page(100)
            .send()
            .await?;

        let branches = self.client.all_pages(page).await?;
        let result: Vec<String> = branches
            .into_iter()
            .map(|b| b.name)
            .filter(|name| name.starts_with(prefix))
            .collect();
        debug!(prefix, count = result.len(), "listed matching branches");
        Ok(result)
    }

    async fn branch_exists(&self, name: &str) -> Result<bool> {
        debug!(name, "checking branch");
        let route = format!(
            "/repos/{}/{}/branches/{}",
            self.slug.owner, self.slug.repo, name
        );
        match self
            .client
            .get::<serde_json::Value, _, ()>(&route, None)
            .await
        {
            Ok(_) => Ok(true),
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code == reqwest::StatusCode::NOT_FOUND =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        debug!(name, "deleting branch");
        self.client
            .repos(&self.slug.owner, &self.slug.repo)
            .delete_ref(&Reference::Branch(name.to_string()))
            .await?;
        debug!(name, "deleted branch");
        Ok(())
    }

    async fn create_release(&self, tag: &str, name: &str) -> Result<()> {
        debug!(tag, "creating release");
        self.client
            .repos(&self.slug.owner, &self.slug.repo)
            .releases()
            .create(tag)
            .name(name)
            .send()
            .await?;
        debug!(tag, "created release");
        Ok(())
    }

    fn slug(&self) -> &RepoSlug {
        &self.slug
    }
}
