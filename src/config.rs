//! Environment-driven configuration
//!
//! Every command reads its configuration from named environment variables
//! once at startup into an explicit config struct; nothing reads the
//! environment after that. A required variable that is missing is a fatal
//! configuration error reported before any remote call.

use crate::error::{Error, Result};
use std::env;

/// Read a required environment variable.
///
/// Variables that are set but empty are treated as missing: GitHub Actions
/// materializes every declared input as an (possibly empty) variable.
pub fn require_env(name: &str) -> Result<String> {
    optional_env(name).ok_or_else(|| Error::MissingEnv(name.to_string()))
}

/// Read an optional environment variable, mapping empty values to `None`.
pub fn optional_env(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Repository identity parsed from `GITHUB_REPOSITORY` ("owner/repo")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoSlug {
    /// Parse an "owner/repo" slug.
    pub fn parse(slug: &str) -> Result<Self> {
        match slug.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(Error::Config(format!(
                "GITHUB_REPOSITORY must be of the form owner/repo, got `{slug}`"
            ))),
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// GitHub connection settings shared by every command that talks to the API
#[derive(Debug, Clone)]
pub struct GitHubEnv {
    /// Repository the workflow runs against
    pub slug: RepoSlug,
    /// Token used for primary operations
    pub token: String,
    /// API base URL override (GitHub Enterprise), if any
    pub api_url: Option<String>,
    /// User agent sent with every request
    pub user_agent: String,
}

impl GitHubEnv {
    /// Gather connection settings from the standard workflow variables.
    pub fn from_env() -> Result<Self> {
        let slug = RepoSlug::parse(&require_env("GITHUB_REPOSITORY")?)?;
        let token = require_env("GITHUB_TOKEN")?;
        let api_url =
            optional_env("GITHUB_API_URL").filter(|url| url.as_str() != "https://api.github.com");
        let user_agent = optional_env("GITHUB_WORKFLOW")
            .map_or_else(|| "ci-kit".to_string(), |wf| format!("{wf}-ci-kit"));

        Ok(Self {
            slug,
            token,
            api_url,
            user_agent,
        })
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_slug() {
        let slug = RepoSlug::parse("octo-org/widgets").unwrap();
        assert_eq!(slug.owner, "octo-org");
        assert_eq!(slug.repo, "widgets");
        assert_eq!(slug.to_string(), "octo-org/widgets");
    }

    #[test]
    fn test_parse_slug_rejects_bare_name() {
        assert!(RepoSlug::parse("widgets").is_err());
        assert!(RepoSlug::parse("/widgets").is_err());
        assert!(RepoSlug::parse("octo-org/").is_err());
    }

    #[test]
    #[serial]
    fn test_require_env_missing() {
        unsafe { std::env::remove_var("CI_KIT_TEST_MISSING") };
        let err = require_env("CI_KIT_TEST_MISSING").unwrap_err();
        assert!(err.to_string().contains("CI_KIT_TEST_MISSING"));
    }

    #[test]
    #[serial]
    fn test_empty_env_treated_as_absent() {
        unsafe { std::env::set_var("CI_KIT_TEST_EMPTY", "") };
        assert!(optional_env("CI_KIT_TEST_EMPTY").is_none());
        assert!(require_env("CI_KIT_TEST_EMPTY").is_err());
        unsafe { std::env::remove_var("CI_KIT_TEST_EMPTY") };
    }
}
