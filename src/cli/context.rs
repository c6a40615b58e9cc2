//! Shared command context for CLI commands
//!
//! Extracts the common setup shared by every command that talks to the
//! hosting API: gather the connection settings once, build the host.

use ci_kit::config::GitHubEnv;
use ci_kit::error::Result;
use ci_kit::host::{GitHubHost, PrHost};

/// Shared context for commands that interact with the hosting API
pub struct HostContext {
    /// Connection settings gathered from the environment
    pub env: GitHubEnv,
    /// Host bound to the primary token
    pub host: Box<dyn PrHost>,
}

impl HostContext {
    /// Gather the environment and build the primary host.
    pub fn from_env() -> Result<Self> {
        let env = GitHubEnv::from_env()?;
        let host = GitHubHost::new(
            &env.token,
            env.slug.clone(),
            env.api_url.as_deref(),
            &env.user_agent,
        )?;

        Ok(Self {
            env,
            host: Box::new(host),
        })
    }

    /// Build a second host bound to a different token.
    ///
    /// Auto-merge and approval tokens are separate identities; each gets
    /// its own host against the same repository.
    pub fn host_with_token(&self, token: &str) -> Result<Box<dyn PrHost>> {
        let host = GitHubHost::new(
            token,
            self.env.slug.clone(),
            self.env.api_url.as_deref(),
            &self.env.user_agent,
        )?;
        Ok(Box::new(host))
    }
}
