//! Error types for ci-kit

use thiserror::Error;

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ci-kit operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required environment variable is missing or empty
    #[error("required environment variable `{0}` is missing or empty")]
    MissingEnv(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A remote precondition did not hold (wrong branch, closed PR, ...)
    #[error("{0}")]
    Precondition(String),

    /// Unsupported auto-merge method
    #[error("unsupported merge method `{0}`: must be one of `merge`, `squash` or `rebase`")]
    UnsupportedMergeMethod(String),

    /// GitHub API error (octocrab)
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// GitHub API error with additional context
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Actions cache service error
    #[error("cache service error: {0}")]
    Cache(String),

    /// Filesystem error (archives, step-output files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
