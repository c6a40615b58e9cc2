//! CI workflow automation tasks
//!
//! Each module backs one workflow step: saving/restoring the test-data
//! cache, creating a release, reconciling the package-lock update PR, and
//! managing visual-diff golden-image PRs. Commands are short-lived: read
//! the environment, make one or two API calls, exit.

pub mod cache;
pub mod config;
pub mod effects;
pub mod error;
pub mod goldens;
pub mod host;
pub mod lockdiff;
pub mod lockpr;
pub mod outputs;
pub mod release;
pub mod types;
