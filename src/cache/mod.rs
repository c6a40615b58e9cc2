//! Test-data cache save/restore
//!
//! Thin client for the actions cache service. Keys are scoped to one
//! workflow run: the primary key includes the run attempt, and restore
//! falls back to any earlier attempt of the same run via a shared prefix.

mod archive;
mod client;

pub use archive::{create_archive, extract_archive};
pub use client::CacheClient;

/// Primary cache key: `<namespace>-<runId>-<runAttempt>`
pub fn primary_key(namespace: &str, run_id: &str, run_attempt: &str) -> String {
    format!("{namespace}-{run_id}-{run_attempt}")
}

/// Fallback key prefix shared by all attempts of a run: `<namespace>-<runId>-`
pub fn fallback_prefix(namespace: &str, run_id: &str) -> String {
    format!("{namespace}-{run_id}-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(primary_key("d2l-test", "8675309", "2"), "d2l-test-8675309-2");
    }

    #[test]
    fn test_fallback_is_prefix_of_primary() {
        let key = primary_key("d2l-test", "8675309", "2");
        let prefix = fallback_prefix("d2l-test", "8675309");
        assert_eq!(prefix, "d2l-test-8675309-");
        assert!(key.starts_with(&prefix));
    }
}
