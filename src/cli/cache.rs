//! Cache commands - save and restore the test-data cache

use crate::cli::style::{Stylize, check};
use anstream::println;
use ci_kit::cache::{CacheClient, fallback_prefix, primary_key};
use ci_kit::config::require_env;
use ci_kit::error::Result;
use std::path::PathBuf;

/// Configuration for the cache commands, gathered once from the environment
struct CacheConfig {
    namespace: String,
    paths: Vec<String>,
    run_id: String,
    run_attempt: String,
    cache_url: String,
    runtime_token: String,
}

impl CacheConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            namespace: require_env("CACHE_NAMESPACE")?,
            paths: require_env("CACHE_PATHS")?
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            run_id: require_env("GITHUB_RUN_ID")?,
            run_attempt: require_env("GITHUB_RUN_ATTEMPT")?,
            cache_url: require_env("ACTIONS_CACHE_URL")?,
            runtime_token: require_env("ACTIONS_RUNTIME_TOKEN")?,
        })
    }

    fn key(&self) -> String {
        primary_key(&self.namespace, &self.run_id, &self.run_attempt)
    }
}

/// Run the cache-restore command
pub async fn run_restore() -> Result<()> {
    let config = CacheConfig::from_env()?;
    let client = CacheClient::new(&config.cache_url, &config.runtime_token)?;
    let key = config.key();
    let fallbacks = vec![fallback_prefix(&config.namespace, &config.run_id)];
    let workdir = PathBuf::from(".");

    println!(
        "{}",
        format!("Restoring cache with key {key}...").emphasis()
    );

    match client
        .restore(&key, &fallbacks, &config.paths, &workdir)
        .await?
    {
        Some(matched) => {
            println!("{} Restored cache with key: {}", check(), matched.accent());
        }
        None => {
            // A miss is informational - the caller regenerates the data
            println!(
                "{}",
                format!("No cache found for key {key} or prefix {}", fallbacks[0]).muted()
            );
        }
    }
    Ok(())
}

/// Run the cache-save command
pub async fn run_save() -> Result<()> {
    let config = CacheConfig::from_env()?;
    let client = CacheClient::new(&config.cache_url, &config.runtime_token)?;
    let key = config.key();
    let workdir = PathBuf::from(".");

    println!("{}", format!("Saving cache with key {key}...").emphasis());

    match client.save(&key, &config.paths, &workdir).await? {
        Some(_) => {
            println!("{} Saved cache with key: {}", check(), key.accent());
        }
        None => {
            println!(
                "{}",
                format!("Cache key {key} already reserved, nothing to do").muted()
            );
        }
    }
    Ok(())
}
