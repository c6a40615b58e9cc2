//! Release command - create a release for a version tag

use crate::cli::context::HostContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use ci_kit::error::Result;
use ci_kit::release::create_release;

/// Run the release command
pub async fn run_release(version: &str) -> Result<()> {
    let ctx = HostContext::from_env()?;

    println!(
        "{}",
        format!("Creating release \"v{version}\"...").emphasis()
    );

    let tag = create_release(ctx.host.as_ref(), version).await?;

    println!("{} Created release {}", check(), tag.accent());
    Ok(())
}
