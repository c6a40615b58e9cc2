//! cikit - CI workflow automation tasks
//!
//! One subcommand per workflow step. Every command reads its configuration
//! from environment variables, performs one or two remote calls, and exits
//! 0 on success or 1 on any unrecoverable failure.

mod cli;

use anstream::eprintln;
use clap::{Parser, Subcommand};
use cli::style::Stylize;

#[derive(Parser)]
#[command(name = "cikit", version, about = "CI workflow automation tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Restore the test-data cache for this workflow run
    CacheRestore,
    /// Save the test-data cache for this workflow run
    CacheSave,
    /// Create a release tagged v<version>
    Release {
        /// Version to release (without the leading "v")
        version: String,
    },
    /// Open or update the package-lock update PR
    LockPr,
    /// Open or update the visual-diff goldens PR
    GoldensPr,
    /// Comment on the triggering PR about goldens problems
    GoldensComment,
    /// Delete orphaned visual-diff branches
    GoldensCleanup,
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let result = match args.command {
        Command::CacheRestore => cli::cache::run_restore().await,
        Command::CacheSave => cli::cache::run_save().await,
        Command::Release { version } => cli::release::run_release(&version).await,
        Command::LockPr => cli::lockpr::run_lock_pr().await,
        Command::GoldensPr => cli::goldens::run_goldens_pr().await,
        Command::GoldensComment => cli::goldens::run_goldens_comment().await,
        Command::GoldensCleanup => cli::goldens::run_goldens_cleanup().await,
    };

    if let Err(e) = result {
        eprintln!("{}", e.to_string().error());
        std::process::exit(1);
    }
}
