//! Step outputs for downstream workflow steps
//!
//! Outputs are appended to the file named by `GITHUB_OUTPUT`. Outside a
//! workflow run (no `GITHUB_OUTPUT`) the legacy workflow command is printed
//! instead so the value is still visible in logs.

use crate::config::optional_env;
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;

/// Publish a step output `name=value`.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    if let Some(path) = optional_env("GITHUB_OUTPUT") {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{name}={value}")?;
    } else {
        println!("::set-output name={name}::{value}");
    }
    Ok(())
}
