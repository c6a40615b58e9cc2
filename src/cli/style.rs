//! Terminal styling helpers for CLI output

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Styled-string helpers used across the commands
pub trait Stylize: Display + Sized {
    /// De-emphasized text (status detail, hints)
    fn muted(&self) -> String {
        format!("{}", self.dimmed())
    }

    /// Highlighted value (branch names, keys, PR numbers)
    fn accent(&self) -> String {
        format!("{}", self.cyan())
    }

    /// Section headers and progress statements
    fn emphasis(&self) -> String {
        format!("{}", self.blue())
    }

    /// Success messages
    fn success(&self) -> String {
        format!("{}", self.green())
    }

    /// Non-fatal problems
    fn warn(&self) -> String {
        format!("{}", self.yellow())
    }

    /// Fatal errors
    fn error(&self) -> String {
        format!("{}", self.red())
    }
}

impl<T: Display> Stylize for T {}

/// Check mark for completed operations
pub fn check() -> String {
    "✓".green().to_string()
}
