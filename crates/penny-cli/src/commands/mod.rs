//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `ask` - One-shot finance questions (plain and image)
//! - `config` - Resolved configuration display and shared loading helpers
//! - `dashboard` - Expense table and text bar chart rendering
//! - `prompts` - Prompt library management commands
//! - `serve` - Web server command
//! - `session` - Interactive budgeting session

pub mod ask;
pub mod config;
pub mod dashboard;
pub mod prompts;
pub mod serve;
pub mod session;

// Re-export command functions for main.rs
pub use ask::*;
pub use config::*;
pub use dashboard::*;
pub use prompts::*;
pub use serve::*;
pub use session::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
