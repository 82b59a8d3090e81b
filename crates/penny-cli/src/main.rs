//! Penny CLI - Personal budgeting helper
//!
//! Usage:
//!   penny session                      Interactive budgeting session
//!   penny ask "How do I start saving?" Ask a finance question
//!   penny ask-image --file bill.jpg    Ask about a bill or statement
//!   penny serve --port 3000            Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Session => commands::cmd_session().await,
        Commands::Ask { question } => commands::cmd_ask(&question.join(" ")).await,
        Commands::AskImage { file, question } => {
            commands::cmd_ask_image(&file, &question.join(" ")).await
        }
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => commands::cmd_serve(&host, port, static_dir.as_deref(), allowed_origins).await,
        Commands::Config => commands::cmd_config(),
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { id }) => commands::cmd_prompts_show(&id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
    }
}
