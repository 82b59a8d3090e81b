//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Penny - Track spending and get practical savings tips
#[derive(Parser)]
#[command(name = "penny")]
#[command(about = "Personal budgeting helper with AI savings tips", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive budgeting session (expenses live until you quit)
    Session,

    /// Ask a finance question
    Ask {
        /// The question (quotes optional)
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Ask a question about a bill or bank statement image
    AskImage {
        /// Image file (JPEG or PNG)
        #[arg(short, long)]
        file: PathBuf,

        /// The question (quotes optional)
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory of static UI files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },

    /// Show resolved configuration and backend selection
    Config,

    /// Manage AI prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List prompts and their override status
    List,

    /// Show a prompt's content
    Show {
        /// Prompt ID (savings_advice, finance_qa, image_qa)
        id: String,
    },

    /// Print the override directory
    Path,
}
