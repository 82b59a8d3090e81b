//! Interactive budgeting session
//!
//! One session owns one in-memory `ExpenseStore`; everything is discarded on
//! quit. AI commands are disabled (with a notice) when no backend is configured.

use std::path::Path;

use anyhow::Result;
use penny_core::{summarize, Assistant, ExpenseStore};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use super::{ask_image_text, ask_text, build_assistant, load_config, read_image, render_dashboard};
use super::ask::unavailable_line;
use super::dashboard::render_expense_table;

const HELP: &str = "\
Commands:
  add <amount> <category> [description]   Log an expense
  list                                    Show all expenses
  analyze                                 Category breakdown and overspending
  tips                                    Savings tips from your spending + the web
  ask <question>                          Ask a finance question
  ask-image <file> <question>             Ask about a bill or bank statement image
  dashboard                               Expense table and category chart
  help                                    Show this help
  quit                                    End the session (expenses are discarded)
";

const AI_DISABLED: &str =
    "⚠️  AI features are disabled. Set GEMINI_API_KEY (or AI_BACKEND) and restart the session.";

/// Result of handling one input line
#[derive(Debug, PartialEq, Eq)]
pub enum ShellOutcome {
    Output(String),
    Quit,
}

/// State of one interactive session
pub struct SessionShell {
    store: ExpenseStore,
    assistant: Option<Assistant>,
}

impl SessionShell {
    pub fn new(currency_symbol: &str, assistant: Option<Assistant>) -> Self {
        Self {
            store: ExpenseStore::with_currency(currency_symbol),
            assistant,
        }
    }

    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    /// Handle one line of input
    pub async fn handle(&mut self, line: &str) -> ShellOutcome {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        let output = match command.to_lowercase().as_str() {
            "" => String::new(),
            "add" => self.add(rest),
            "list" => render_expense_table(self.store.list(), self.store.currency_symbol()),
            "analyze" => summarize(self.store.list()).render(self.store.currency_symbol()),
            "tips" => self.tips().await,
            "ask" => match &self.assistant {
                Some(assistant) => ask_text(assistant, rest).await,
                None => AI_DISABLED.to_string(),
            },
            "ask-image" => self.ask_image(rest).await,
            "dashboard" => render_dashboard(self.store.list(), self.store.currency_symbol()),
            "help" | "?" => HELP.to_string(),
            "quit" | "exit" => return ShellOutcome::Quit,
            other => format!("Unknown command: {}. Type 'help' to see commands.", other),
        };
        ShellOutcome::Output(output)
    }

    fn add(&mut self, args: &str) -> String {
        let mut parts = args.splitn(3, char::is_whitespace);
        let amount = parts.next().unwrap_or("");
        let category = parts.next().unwrap_or("");
        let description = parts.next().map(str::trim).filter(|d| !d.is_empty());

        match self.store.append(amount, category, description) {
            Ok(confirmation) => format!("✅ {}", confirmation),
            Err(e) => format!(
                "❌ {}\n   Usage: add <amount> <category> [description]",
                e
            ),
        }
    }

    async fn tips(&self) -> String {
        let Some(assistant) = &self.assistant else {
            return AI_DISABLED.to_string();
        };
        match assistant.advise(&self.store.snapshot()).await {
            Ok(report) => report.render(),
            Err(e) => unavailable_line(&e),
        }
    }

    async fn ask_image(&self, args: &str) -> String {
        let Some(assistant) = &self.assistant else {
            return AI_DISABLED.to_string();
        };
        let (path, question) = match args.split_once(char::is_whitespace) {
            Some((p, q)) => (p, q.trim()),
            None => (args, ""),
        };
        if path.is_empty() {
            return "Usage: ask-image <file> <question>".to_string();
        }

        match read_image(Path::new(path)) {
            Ok(image) => ask_image_text(assistant, question, &image).await,
            Err(e) => format!("❌ {:#}", e),
        }
    }
}

/// Run the interactive session on stdin/stdout
pub async fn cmd_session() -> Result<()> {
    let config = load_config()?;
    let assistant = match build_assistant(&config) {
        Ok(a) => Some(a),
        Err(e) => {
            warn!("{:#}", e);
            None
        }
    };

    let mut shell = SessionShell::new(&config.display.currency_symbol, assistant);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all("💰 Penny budgeting session. Type 'help' for commands.\n".as_bytes())
        .await?;

    loop {
        stdout.write_all(b"penny> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match shell.handle(&line).await {
            ShellOutcome::Output(text) if text.is_empty() => {}
            ShellOutcome::Output(text) => {
                stdout.write_all(text.as_bytes()).await?;
                if !text.ends_with('\n') {
                    stdout.write_all(b"\n").await?;
                }
            }
            ShellOutcome::Quit => break,
        }
    }

    stdout
        .write_all(format!("Goodbye! {} expense(s) discarded.\n", shell.store().len()).as_bytes())
        .await?;
    Ok(())
}
