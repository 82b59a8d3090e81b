//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::sync::Arc;

use penny_core::ai::MOCK_RESPONSE;
use penny_core::{Assistant, Config, ExpenseStore, MockBackend, MockSearch, PromptLibrary};

use crate::commands::{
    self, describe_config, describe_prompt, describe_prompts, read_image, render_bar_chart,
    render_dashboard, render_expense_table, truncate, SessionShell, ShellOutcome,
};

fn mock_assistant(llm: MockBackend, search: MockSearch) -> Assistant {
    Assistant::new(Arc::new(llm.clone()), Arc::new(llm), Arc::new(search))
}

fn shell_with_mocks() -> (SessionShell, MockBackend, MockSearch) {
    let llm = MockBackend::new();
    let search = MockSearch::new();
    let shell = SessionShell::new("₹", Some(mock_assistant(llm.clone(), search.clone())));
    (shell, llm, search)
}

async fn output(shell: &mut SessionShell, line: &str) -> String {
    match shell.handle(line).await {
        ShellOutcome::Output(text) => text,
        ShellOutcome::Quit => panic!("unexpected quit for {:?}", line),
    }
}

fn scenario_store() -> ExpenseStore {
    let mut store = ExpenseStore::new();
    store.append("200", "Food", Some("lunch")).unwrap();
    store.append("500", "Food", None).unwrap();
    store.append("50", "Travel", Some("bus")).unwrap();
    store
}

// ========== Helpers ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long string", 10), "this is...");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("₹₹₹₹₹₹₹₹₹₹₹₹", 6), "₹₹₹...");
}

#[test]
fn test_read_image() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

    let bytes = read_image(file.path()).unwrap();
    assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
}

#[test]
fn test_read_image_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_image(&dir.path().join("nope.jpg")).unwrap_err();
    assert!(err.to_string().contains("Failed to read image"));
}

// ========== Session Shell Tests ==========

#[tokio::test]
async fn test_shell_add_and_list() {
    let mut shell = SessionShell::new("₹", None);

    let out = output(&mut shell, "add 250 Groceries weekly shop").await;
    assert_eq!(out, "✅ Added ₹250 to 'Groceries'");

    let list = output(&mut shell, "list").await;
    assert!(list.contains("Groceries"));
    assert!(list.contains("weekly shop"));
    assert_eq!(shell.store().len(), 1);
    assert_eq!(shell.store().list()[0].description, "weekly shop");
}

#[tokio::test]
async fn test_shell_add_without_description() {
    let mut shell = SessionShell::new("₹", None);
    output(&mut shell, "add 99.5 Rent").await;

    let expense = &shell.store().list()[0];
    assert_eq!(expense.amount, 99.5);
    assert_eq!(expense.category, "Rent");
    assert_eq!(expense.description, "");
}

#[tokio::test]
async fn test_shell_add_validation() {
    let mut shell = SessionShell::new("₹", None);

    let out = output(&mut shell, "add abc Food").await;
    assert!(out.starts_with("❌ Amount must be a positive number"));
    assert!(out.contains("Usage: add"));

    let out = output(&mut shell, "add -5 Food").await;
    assert!(out.starts_with("❌ Amount must be a positive number"));

    let out = output(&mut shell, "add 100").await;
    assert!(out.starts_with("❌ Category cannot be empty"));

    let out = output(&mut shell, "add").await;
    assert!(out.starts_with("❌ Amount must be a positive number"));

    assert_eq!(shell.store().len(), 0);
}

#[tokio::test]
async fn test_shell_analyze() {
    let mut shell = SessionShell::new("₹", None);
    assert_eq!(
        output(&mut shell, "analyze").await,
        "No expenses yet. Add some first."
    );

    output(&mut shell, "add 200 Food").await;
    output(&mut shell, "add 500 Food").await;
    output(&mut shell, "add 50 Travel").await;

    let out = output(&mut shell, "analyze").await;
    assert!(out.contains("Total spent: ₹750"));
    assert!(out.contains("   - Food: ₹700"));
    assert!(out.contains("   - Travel: ₹50"));
    assert!(out.contains("Overspending: Food"));
}

#[tokio::test]
async fn test_shell_blank_and_unknown_lines() {
    let mut shell = SessionShell::new("₹", None);
    assert_eq!(output(&mut shell, "   ").await, "");

    let out = output(&mut shell, "budget please").await;
    assert!(out.contains("Unknown command: budget"));

    let help = output(&mut shell, "HELP").await;
    assert!(help.contains("add <amount> <category>"));
}

#[tokio::test]
async fn test_shell_quit() {
    let mut shell = SessionShell::new("₹", None);
    assert_eq!(shell.handle("quit").await, ShellOutcome::Quit);
    assert_eq!(shell.handle("exit").await, ShellOutcome::Quit);
}

#[tokio::test]
async fn test_shell_ai_commands_without_backend() {
    let mut shell = SessionShell::new("₹", None);
    output(&mut shell, "add 100 Food").await;

    for line in ["tips", "ask how do I save?", "ask-image bill.jpg what is due?"] {
        let out = output(&mut shell, line).await;
        assert!(out.contains("AI features are disabled"), "{}", line);
    }
}

#[tokio::test]
async fn test_shell_tips() {
    let (mut shell, llm, search) = shell_with_mocks();
    output(&mut shell, "add 700 Food").await;

    let out = output(&mut shell, "tips").await;
    assert!(out.contains("**Budget:**"));
    assert!(out.contains("Overspending: Food"));
    assert!(out.contains("**Web Research:**"));
    assert!(out.contains(MOCK_RESPONSE));
    assert_eq!(llm.call_count(), 1);
    assert_eq!(search.call_count(), 1);
}

#[tokio::test]
async fn test_shell_tips_without_expenses() {
    let (mut shell, llm, search) = shell_with_mocks();

    let out = output(&mut shell, "tips").await;
    assert_eq!(out, "No expenses yet. Add some first.");
    assert_eq!(llm.call_count(), 0);
    assert_eq!(search.call_count(), 0);
}

#[tokio::test]
async fn test_shell_tips_generation_failure() {
    let mut shell = SessionShell::new(
        "₹",
        Some(mock_assistant(MockBackend::failing(), MockSearch::new())),
    );
    output(&mut shell, "add 100 Food").await;

    let out = output(&mut shell, "tips").await;
    assert!(out.contains("Savings tips are unavailable right now"));
}

#[tokio::test]
async fn test_shell_ask() {
    let llm = MockBackend::with_response("Start with an emergency fund.");
    let mut shell = SessionShell::new("₹", Some(mock_assistant(llm.clone(), MockSearch::new())));

    let out = output(&mut shell, "ask What is an emergency fund?").await;
    assert_eq!(out, "Start with an emergency fund.");
    assert!(llm
        .last_prompt()
        .unwrap()
        .contains("What is an emergency fund?"));
}

#[tokio::test]
async fn test_shell_ask_blank_question() {
    let (mut shell, llm, _) = shell_with_mocks();

    let out = output(&mut shell, "ask").await;
    assert_eq!(out, "Please ask a question.");
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_shell_ask_failure() {
    let mut shell = SessionShell::new(
        "₹",
        Some(mock_assistant(MockBackend::failing(), MockSearch::new())),
    );

    let out = output(&mut shell, "ask what is a budget?").await;
    assert!(out.contains("The AI service is unavailable right now"));
}

#[tokio::test]
async fn test_shell_ask_image() {
    let (mut shell, llm, _) = shell_with_mocks();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

    let line = format!("ask-image {} What is the total due?", file.path().display());
    let out = output(&mut shell, &line).await;
    assert_eq!(out, MOCK_RESPONSE);
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_shell_ask_image_errors() {
    let (mut shell, llm, _) = shell_with_mocks();

    let out = output(&mut shell, "ask-image").await;
    assert!(out.starts_with("Usage: ask-image"));

    let out = output(&mut shell, "ask-image /definitely/missing.png what?").await;
    assert!(out.contains("Failed to read image"));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_shell_dashboard() {
    let mut shell = SessionShell::new("₹", None);
    output(&mut shell, "add 50 Travel").await;
    output(&mut shell, "add 700 Food").await;

    let out = output(&mut shell, "dashboard").await;
    assert!(out.contains("Penny Dashboard"));
    assert!(out.contains("Spending by category:"));

    let food = out.find("Food   │").unwrap();
    let travel = out.find("Travel │").unwrap();
    assert!(food < travel, "chart bars are sorted by category");
}

// ========== Dashboard Rendering Tests ==========

#[test]
fn test_render_expense_table_empty() {
    assert_eq!(
        render_expense_table(&[], "₹"),
        "No expenses yet. Add some first.\n"
    );
}

#[test]
fn test_render_expense_table_keeps_order() {
    let store = scenario_store();
    let table = render_expense_table(store.list(), "₹");
    let lines: Vec<&str> = table.lines().collect();

    // header + rule + 3 rows
    assert_eq!(lines.len(), 5);
    assert!(lines[2].contains("₹200.00") && lines[2].contains("lunch"));
    assert!(lines[3].contains("₹500.00"));
    assert!(lines[4].contains("Travel") && lines[4].contains("bus"));
}

#[test]
fn test_render_bar_chart_scales_to_largest() {
    let store = scenario_store();
    let data = penny_core::dashboard(store.list());
    let chart = render_bar_chart(&data, "$");
    let lines: Vec<&str> = chart.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(&"█".repeat(30)));
    assert!(lines[0].ends_with("$700"));
    // 50/700 of the width still shows at least one block
    assert_eq!(lines[1].matches('█').count(), 2);
    assert!(lines[1].ends_with("$50"));
}

#[test]
fn test_render_dashboard_empty() {
    let out = render_dashboard(&[], "₹");
    assert!(out.contains("No expenses yet"));
    assert!(!out.contains("Spending by category"));
}

// ========== Prompts Command Tests ==========

#[test]
fn test_describe_prompts() {
    let mut library = PromptLibrary::embedded_only();
    let out = describe_prompts(&mut library);

    assert!(out.contains("savings_advice"));
    assert!(out.contains("finance_qa"));
    assert!(out.contains("image_qa"));
    assert!(out.contains("Default"));
    assert!(!out.contains("✓ Custom"));
    assert!(out.contains("Override directory: (not available)"));
}

#[test]
fn test_describe_prompt() {
    let mut library = PromptLibrary::embedded_only();
    let out = describe_prompt(&mut library, "savings_advice").unwrap();

    assert!(out.starts_with("Prompt: savings_advice"));
    assert!(out.contains("Source: Default"));
    assert!(out.contains("{{budget_info}}"));
    assert!(out.contains("{{web_tips}}"));
}

#[test]
fn test_describe_prompt_override() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("finance_qa.md"),
        "---\nid: finance_qa\nversion: 9\ntask_type: qa\n---\nBe brief: {{question}}\n",
    )
    .unwrap();

    let mut library = PromptLibrary::with_override_dir(dir.path().to_path_buf());
    let out = describe_prompt(&mut library, "finance_qa").unwrap();
    assert!(out.contains("Source: Override"));
    assert!(out.contains("Be brief: {{question}}"));

    let listing = describe_prompts(&mut library);
    assert!(listing.contains("✓ Custom"));
}

#[test]
fn test_describe_prompt_unknown_id() {
    let mut library = PromptLibrary::embedded_only();
    let err = describe_prompt(&mut library, "tax_filing").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Unknown prompt ID: tax_filing"));
    assert!(msg.contains("savings_advice"));
}

// ========== Config Command Tests ==========

#[test]
fn test_describe_config_embedded() {
    let config = Config::embedded().unwrap();
    let out = describe_config(&config);

    assert!(out.contains("Penny Configuration"));
    assert!(out.contains("AI backend: gemini"));
    assert!(out.contains("Max results: 1"));
    assert!(out.contains("Snippet: >50 chars → first 300 + \"...\""));
    assert!(out.contains("Currency symbol: ₹"));
    assert!(out.contains("TAVILY_API_KEY"));
}

#[test]
fn test_describe_config_never_prints_secrets() {
    let mut config = Config::embedded().unwrap();
    config.ai.backend = "mock".to_string();
    let out = describe_config(&config);

    assert!(out.contains("AI backend: mock"));
    assert!(out.contains("Host: mock://localhost"));
    for line in out.lines().filter(|l| l.contains("_API_KEY")) {
        assert!(line.ends_with("set") || line.ends_with("not set"));
    }
}

#[test]
fn test_build_assistant_mock_backend() {
    let mut config = Config::embedded().unwrap();
    config.ai.backend = "mock".to_string();
    config.search.backend = "mock".to_string();
    assert!(commands::build_assistant(&config).is_ok());
}
