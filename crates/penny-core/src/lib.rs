//! Penny Core Library
//!
//! Shared functionality for the Penny budgeting helper:
//! - Session-scoped expense store
//! - Budget aggregation with overspending detection
//! - Pluggable AI backends (Gemini, OpenAI-compatible, Ollama)
//! - Web search backends (Tavily)
//! - Savings advisor and finance Q&A orchestrators
//! - Prompt library for customizable AI prompts

pub mod advisor;
pub mod ai;
pub mod assistant;
pub mod budget;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod qa;
pub mod search;
pub mod store;

/// Test utilities including a mock AI/search API server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{AdvisorSettings, SAVINGS_SEARCH_QUERY, WEB_SEARCH_UNAVAILABLE};
pub use ai::{
    AIClient, GeminiBackend, MessagePart, MockBackend, OllamaBackend, OpenAICompatibleBackend,
    TextGenerator, VisionGenerator,
};
pub use assistant::Assistant;
pub use budget::{dashboard, summarize, OVERSPENDING_THRESHOLD};
pub use config::Config;
pub use error::{Error, Result, ValidationError};
pub use models::{
    AdvisoryReport, BudgetSummary, CategoryTotal, Confirmation, DashboardData, Expense,
    SummaryReport,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use search::{MockSearch, SearchClient, SearchResult, TavilyBackend, WebSearch};
pub use store::ExpenseStore;
