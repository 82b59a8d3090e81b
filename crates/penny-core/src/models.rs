//! Domain models for Penny

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currency symbol used when none is configured
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// One user-entered spending record
///
/// Only [`crate::store::ExpenseStore::append`] creates expenses, and they are
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub amount: f64,
    pub category: String,
    /// Empty when the user left it out
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Successful append
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    /// Human-readable message, e.g. "Added ₹100 to 'Food'"
    pub message: String,
    pub expense: Expense,
}

impl std::fmt::Display for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Summed amount for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Aggregated spending over a non-empty set of expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total: f64,
    /// In first-seen order
    pub category_totals: Vec<CategoryTotal>,
    /// Categories above the overspending threshold, in first-seen order
    pub overspending: Vec<String>,
}

impl BudgetSummary {
    /// Look up a category's total
    pub fn category_total(&self, category: &str) -> Option<f64> {
        self.category_totals
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.total)
    }
}

/// Output of the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryReport {
    /// No expenses have been logged yet
    NoData,
    Summary(BudgetSummary),
}

impl SummaryReport {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }

    pub fn summary(&self) -> Option<&BudgetSummary> {
        match self {
            Self::NoData => None,
            Self::Summary(s) => Some(s),
        }
    }
}

/// Output of the savings advisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryReport {
    /// No expenses yet; no collaborator was called
    NoData { message: String },
    Advice {
        /// Rendered budget summary
        budget: String,
        /// Web search snippet (or placeholder)
        web_research: String,
        /// Generated tips, unmodified
        tips: String,
    },
}

impl AdvisoryReport {
    /// Render as three labeled markdown sections
    pub fn render(&self) -> String {
        match self {
            Self::NoData { message } => message.clone(),
            Self::Advice {
                budget,
                web_research,
                tips,
            } => format!(
                "\n**Budget:** {}\n\n**Web Research:** {}\n\n**💡 Saving Tips:** {}\n",
                budget, web_research, tips
            ),
        }
    }
}

impl std::fmt::Display for AdvisoryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Data behind the dashboard table and bar chart
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub expenses: Vec<Expense>,
    /// One bar per category, sorted by category name
    pub chart: Vec<CategoryTotal>,
}
