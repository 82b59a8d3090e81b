//! Budget aggregation
//!
//! Groups expenses by category, computes the overall total and flags
//! categories whose total is strictly above [`OVERSPENDING_THRESHOLD`].
//! Nothing is cached; every call recomputes from the expenses it is given.

use std::collections::HashMap;

use crate::models::{
    BudgetSummary, CategoryTotal, DashboardData, Expense, SummaryReport, DEFAULT_CURRENCY_SYMBOL,
};

/// Category totals above this amount are flagged as overspending
pub const OVERSPENDING_THRESHOLD: f64 = 500.0;

/// Message shown when there is nothing to summarize
pub const NO_EXPENSES_MESSAGE: &str = "No expenses yet. Add some first.";

/// Summarize a set of expenses
pub fn summarize(expenses: &[Expense]) -> SummaryReport {
    if expenses.is_empty() {
        return SummaryReport::NoData;
    }

    let category_totals = group_by_category(expenses);
    // Summed from the subtotals: total == sum(category_totals) exactly
    let total = category_totals.iter().map(|c| c.total).sum();
    let overspending = category_totals
        .iter()
        .filter(|c| c.total > OVERSPENDING_THRESHOLD)
        .map(|c| c.category.clone())
        .collect();

    SummaryReport::Summary(BudgetSummary {
        total,
        category_totals,
        overspending,
    })
}

/// Sum amounts per category, keeping first-seen order
fn group_by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for expense in expenses {
        match index.get(expense.category.as_str()) {
            Some(&i) => totals[i].total += expense.amount,
            None => {
                index.insert(expense.category.as_str(), totals.len());
                totals.push(CategoryTotal {
                    category: expense.category.clone(),
                    total: expense.amount,
                });
            }
        }
    }

    totals
}

impl SummaryReport {
    /// Render the report as text with the given currency symbol
    ///
    /// Amounts are rounded to whole units for display only.
    pub fn render(&self, currency: &str) -> String {
        let summary = match self {
            Self::NoData => return NO_EXPENSES_MESSAGE.to_string(),
            Self::Summary(s) => s,
        };

        let mut lines = vec![format!("Total spent: {}{:.0}", currency, summary.total)];
        lines.push("By category:".to_string());

        for c in &summary.category_totals {
            lines.push(format!("   - {}: {}{:.0}", c.category, currency, c.total));
        }

        if summary.overspending.is_empty() {
            lines.push("No overspending detected!".to_string());
        } else {
            lines.push(format!("Overspending: {}", summary.overspending.join(", ")));
        }

        lines.join("\n")
    }
}

impl std::fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(DEFAULT_CURRENCY_SYMBOL))
    }
}

/// Build the dashboard table and chart series
///
/// Chart bars are sorted by category name.
pub fn dashboard(expenses: &[Expense]) -> DashboardData {
    let mut chart = group_by_category(expenses);
    chart.sort_by(|a, b| a.category.cmp(&b.category));

    DashboardData {
        expenses: expenses.to_vec(),
        chart,
    }
}
