//! Dashboard rendering: expense table and category bar chart

use penny_core::{dashboard, DashboardData, Expense};

use super::truncate;

/// Widest bar in the chart
const BAR_WIDTH: usize = 30;

/// Render the expense table
pub fn render_expense_table(expenses: &[Expense], currency: &str) -> String {
    if expenses.is_empty() {
        return "No expenses yet. Add some first.\n".to_string();
    }

    let mut out = format!(
        "  {:>3}  {:>10}  {:<16}  {:<24}  {}\n",
        "#", "AMOUNT", "CATEGORY", "DESCRIPTION", "ADDED"
    );
    out.push_str(&format!("  {}\n", "-".repeat(72)));

    for (i, e) in expenses.iter().enumerate() {
        out.push_str(&format!(
            "  {:>3}  {:>10}  {:<16}  {:<24}  {}\n",
            i + 1,
            format!("{}{:.2}", currency, e.amount),
            truncate(&e.category, 16),
            truncate(&e.description, 24),
            e.created_at.format("%H:%M:%S")
        ));
    }
    out
}

/// Render per-category totals as a horizontal bar chart
pub fn render_bar_chart(data: &DashboardData, currency: &str) -> String {
    let max = data.chart.iter().map(|c| c.total).fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return String::new();
    }

    let label_width = data
        .chart
        .iter()
        .map(|c| c.category.chars().count().min(16))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for c in &data.chart {
        let width = ((c.total / max) * BAR_WIDTH as f64).round() as usize;
        out.push_str(&format!(
            "  {:<w$} │{} {}{:.0}\n",
            truncate(&c.category, 16),
            "█".repeat(width.max(1)),
            currency,
            c.total,
            w = label_width
        ));
    }
    out
}

/// Full dashboard: header, table and chart
pub fn render_dashboard(expenses: &[Expense], currency: &str) -> String {
    let data = dashboard(expenses);

    let mut out = String::new();
    out.push('\n');
    out.push_str("╭─────────────────────────────────────────╮\n");
    out.push_str("│          💰 Penny Dashboard             │\n");
    out.push_str("╰─────────────────────────────────────────╯\n");
    out.push('\n');
    out.push_str(&render_expense_table(&data.expenses, currency));

    if !data.chart.is_empty() {
        out.push_str("\n  Spending by category:\n");
        out.push_str(&render_bar_chart(&data, currency));
    }
    out
}
