//! Session-scoped expense store
//!
//! Each session owns exactly one `ExpenseStore`. The store is the only thing
//! allowed to add records; everything else reads through [`ExpenseStore::list`]
//! or takes an owned [`ExpenseStore::snapshot`].

use chrono::Utc;
use tracing::debug;

use crate::error::ValidationError;
use crate::models::{Confirmation, Expense, DEFAULT_CURRENCY_SYMBOL};

/// Ordered, append-only collection of expenses
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    expenses: Vec<Expense>,
    currency_symbol: String,
}

impl Default for ExpenseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self::with_currency(DEFAULT_CURRENCY_SYMBOL)
    }

    /// Create a store whose confirmations use a different currency symbol
    pub fn with_currency(symbol: &str) -> Self {
        Self {
            expenses: Vec::new(),
            currency_symbol: symbol.to_string(),
        }
    }

    /// Validate raw user input and append an expense
    ///
    /// The amount is checked before the category. On error nothing is appended.
    pub fn append(
        &mut self,
        amount: &str,
        category: &str,
        description: Option<&str>,
    ) -> Result<Confirmation, ValidationError> {
        let amount = parse_amount(amount)?;

        if category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }

        let expense = Expense {
            amount,
            category: category.to_string(),
            description: description.unwrap_or_default().to_string(),
            created_at: Utc::now(),
        };

        let message = format!(
            "Added {}{} to '{}'",
            self.currency_symbol, expense.amount, expense.category
        );
        debug!(amount, category = %expense.category, count = self.expenses.len() + 1, "Expense added");

        self.expenses.push(expense.clone());
        Ok(Confirmation { message, expense })
    }

    /// All expenses in insertion order
    pub fn list(&self) -> &[Expense] {
        &self.expenses
    }

    /// Owned copy for readers that must not hold a borrow (e.g. across an await)
    pub fn snapshot(&self) -> Vec<Expense> {
        self.expenses.clone()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }
}

/// Parse a user-entered amount: finite and strictly positive
fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(raw.to_string());

    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_valid_expense() {
        let mut store = ExpenseStore::new();
        let confirmation = store.append("100", "Food", Some("Groceries")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(confirmation.message, "Added ₹100 to 'Food'");

        let stored = &store.list()[0];
        assert_eq!(stored.amount, 100.0);
        assert_eq!(stored.category, "Food");
        assert_eq!(stored.description, "Groceries");
        assert_eq!(stored, &confirmation.expense);
    }

    #[test]
    fn test_append_defaults_description() {
        let mut store = ExpenseStore::new();
        store.append("12.5", "Travel", None).unwrap();
        assert_eq!(store.list()[0].description, "");
    }

    #[test]
    fn test_append_keeps_fractional_amount_in_message() {
        let mut store = ExpenseStore::new();
        let confirmation = store.append(" 12.75 ", "Travel", None).unwrap();
        assert_eq!(confirmation.message, "Added ₹12.75 to 'Travel'");
        assert_eq!(store.list()[0].amount, 12.75);
    }

    #[test]
    fn test_append_keeps_category_as_entered() {
        let mut store = ExpenseStore::new();
        store.append("5", " Food ", None).unwrap();
        assert_eq!(store.list()[0].category, " Food ");
    }

    #[test]
    fn test_append_rejects_non_numeric_amount() {
        let mut store = ExpenseStore::new();
        let err = store.append("ten", "Food", None).unwrap_err();
        assert_eq!(err, ValidationError::InvalidAmount("ten".into()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_rejects_non_finite_and_non_positive_amounts() {
        let mut store = ExpenseStore::new();
        for raw in ["", "NaN", "inf", "-inf", "0", "-5"] {
            let err = store.append(raw, "Food", None).unwrap_err();
            assert_eq!(err.field(), "amount", "input {:?}", raw);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_rejects_blank_category() {
        let mut store = ExpenseStore::new();
        assert_eq!(
            store.append("10", "", None).unwrap_err(),
            ValidationError::EmptyCategory
        );
        assert_eq!(
            store.append("10", "   ", None).unwrap_err(),
            ValidationError::EmptyCategory
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_amount_checked_before_category() {
        let mut store = ExpenseStore::new();
        let err = store.append("abc", "", None).unwrap_err();
        assert_eq!(err.field(), "amount");
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = ExpenseStore::new();
        store.append("1", "C", None).unwrap();
        store.append("2", "A", None).unwrap();
        store.append("3", "B", None).unwrap();

        let categories: Vec<&str> = store.list().iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut store = ExpenseStore::new();
        store.append("1", "Food", None).unwrap();
        let snapshot = store.snapshot();
        store.append("2", "Food", None).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_custom_currency_symbol() {
        let mut store = ExpenseStore::with_currency("$");
        let confirmation = store.append("20", "Rent", None).unwrap();
        assert_eq!(confirmation.message, "Added $20 to 'Rent'");
    }
}
