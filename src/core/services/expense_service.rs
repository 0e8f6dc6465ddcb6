//! Business logic helpers for managing expenses.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::{Expense, ExpenseDraft, Ledger};

/// Provides validated CRUD helpers for ledger expenses.
pub struct ExpenseService;

impl ExpenseService {
    /// Validates and stores a new expense, returning its identifier.
    pub fn add(ledger: &mut Ledger, mut expense: Expense) -> ServiceResult<Uuid> {
        Self::prepare(ledger, &mut expense)?;
        Ok(ledger.add_expense(expense))
    }

    /// Accepts a receipt draft as a new expense for `account_id`.
    pub fn add_from_draft(
        ledger: &mut Ledger,
        account_id: Uuid,
        draft: ExpenseDraft,
        now: DateTime<Utc>,
    ) -> ServiceResult<Uuid> {
        let expense = draft.into_expense(account_id, now)?;
        Self::add(ledger, expense)
    }

    /// Replaces the expense identified by `id` with `replacement`.
    ///
    /// A template edited without an explicit cursor keeps the cursor it had,
    /// so already generated occurrences are not produced again.
    pub fn update(ledger: &mut Ledger, id: Uuid, mut replacement: Expense) -> ServiceResult<()> {
        let previous_cursor = ledger
            .expense(id)
            .ok_or_else(|| ServiceError::Invalid("Expense not found".into()))?
            .last_processed;
        replacement.id = id;
        if replacement.recurring && replacement.last_processed.is_none() {
            replacement.last_processed = previous_cursor;
        }
        Self::prepare(ledger, &mut replacement)?;
        if let Some(slot) = ledger.expense_mut(id) {
            *slot = replacement;
        }
        ledger.touch();
        Ok(())
    }

    /// Removes the expense identified by `id`, returning the removed instance.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<Expense> {
        let position = ledger
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or_else(|| ServiceError::Invalid("Expense not found".into()))?;
        let removed = ledger.expenses.remove(position);
        ledger.touch();
        Ok(removed)
    }

    /// Expenses of `account_id`, newest first.
    pub fn list(ledger: &Ledger, account_id: Uuid) -> Vec<&Expense> {
        let mut expenses: Vec<&Expense> = ledger.expenses_for(account_id).collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        expenses
    }

    fn prepare(ledger: &Ledger, expense: &mut Expense) -> ServiceResult<()> {
        expense.normalize();
        expense.validate()?;
        if ledger.account(expense.account_id).is_none() {
            return Err(ServiceError::Invalid("Account not found".into()));
        }
        Ok(())
    }
}
