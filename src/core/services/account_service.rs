//! Business logic helpers for validated account mutations.

use tracing::info;
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::{Account, Ledger};

/// Provides validated mutations for [`Account`] entities.
pub struct AccountService;

impl AccountService {
    /// Adds a new account after validating its display name.
    pub fn add(ledger: &mut Ledger, mut account: Account) -> ServiceResult<Uuid> {
        account.name = account.name.trim().to_string();
        Self::validate_name(ledger, None, &account.name)?;
        Ok(ledger.add_account(account))
    }

    /// Updates the name, type and colour of an existing account.
    pub fn edit(ledger: &mut Ledger, id: Uuid, changes: Account) -> ServiceResult<()> {
        let name = changes.name.trim().to_string();
        Self::validate_name(ledger, Some(id), &name)?;
        let account = ledger
            .account_mut(id)
            .ok_or_else(|| ServiceError::Invalid("Account not found".into()))?;
        account.name = name;
        account.kind = changes.kind;
        account.color = changes.color;
        ledger.touch();
        Ok(())
    }

    /// Removes an account together with every expense and budget that
    /// references it. The last remaining account cannot be removed.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<Account> {
        let position = ledger
            .accounts
            .iter()
            .position(|account| account.id == id)
            .ok_or_else(|| ServiceError::Invalid("Account not found".into()))?;
        if ledger.accounts.len() <= 1 {
            return Err(ServiceError::Invalid(
                "Cannot delete the last account".into(),
            ));
        }

        let removed = ledger.accounts.remove(position);
        let expenses_before = ledger.expenses.len();
        let budgets_before = ledger.budgets.len();
        ledger.expenses.retain(|expense| expense.account_id != id);
        ledger.budgets.retain(|budget| budget.account_id != id);
        if ledger.active_account == Some(id) {
            ledger.active_account = ledger.accounts.first().map(|account| account.id);
        }
        ledger.touch();
        info!(
            account = %removed.name,
            expenses = expenses_before - ledger.expenses.len(),
            budgets = budgets_before - ledger.budgets.len(),
            "account removed"
        );
        Ok(removed)
    }

    /// Makes `id` the active account.
    pub fn switch(ledger: &mut Ledger, id: Uuid) -> ServiceResult<()> {
        if ledger.account(id).is_none() {
            return Err(ServiceError::Invalid("Account not found".into()));
        }
        ledger.active_account = Some(id);
        ledger.touch();
        Ok(())
    }

    /// Returns a snapshot of the accounts currently tracked in the ledger.
    pub fn list(ledger: &Ledger) -> Vec<&Account> {
        ledger.accounts.iter().collect()
    }

    fn validate_name(ledger: &Ledger, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()> {
        if candidate.is_empty() {
            return Err(ServiceError::Invalid("Account name cannot be empty".into()));
        }
        let normalized = candidate.to_ascii_lowercase();
        let duplicate = ledger.accounts.iter().any(|account| {
            let name = account.name.trim().to_ascii_lowercase();
            name == normalized && (exclude != Some(account.id))
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "Account `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }
}
