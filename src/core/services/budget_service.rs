//! Validated budget mutations.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::{Budget, Ledger};

/// Stateless helpers that keep one budget per category, period and account.
pub struct BudgetService;

impl BudgetService {
    pub fn add(ledger: &mut Ledger, budget: Budget) -> ServiceResult<Uuid> {
        Self::validate(ledger, None, &budget)?;
        Ok(ledger.add_budget(budget))
    }

    /// Replaces the budget identified by `id` with `changes`.
    pub fn update(ledger: &mut Ledger, id: Uuid, mut changes: Budget) -> ServiceResult<()> {
        if ledger.budget(id).is_none() {
            return Err(ServiceError::Invalid("Budget not found".into()));
        }
        changes.id = id;
        Self::validate(ledger, Some(id), &changes)?;
        if let Some(slot) = ledger.budget_mut(id) {
            *slot = changes;
        }
        ledger.touch();
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<Budget> {
        let position = ledger
            .budgets
            .iter()
            .position(|budget| budget.id == id)
            .ok_or_else(|| ServiceError::Invalid("Budget not found".into()))?;
        let removed = ledger.budgets.remove(position);
        ledger.touch();
        Ok(removed)
    }

    /// Budgets of `account_id` ordered by category, then period.
    pub fn list(ledger: &Ledger, account_id: Uuid) -> Vec<&Budget> {
        let mut budgets: Vec<&Budget> = ledger.budgets_for(account_id).collect();
        budgets.sort_by(|a, b| a.category.cmp(&b.category).then(a.period.cmp(&b.period)));
        budgets
    }

    fn validate(ledger: &Ledger, exclude: Option<Uuid>, budget: &Budget) -> ServiceResult<()> {
        if !budget.limit.is_finite() || budget.limit <= 0.0 {
            return Err(ServiceError::Invalid(
                "Budget limit must be a positive number".into(),
            ));
        }
        if let Some(threshold) = budget.alert_threshold {
            if !(threshold > 0.0 && threshold <= 100.0) {
                return Err(ServiceError::Invalid(
                    "Alert threshold must be between 0 and 100".into(),
                ));
            }
        }
        if ledger.account(budget.account_id).is_none() {
            return Err(ServiceError::Invalid("Account not found".into()));
        }
        let duplicate = ledger.budgets.iter().any(|existing| {
            existing.account_id == budget.account_id
                && existing.category == budget.category
                && existing.period == budget.period
                && exclude != Some(existing.id)
        });
        if duplicate {
            return Err(ServiceError::Invalid(format!(
                "A {} budget for {} already exists",
                budget.period.to_string().to_ascii_lowercase(),
                budget.category
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{BudgetPeriod, Category};

    #[test]
    fn one_budget_per_category_period_and_account() {
        let mut ledger = Ledger::new();
        let personal = ledger.accounts[0].id;
        let business = ledger.accounts[1].id;
        BudgetService::add(&mut ledger, Budget::new(personal, Category::Travel, 500.0, BudgetPeriod::Monthly))
            .unwrap();
        let err = BudgetService::add(
            &mut ledger,
            Budget::new(personal, Category::Travel, 900.0, BudgetPeriod::Monthly),
        )
        .expect_err("duplicate");
        assert!(matches!(err, ServiceError::Invalid(ref message) if message.contains("already exists")));

        BudgetService::add(&mut ledger, Budget::new(personal, Category::Travel, 5000.0, BudgetPeriod::Yearly))
            .unwrap();
        BudgetService::add(&mut ledger, Budget::new(business, Category::Travel, 500.0, BudgetPeriod::Monthly))
            .unwrap();
        assert_eq!(ledger.budgets.len(), 3);
    }

    #[test]
    fn limits_and_thresholds_are_validated() {
        let mut ledger = Ledger::new();
        let account = ledger.accounts[0].id;
        for limit in [0.0, -1.0, f64::NAN] {
            let budget = Budget::new(account, Category::Other, limit, BudgetPeriod::Monthly);
            assert!(BudgetService::add(&mut ledger, budget).is_err());
        }
        for threshold in [0.0, 120.0] {
            let budget =
                Budget::new(account, Category::Other, 10.0, BudgetPeriod::Monthly).with_threshold(threshold);
            assert!(BudgetService::add(&mut ledger, budget).is_err());
        }
        assert!(ledger.budgets.is_empty());
    }

    #[test]
    fn update_keeps_identity_and_allows_same_slot() {
        let mut ledger = Ledger::new();
        let account = ledger.accounts[0].id;
        let id = BudgetService::add(&mut ledger, Budget::new(account, Category::Housing, 100.0, BudgetPeriod::Monthly))
            .unwrap();
        let changes = Budget::new(account, Category::Housing, 250.0, BudgetPeriod::Monthly).with_threshold(90.0);
        BudgetService::update(&mut ledger, id, changes).unwrap();
        let stored = ledger.budget(id).unwrap();
        assert_eq!(stored.limit, 250.0);
        assert_eq!(stored.alert_threshold, Some(90.0));

        BudgetService::remove(&mut ledger, id).unwrap();
        assert!(BudgetService::remove(&mut ledger, id).is_err());
    }
}
