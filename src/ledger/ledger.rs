use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    account::{Account, AccountKind},
    budget::Budget,
    expense::Expense,
    notification::Notification,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The whole application state: every collection has this single owner and is
/// only changed through the engines and services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub active_account: Option<Uuid>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Fresh state seeded with the default accounts.
    pub fn new() -> Self {
        let mut ledger = Self::empty();
        ledger.seed_default_accounts();
        ledger
    }

    /// State with no accounts at all; callers must seed before use.
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            accounts: Vec::new(),
            expenses: Vec::new(),
            budgets: Vec::new(),
            notifications: Vec::new(),
            active_account: None,
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Restores the at-least-one-account invariant.
    pub fn seed_default_accounts(&mut self) {
        if self.accounts.is_empty() {
            self.accounts
                .push(Account::new("Personal", AccountKind::Personal));
            self.accounts
                .push(Account::new("Business", AccountKind::Business));
        }
        if self.active_account.and_then(|id| self.account(id)).is_none() {
            self.active_account = self.accounts.first().map(|account| account.id);
        }
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        if self.active_account.is_none() {
            self.active_account = Some(id);
        }
        self.touch();
        id
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        let needle = name.trim().to_ascii_lowercase();
        self.accounts
            .iter()
            .find(|account| account.name.trim().to_ascii_lowercase() == needle)
    }

    /// The active account, falling back to the first one if the stored id is stale.
    pub fn active_account_id(&self) -> Option<Uuid> {
        self.active_account
            .filter(|id| self.account(*id).is_some())
            .or_else(|| self.accounts.first().map(|account| account.id))
    }

    pub fn add_expense(&mut self, expense: Expense) -> Uuid {
        let id = expense.id;
        self.expenses.push(expense);
        self.touch();
        id
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn expense_mut(&mut self, id: Uuid) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|expense| expense.id == id)
    }

    pub fn expenses_for(&self, account_id: Uuid) -> impl Iterator<Item = &Expense> {
        self.expenses
            .iter()
            .filter(move |expense| expense.account_id == account_id)
    }

    pub fn add_budget(&mut self, budget: Budget) -> Uuid {
        let id = budget.id;
        self.budgets.push(budget);
        self.touch();
        id
    }

    pub fn budget(&self, id: Uuid) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.id == id)
    }

    pub fn budget_mut(&mut self, id: Uuid) -> Option<&mut Budget> {
        self.budgets.iter_mut().find(|budget| budget.id == id)
    }

    pub fn budgets_for(&self, account_id: Uuid) -> impl Iterator<Item = &Budget> {
        self.budgets
            .iter()
            .filter(move |budget| budget.account_id == account_id)
    }

    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
