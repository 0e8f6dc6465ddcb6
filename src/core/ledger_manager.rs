use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::core::{
    aggregation::{month_over_month_change, top_categories, CategoryShare, SpendingSummary},
    budget_monitor::{BudgetAlert, BudgetMonitor, BudgetProgress},
    delivery::{DeliveryMessage, DeliveryOutcome, NotificationDelivery},
    recurrence::{self, RecurrenceReport, RecurringTemplate},
    services::{
        AccountService, BudgetService, ExpenseService, NotificationService, ServiceError,
        ServiceResult,
    },
    time::Clock,
};
use crate::errors::LedgerError;
use crate::ledger::{
    ledger::CURRENT_SCHEMA_VERSION, Account, Budget, Expense, ExpenseDraft, Ledger, Notification,
};
use crate::storage::{LoadReport, StorageBackend};

/// Everything one refresh pass changed.
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    pub recurrence: RecurrenceReport,
    pub alerts: Vec<BudgetAlert>,
    pub deliveries: Vec<DeliveryOutcome>,
}

impl RefreshReport {
    pub fn is_quiet(&self) -> bool {
        self.recurrence.generated.is_empty() && self.alerts.is_empty()
    }
}

/// Single owner of the application state.
///
/// Expense, budget and account mutations run the recurrence scheduler and
/// the budget monitor afterwards. Nothing reaches storage until [`save`] is
/// called.
///
/// [`save`]: LedgerManager::save
pub struct LedgerManager {
    ledger: Ledger,
    name: String,
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    config: Config,
    monitor: BudgetMonitor,
    delivery: Option<Box<dyn NotificationDelivery>>,
    load_warnings: Vec<String>,
    last_refresh: RefreshReport,
}

impl LedgerManager {
    /// Loads `name` from storage (seeding a fresh ledger on first run) and
    /// brings it up to date with the clock.
    pub fn open(
        storage: Box<dyn StorageBackend>,
        name: impl Into<String>,
        clock: Box<dyn Clock>,
        config: Config,
    ) -> Result<Self, LedgerError> {
        Self::open_with_delivery(storage, name, clock, config, None)
    }

    pub fn open_with_delivery(
        storage: Box<dyn StorageBackend>,
        name: impl Into<String>,
        clock: Box<dyn Clock>,
        config: Config,
        delivery: Option<Box<dyn NotificationDelivery>>,
    ) -> Result<Self, LedgerError> {
        let name = name.into();
        let report = storage
            .load(&name)?
            .unwrap_or_else(|| LoadReport::clean(Ledger::new()));
        ensure_schema_support(report.ledger.schema_version)?;
        let monitor = config.budget_monitor();
        let mut manager = Self {
            ledger: report.ledger,
            name,
            storage,
            clock,
            config,
            monitor,
            delivery,
            load_warnings: report.warnings,
            last_refresh: RefreshReport::default(),
        };
        manager.refresh();
        Ok(manager)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    pub fn last_refresh(&self) -> &RefreshReport {
        &self.last_refresh
    }

    pub fn set_delivery(&mut self, delivery: Option<Box<dyn NotificationDelivery>>) {
        self.delivery = delivery;
    }

    /// Runs the recurrence scheduler over every template, then evaluates the
    /// active account's budgets and hands new alerts to the delivery adapter.
    pub fn refresh(&mut self) -> &RefreshReport {
        let now = self.clock.now();
        let recurrence = recurrence::process_all(&mut self.ledger, now);
        let alerts = self.monitor.evaluate(&mut self.ledger, now);
        let deliveries = self.deliver(&alerts);
        self.last_refresh = RefreshReport {
            recurrence,
            alerts,
            deliveries,
        };
        &self.last_refresh
    }

    fn deliver(&self, alerts: &[BudgetAlert]) -> Vec<DeliveryOutcome> {
        let (Some(delivery), Some(destination)) = (&self.delivery, &self.config.alert_email) else {
            return Vec::new();
        };
        alerts
            .iter()
            .map(|alert| {
                let message = DeliveryMessage::for_alert(destination.clone(), alert);
                let result = delivery.deliver(&message);
                if let Err(err) = &result {
                    warn!(category = %alert.key.category, error = %err, "alert delivery failed");
                }
                DeliveryOutcome { message, result }
            })
            .collect()
    }

    pub fn active_account(&self) -> Option<&Account> {
        self.ledger
            .active_account_id()
            .and_then(|id| self.ledger.account(id))
    }

    fn active_account_id(&self) -> ServiceResult<Uuid> {
        self.ledger
            .active_account_id()
            .ok_or_else(|| ServiceError::Invalid("No active account".into()))
    }

    pub fn add_account(&mut self, account: Account) -> ServiceResult<Uuid> {
        AccountService::add(&mut self.ledger, account)
    }

    pub fn edit_account(&mut self, id: Uuid, changes: Account) -> ServiceResult<()> {
        AccountService::edit(&mut self.ledger, id, changes)
    }

    pub fn switch_account(&mut self, id: Uuid) -> ServiceResult<()> {
        AccountService::switch(&mut self.ledger, id)?;
        self.refresh();
        Ok(())
    }

    pub fn remove_account(&mut self, id: Uuid) -> ServiceResult<Account> {
        let removed = AccountService::remove(&mut self.ledger, id)?;
        self.refresh();
        Ok(removed)
    }

    pub fn add_expense(&mut self, expense: Expense) -> ServiceResult<Uuid> {
        let id = ExpenseService::add(&mut self.ledger, expense)?;
        self.refresh();
        Ok(id)
    }

    /// Accepts a receipt draft for the active account.
    pub fn add_expense_from_draft(&mut self, draft: ExpenseDraft) -> ServiceResult<Uuid> {
        let account_id = self.active_account_id()?;
        let now = self.clock.now();
        let id = ExpenseService::add_from_draft(&mut self.ledger, account_id, draft, now)?;
        self.refresh();
        Ok(id)
    }

    pub fn update_expense(&mut self, id: Uuid, replacement: Expense) -> ServiceResult<()> {
        ExpenseService::update(&mut self.ledger, id, replacement)?;
        self.refresh();
        Ok(())
    }

    pub fn remove_expense(&mut self, id: Uuid) -> ServiceResult<Expense> {
        let removed = ExpenseService::remove(&mut self.ledger, id)?;
        self.refresh();
        Ok(removed)
    }

    pub fn add_budget(&mut self, budget: Budget) -> ServiceResult<Uuid> {
        let id = BudgetService::add(&mut self.ledger, budget)?;
        self.refresh();
        Ok(id)
    }

    pub fn update_budget(&mut self, id: Uuid, changes: Budget) -> ServiceResult<()> {
        BudgetService::update(&mut self.ledger, id, changes)?;
        self.refresh();
        Ok(())
    }

    pub fn remove_budget(&mut self, id: Uuid) -> ServiceResult<Budget> {
        let removed = BudgetService::remove(&mut self.ledger, id)?;
        self.refresh();
        Ok(removed)
    }

    pub fn mark_notification_read(&mut self, id: Uuid) -> ServiceResult<()> {
        NotificationService::mark_read(&mut self.ledger, id)
    }

    pub fn mark_all_notifications_read(&mut self) -> usize {
        NotificationService::mark_all_read(&mut self.ledger)
    }

    pub fn clear_notifications(&mut self) -> usize {
        NotificationService::clear_all(&mut self.ledger)
    }

    pub fn notifications(&self) -> Vec<&Notification> {
        NotificationService::newest_first(&self.ledger)
    }

    pub fn unread_count(&self) -> usize {
        NotificationService::unread_count(&self.ledger)
    }

    /// Expenses of the active account, newest first.
    pub fn expenses(&self) -> Vec<&Expense> {
        match self.ledger.active_account_id() {
            Some(id) => ExpenseService::list(&self.ledger, id),
            None => Vec::new(),
        }
    }

    pub fn budgets(&self) -> Vec<&Budget> {
        match self.ledger.active_account_id() {
            Some(id) => BudgetService::list(&self.ledger, id),
            None => Vec::new(),
        }
    }

    pub fn recurring(&self) -> Vec<RecurringTemplate<'_>> {
        match self.ledger.active_account_id() {
            Some(id) => recurrence::recurring_templates(&self.ledger, id),
            None => Vec::new(),
        }
    }

    pub fn budget_progress(&self) -> Vec<BudgetProgress> {
        match self.ledger.active_account_id() {
            Some(id) => self.monitor.progress(&self.ledger, id, self.clock.now()),
            None => Vec::new(),
        }
    }

    pub fn summary(&self) -> SpendingSummary {
        SpendingSummary::compute(
            self.expenses(),
            self.clock.now(),
            self.config.recent_window_days,
        )
    }

    pub fn top_categories(&self, limit: usize) -> Vec<CategoryShare> {
        top_categories(self.expenses(), self.clock.now(), limit)
    }

    pub fn month_over_month_change(&self) -> Option<f64> {
        month_over_month_change(self.expenses(), self.clock.now())
    }

    pub fn save(&mut self) -> Result<(), LedgerError> {
        self.storage.save(&self.name, &self.ledger)?;
        info!(ledger = %self.name, "ledger saved");
        Ok(())
    }

    pub fn list_backups(&self) -> Result<Vec<String>, LedgerError> {
        self.storage.list_backups(&self.name)
    }

    /// Replaces the in-memory state with a stored backup and refreshes it.
    pub fn restore_backup(&mut self, backup_name: &str) -> Result<&RefreshReport, LedgerError> {
        let report = self.storage.restore(&self.name, backup_name)?;
        ensure_schema_support(report.ledger.schema_version)?;
        self.ledger = report.ledger;
        self.load_warnings = report.warnings;
        Ok(self.refresh())
    }
}

fn ensure_schema_support(schema_version: u8) -> Result<(), LedgerError> {
    if schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::Persistence(format!(
            "ledger schema v{} is newer than supported v{}",
            schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(())
}
