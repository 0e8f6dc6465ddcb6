//! Threshold evaluation for category budgets.
//!
//! Each alert carries an [`AlertKey`]; the monitor raises a key at most once
//! while a notification with that key is still in the store.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::aggregation::{current_period_filter, current_year_filter, sum_by_category};
use crate::ledger::{
    AlertKey, Budget, BudgetPeriod, Category, Ledger, Notification, PeriodId, ThresholdKind,
};

pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// A budget alert raised during one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    pub key: AlertKey,
    pub budget_id: Uuid,
    pub notification_id: Uuid,
    pub message: String,
    pub spent: f64,
    pub limit: f64,
    pub percent_used: f64,
}

impl BudgetAlert {
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }

    pub fn over_budget(&self) -> bool {
        self.key.threshold == ThresholdKind::Exceeded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    OnTrack,
    Warning,
    Exceeded,
}

impl From<Option<ThresholdKind>> for BudgetStatus {
    fn from(kind: Option<ThresholdKind>) -> Self {
        match kind {
            None => BudgetStatus::OnTrack,
            Some(ThresholdKind::Warning) => BudgetStatus::Warning,
            Some(ThresholdKind::Exceeded) => BudgetStatus::Exceeded,
        }
    }
}

/// Usage of one budget within its current period.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    pub budget_id: Uuid,
    pub category: Category,
    pub period: BudgetPeriod,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percent_used: Option<f64>,
    pub status: BudgetStatus,
}

/// Applies the threshold policy: exceeded takes precedence over warning.
pub fn classify(percent_used: f64, warning_threshold: f64) -> Option<ThresholdKind> {
    if percent_used >= 100.0 {
        Some(ThresholdKind::Exceeded)
    } else if percent_used >= warning_threshold {
        Some(ThresholdKind::Warning)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct BudgetMonitor {
    pub default_threshold: f64,
    pub currency_symbol: String,
}

impl Default for BudgetMonitor {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_ALERT_THRESHOLD,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl BudgetMonitor {
    pub fn new(default_threshold: f64, currency_symbol: impl Into<String>) -> Self {
        Self {
            default_threshold,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Evaluates the active account's monthly budgets against this month's
    /// spending and appends a notification for every newly crossed threshold.
    pub fn evaluate(&self, ledger: &mut Ledger, now: DateTime<Utc>) -> Vec<BudgetAlert> {
        let Some(account_id) = ledger.active_account_id() else {
            return Vec::new();
        };
        let period = PeriodId::containing(now);
        let spent_by_category =
            sum_by_category(current_period_filter(ledger.expenses_for(account_id), now));
        let mut raised: HashSet<AlertKey> = ledger
            .notifications
            .iter()
            .filter_map(|notification| notification.alert_key)
            .collect();

        let mut alerts = Vec::new();
        let mut pending = Vec::new();
        for budget in ledger
            .budgets_for(account_id)
            .filter(|budget| budget.period == BudgetPeriod::Monthly)
        {
            let spent = spent_by_category
                .get(&budget.category)
                .copied()
                .unwrap_or(0.0);
            let Some(percent_used) = budget.percent_used(spent) else {
                warn!(
                    budget = %budget.id,
                    limit = budget.limit,
                    "skipping budget with a non-positive limit"
                );
                continue;
            };
            let threshold = budget.threshold_or(self.default_threshold);
            let Some(kind) = classify(percent_used, threshold) else {
                continue;
            };
            let key = AlertKey {
                account_id,
                category: budget.category,
                threshold: kind,
                period,
            };
            if !raised.insert(key) {
                debug!(category = %budget.category, threshold = %kind, "alert already raised");
                continue;
            }

            let message = self.message(budget, kind, spent, percent_used);
            let notification =
                Notification::new(kind.notification_kind(), message.clone(), now).with_alert_key(key);
            info!(category = %budget.category, threshold = %kind, percent_used, "budget alert raised");
            alerts.push(BudgetAlert {
                key,
                budget_id: budget.id,
                notification_id: notification.id,
                message,
                spent,
                limit: budget.limit,
                percent_used,
            });
            pending.push(notification);
        }

        for notification in pending {
            ledger.push_notification(notification);
        }
        alerts
    }

    /// Reports usage of every budget of `account_id`, monthly budgets against
    /// the current month and yearly budgets against the current year.
    pub fn progress(&self, ledger: &Ledger, account_id: Uuid, now: DateTime<Utc>) -> Vec<BudgetProgress> {
        let monthly = sum_by_category(current_period_filter(ledger.expenses_for(account_id), now));
        let yearly = sum_by_category(current_year_filter(ledger.expenses_for(account_id), now));

        let mut report: Vec<BudgetProgress> = ledger
            .budgets_for(account_id)
            .map(|budget| {
                let totals = match budget.period {
                    BudgetPeriod::Monthly => &monthly,
                    BudgetPeriod::Yearly => &yearly,
                };
                let spent = totals.get(&budget.category).copied().unwrap_or(0.0);
                let percent_used = budget.percent_used(spent);
                let status = percent_used
                    .and_then(|percent| {
                        classify(percent, budget.threshold_or(self.default_threshold))
                    })
                    .into();
                BudgetProgress {
                    budget_id: budget.id,
                    category: budget.category,
                    period: budget.period,
                    limit: budget.limit,
                    spent,
                    remaining: budget.limit - spent,
                    percent_used,
                    status,
                }
            })
            .collect();
        report.sort_by(|a, b| a.category.cmp(&b.category).then(a.period.cmp(&b.period)));
        report
    }

    fn message(&self, budget: &Budget, kind: ThresholdKind, spent: f64, percent_used: f64) -> String {
        let symbol = &self.currency_symbol;
        match kind {
            ThresholdKind::Exceeded => format!(
                "You've exceeded your {} budget for this month! ({symbol}{spent:.2}/{symbol}{:.2})",
                budget.category, budget.limit
            ),
            ThresholdKind::Warning => format!(
                "You're approaching your {} budget for this month ({percent_used:.0}%)",
                budget.category
            ),
        }
    }
}

/// Convenience wrapper using the default threshold and currency symbol.
pub fn budget_progress(ledger: &Ledger, account_id: Uuid, now: DateTime<Utc>) -> Vec<BudgetProgress> {
    BudgetMonitor::default().progress(ledger, account_id, now)
}
